//! Post-battle reward calculation.
//!
//! Rewards scale with the defender's power, from the attacker's point of
//! view. Losing still pays a little experience and fame but costs prestige.

use serde::{Deserialize, Serialize};

use crate::config::BattleConfig;
use crate::math::{scale_floor, Ratio};

/// Defender power at which win experience doubles.
pub const EXP_POWER_SCALE: u32 = 2000;

/// Prestige lost on any defeat.
pub const LOSS_PRESTIGE: i32 = -5;

/// Share of the gold paid again as food.
pub const FOOD_SHARE: Ratio = Ratio::from_percent(50);

/// Share of the win fame still paid on a defeat.
pub const LOSS_FAME_SHARE: Ratio = Ratio::from_percent(10);

/// Kind of battle, which decides prestige on a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleType {
    /// Against monsters or NPCs.
    #[default]
    Pve,
    /// Against another player's army.
    Pvp,
    /// Ranked arena match.
    Arena,
}

impl BattleType {
    /// Prestige granted for winning a battle of this type.
    #[must_use]
    pub const fn prestige_on_win(self) -> i32 {
        match self {
            Self::Pve => 10,
            Self::Pvp => 20,
            Self::Arena => 30,
        }
    }
}

/// Everything one battle pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RewardBundle {
    /// Experience, never above `max_exp`.
    pub exp: u32,
    /// Gold.
    pub gold: u32,
    /// Food, half of the gold.
    pub food: u32,
    /// Fame.
    pub fame: u32,
    /// Prestige; negative after a defeat.
    pub prestige: i32,
}

/// Compute the rewards for one battle.
#[must_use]
pub fn compute_rewards(
    is_win: bool,
    defender_power: u32,
    battle_type: BattleType,
    config: &BattleConfig,
) -> RewardBundle {
    let power = u128::from(defender_power);
    let exp_base = u128::from(config.exp_base);

    if is_win {
        // Step 1: exp_base * (1 + dp / 2000) * win, kept as one fraction
        let exp = scale_floor(
            exp_base * (u128::from(EXP_POWER_SCALE) + power),
            &[config.win_exp_multiplier],
            u128::from(EXP_POWER_SCALE),
        );

        // Step 2: Loot
        let gold = config.gold_multiplier.apply(defender_power);
        let food = FOOD_SHARE.apply(gold);
        let fame = config.fame_multiplier.apply(defender_power);

        RewardBundle {
            exp: exp.min(config.max_exp),
            gold,
            food,
            fame,
            prestige: battle_type.prestige_on_win(),
        }
    } else {
        let exp = scale_floor(exp_base, &[config.lose_exp_multiplier], 1);
        let fame = scale_floor(power, &[config.fame_multiplier, LOSS_FAME_SHARE], 1);

        RewardBundle {
            exp: exp.min(config.max_exp),
            gold: 0,
            food: 0,
            fame,
            prestige: LOSS_PRESTIGE,
        }
    }
}
