//! Progression engine operations: plain functions over `GameState`.
//!
//! Every operation validates before it touches the state, so a rejected
//! operation leaves the state exactly as it was.

use rand::Rng;

use super::pets;
use super::state::{xp_for_level, GameState};

/// Passive income is applied in tenths of a second.
const PASSIVE_TICKS_PER_SEC: f64 = 10.0;

/// Points credited by one operation, plus the level reached if it caused a level-up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gain {
    pub amount: f64,
    pub level_up: Option<u32>,
}

/// Result of a successful upgrade purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradePurchase {
    pub cost: f64,
    pub new_level: u32,
    /// Pets whose unlock gate was crossed by this purchase.
    pub pets_unlocked: Vec<&'static str>,
}

/// Credit points (and the same amount of XP), rolling over levels.
fn earn(state: &mut GameState, amount: f64) -> Gain {
    state.points += amount;
    state.total_points += amount;
    state.xp += amount;

    let start_level = state.level;
    while state.xp >= state.xp_to_next_level {
        state.xp -= state.xp_to_next_level;
        state.level += 1;
        state.xp_to_next_level = xp_for_level(state.level);
    }
    Gain {
        amount,
        level_up: (state.level > start_level).then_some(state.level),
    }
}

/// Manual click. `multiplier` is the ambient SURGE MODE factor (2 while active, else 1).
pub fn click(state: &mut GameState, multiplier: f64) -> Gain {
    let bonuses = state.pet_bonuses();
    let gained = state.points_per_click
        * state.points_multiplier
        * multiplier
        * (1.0 + bonuses.click_value_boost);
    state.total_clicks += 1;
    earn(state, gained)
}

/// One 100ms passive-income tick. No-op while nothing generates income.
pub fn passive_tick(state: &mut GameState, multiplier: f64) -> Option<Gain> {
    if state.points_per_second <= 0.0 {
        return None;
    }
    let bonuses = state.pet_bonuses();
    let per_second = state.points_per_second
        * state.points_multiplier
        * (1.0 + bonuses.passive_boost)
        * multiplier;
    Some(earn(state, per_second / PASSIVE_TICKS_PER_SEC))
}

/// Roll the owned-pet chance of a click starting SURGE MODE.
pub fn roll_surge_trigger(state: &GameState, rng: &mut impl Rng) -> bool {
    let chance = state.pet_bonuses().surge_mode_chance;
    chance > 0.0 && rng.gen::<f64>() < chance
}

/// Buy one level of an upgrade. `None` when the id is unknown, the upgrade
/// is maxed, or the player cannot afford it.
pub fn purchase_upgrade(state: &mut GameState, id: &str) -> Option<UpgradePurchase> {
    let idx = state.upgrades.iter().position(|u| u.id == id)?;
    let cost = state.upgrades[idx].cost();
    if state.points < cost || state.upgrades[idx].is_maxed() {
        return None;
    }

    state.points -= cost;
    state.upgrades[idx].current_level += 1;
    let new_level = state.upgrades[idx].current_level;

    let total_levels = state.total_upgrade_levels();
    let pets_unlocked = pets::update_unlocks(&mut state.pets, total_levels);
    state.recompute_derived();

    Some(UpgradePurchase {
        cost,
        new_level,
        pets_unlocked,
    })
}

/// Adopt a pet. Only unlocked, unowned, affordable pets can be bought.
pub fn purchase_pet(state: &mut GameState, id: &str) -> bool {
    let Some(idx) = state.pets.iter().position(|p| p.id == id) else {
        return false;
    };
    if !state.pets[idx].can_buy(state.points) {
        return false;
    }

    state.points -= state.pets[idx].cost;
    state.pets[idx].owned = true;
    state.recompute_derived();
    true
}
