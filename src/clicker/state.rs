//! Game state definitions for the clicker.

use chrono::{DateTime, Utc};

use super::pets::{self, Pet, PetBonuses};
use super::unlocks::{self, GatedGame};
use super::upgrades::{self, Upgrade};

/// XP needed to clear `level`: `floor(100 × 1.5^(level−1))`.
pub fn xp_for_level(level: u32) -> f64 {
    (100.0 * 1.5_f64.powi(level.saturating_sub(1) as i32)).floor()
}

/// The authoritative game aggregate. Only the engine mutates it.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    /// Spendable points. Never negative.
    pub points: f64,
    /// Lifetime points earned; never decreases.
    pub total_points: f64,
    pub total_clicks: u64,
    /// Derived from upgrades (see [`GameState::recompute_derived`]).
    pub points_per_click: f64,
    /// Derived from upgrades.
    pub points_per_second: f64,
    /// Derived from owned pets, base 1.0.
    pub points_multiplier: f64,
    /// Derived from owned pets, seconds added to SURGE MODE.
    pub surge_time_bonus: f64,
    pub upgrades: Vec<Upgrade>,
    pub pets: Vec<Pet>,
    pub last_saved: DateTime<Utc>,
    pub level: u32,
    /// XP banked toward the next level.
    pub xp: f64,
    pub xp_to_next_level: f64,
    pub games: Vec<GatedGame>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            points: 0.0,
            total_points: 0.0,
            total_clicks: 0,
            points_per_click: 1.0,
            points_per_second: 0.0,
            points_multiplier: 1.0,
            surge_time_bonus: 0.0,
            upgrades: upgrades::catalog(),
            pets: pets::catalog(),
            last_saved: Utc::now(),
            level: 1,
            xp: 0.0,
            xp_to_next_level: xp_for_level(1),
            games: unlocks::catalog(),
        }
    }

    /// Composite of every owned pet's bonus.
    pub fn pet_bonuses(&self) -> PetBonuses {
        pets::compose_bonuses(&self.pets)
    }

    /// Re-derive click value, passive rate, and the pet-driven fields from
    /// their sources. Called at the end of every purchase and after load.
    pub fn recompute_derived(&mut self) {
        self.points_per_click = upgrades::recompute_click_value(&self.upgrades);
        self.points_per_second = upgrades::recompute_passive_rate(&self.upgrades);
        let bonuses = self.pet_bonuses();
        self.points_multiplier = bonuses.points_multiplier;
        self.surge_time_bonus = bonuses.surge_time_bonus;
    }

    pub fn total_upgrade_levels(&self) -> u32 {
        upgrades::total_levels(&self.upgrades)
    }

    /// Upgrades the shop currently offers.
    pub fn visible_upgrades(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades
            .iter()
            .filter(|u| u.is_visible(self.total_points))
    }

    pub fn upgrade(&self, id: &str) -> Option<&Upgrade> {
        self.upgrades.iter().find(|u| u.id == id)
    }

    pub fn pet(&self, id: &str) -> Option<&Pet> {
        self.pets.iter().find(|p| p.id == id)
    }

    /// Progress toward the next level in 0.0..=1.0.
    pub fn level_progress(&self) -> f64 {
        if self.xp_to_next_level <= 0.0 {
            return 0.0;
        }
        (self.xp / self.xp_to_next_level).clamp(0.0, 1.0)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
