//! Pet catalog and the bonus composer.

/// The bonus channel a pet feeds, carrying its value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PetBonus {
    /// Added to the global points multiplier (base 1.0).
    PointsMultiplier(f64),
    /// Extra seconds on every SURGE MODE session.
    SurgeTimeBonus(f64),
    /// Fractional boost on click value.
    ClickValueBoost(f64),
    /// Fractional boost on passive income.
    PassiveBoost(f64),
    /// Per-click probability of triggering SURGE MODE.
    SurgeModeChance(f64),
}

impl PetBonus {
    pub fn describe(&self) -> String {
        match self {
            PetBonus::PointsMultiplier(v) => format!("+{:.0}% all points", v * 100.0),
            PetBonus::SurgeTimeBonus(v) => format!("+{v:.0}s SURGE MODE"),
            PetBonus::ClickValueBoost(v) => format!("+{:.0}% click value", v * 100.0),
            PetBonus::PassiveBoost(v) => format!("+{:.0}% passive income", v * 100.0),
            PetBonus::SurgeModeChance(v) => format!("{:.0}% SURGE chance per click", v * 100.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pet {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: f64,
    pub bonus: PetBonus,
    /// Summed upgrade levels required before the pet can be bought.
    pub unlock_level: u32,
    pub unlocked: bool,
    pub owned: bool,
}

impl Pet {
    const fn new(id: &'static str, name: &'static str, cost: f64, bonus: PetBonus, unlock_level: u32) -> Self {
        Self {
            id,
            name,
            cost,
            bonus,
            unlock_level,
            unlocked: false,
            owned: false,
        }
    }

    pub fn can_buy(&self, points: f64) -> bool {
        self.unlocked && !self.owned && points >= self.cost
    }
}

/// Fresh pet catalog, nothing unlocked or owned.
pub fn catalog() -> Vec<Pet> {
    vec![
        Pet::new("fluffy", "Fluffy", 5_000.0, PetBonus::PointsMultiplier(0.1), 5),
        Pet::new("rex", "Rex", 15_000.0, PetBonus::SurgeTimeBonus(2.0), 10),
        Pet::new("tweety", "Tweety", 50_000.0, PetBonus::ClickValueBoost(0.25), 15),
        Pet::new("goldie", "Goldie", 100_000.0, PetBonus::PassiveBoost(0.2), 20),
        Pet::new("sparkles", "Sparkles", 500_000.0, PetBonus::SurgeModeChance(0.1), 30),
    ]
}

/// Unlock every pet whose gate is met. Returns the ids that flipped this call.
/// Unlocks are permanent; a pet never re-locks.
pub fn update_unlocks(pets: &mut [Pet], total_upgrade_levels: u32) -> Vec<&'static str> {
    let mut newly = Vec::new();
    for pet in pets.iter_mut() {
        if !pet.unlocked && total_upgrade_levels >= pet.unlock_level {
            pet.unlocked = true;
            newly.push(pet.id);
        }
    }
    newly
}

/// Aggregate of every owned pet's bonus, one field per channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PetBonuses {
    pub points_multiplier: f64,
    pub surge_time_bonus: f64,
    pub click_value_boost: f64,
    pub passive_boost: f64,
    pub surge_mode_chance: f64,
}

impl Default for PetBonuses {
    fn default() -> Self {
        Self {
            points_multiplier: 1.0,
            surge_time_bonus: 0.0,
            click_value_boost: 0.0,
            passive_boost: 0.0,
            surge_mode_chance: 0.0,
        }
    }
}

pub fn compose_bonuses(pets: &[Pet]) -> PetBonuses {
    let mut out = PetBonuses::default();
    for pet in pets.iter().filter(|p| p.owned) {
        match pet.bonus {
            PetBonus::PointsMultiplier(v) => out.points_multiplier += v,
            PetBonus::SurgeTimeBonus(v) => out.surge_time_bonus += v,
            PetBonus::ClickValueBoost(v) => out.click_value_boost += v,
            PetBonus::PassiveBoost(v) => out.passive_boost += v,
            PetBonus::SurgeModeChance(v) => out.surge_mode_chance += v,
        }
    }
    out
}
