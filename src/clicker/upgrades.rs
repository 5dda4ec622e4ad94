//! Upgrade catalog: purchasable click/passive upgrades and their formulas.

use serde::{Deserialize, Serialize};

/// Geometric growth factor applied to an upgrade's cost per owned level.
pub const COST_GROWTH: f64 = 1.15;

/// Upgrade id that multiplies the additive click value instead of adding to it.
pub const EFFICIENCY_ID: &str = "efficiency";

/// What an upgrade feeds into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    Click,
    Passive,
}

/// A levelable catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Upgrade {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: UpgradeKind,
    pub base_cost: f64,
    pub base_value: f64,
    /// `None` means the upgrade can be leveled forever.
    pub max_level: Option<u32>,
    pub current_level: u32,
    /// Hidden from the shop until lifetime points reach this value.
    pub unlock_points: Option<f64>,
}

impl Upgrade {
    const fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        kind: UpgradeKind,
        base_cost: f64,
        base_value: f64,
        max_level: u32,
        unlock_points: Option<f64>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            kind,
            base_cost,
            base_value,
            max_level: Some(max_level),
            current_level: 0,
            unlock_points,
        }
    }

    /// Price of the next level: `floor(base_cost × 1.15^level)`.
    pub fn cost(&self) -> f64 {
        (self.base_cost * COST_GROWTH.powi(self.current_level as i32)).floor()
    }

    pub fn is_maxed(&self) -> bool {
        self.max_level
            .is_some_and(|max| self.current_level >= max)
    }

    /// Whether the shop offers this upgrade at the given lifetime total.
    pub fn is_visible(&self, total_points: f64) -> bool {
        match self.unlock_points {
            None => true,
            Some(gate) => total_points >= gate,
        }
    }
}

/// Fresh upgrade catalog, every entry at level 0.
pub fn catalog() -> Vec<Upgrade> {
    vec![
        Upgrade::new(
            "better-click",
            "Better Click",
            "Increase points per click",
            UpgradeKind::Click,
            10.0,
            1.0,
            100,
            None,
        ),
        Upgrade::new(
            "auto-clicker",
            "Auto Clicker",
            "Automatically generates points",
            UpgradeKind::Passive,
            50.0,
            1.0,
            100,
            Some(30.0),
        ),
        Upgrade::new(
            EFFICIENCY_ID,
            "Efficiency",
            "All clicks are 50% more effective",
            UpgradeKind::Click,
            200.0,
            0.5,
            10,
            Some(150.0),
        ),
        Upgrade::new(
            "automatic-system",
            "Automatic System",
            "More sophisticated auto-generation",
            UpgradeKind::Passive,
            500.0,
            5.0,
            50,
            Some(400.0),
        ),
        Upgrade::new(
            "innovation",
            "Innovation",
            "Revolutionary clicking technology",
            UpgradeKind::Click,
            2_000.0,
            10.0,
            25,
            Some(1_500.0),
        ),
        Upgrade::new(
            "factory",
            "Factory",
            "Mass production of points",
            UpgradeKind::Passive,
            5_000.0,
            25.0,
            25,
            Some(3_000.0),
        ),
    ]
}

/// Points per click before pet bonuses.
///
/// Starts at 1, every click upgrade except efficiency adds `base_value × level`,
/// then efficiency scales the sum by `1 + base_value × level`.
pub fn recompute_click_value(upgrades: &[Upgrade]) -> f64 {
    let mut additive = 1.0;
    let mut factor = 1.0;
    for u in upgrades.iter().filter(|u| u.kind == UpgradeKind::Click) {
        let contribution = u.base_value * u.current_level as f64;
        if u.id == EFFICIENCY_ID {
            factor += contribution;
        } else {
            additive += contribution;
        }
    }
    additive * factor
}

/// Points per second before pet bonuses.
pub fn recompute_passive_rate(upgrades: &[Upgrade]) -> f64 {
    upgrades
        .iter()
        .filter(|u| u.kind == UpgradeKind::Passive)
        .map(|u| u.base_value * u.current_level as f64)
        .sum()
}

/// Sum of every upgrade's level; gates pet unlocks.
pub fn total_levels(upgrades: &[Upgrade]) -> u32 {
    upgrades.iter().map(|u| u.current_level).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(upgrades: &'a mut [Upgrade], id: &str) -> &'a mut Upgrade {
        upgrades.iter_mut().find(|u| u.id == id).unwrap()
    }

    #[test]
    fn first_level_costs_base() {
        let upgrades = catalog();
        assert!((upgrades[0].cost() - 10.0).abs() < 0.001);
    }

    #[test]
    fn cost_is_floored() {
        let mut upgrades = catalog();
        let u = find(&mut upgrades, "better-click");
        u.current_level = 1;
        // 10 × 1.15 = 11.5
        assert!((u.cost() - 11.0).abs() < 0.001);
        u.current_level = 5;
        // 10 × 1.15^5 = 20.11
        assert!((u.cost() - 20.0).abs() < 0.001);
    }

    #[test]
    fn maxed_at_max_level() {
        let mut upgrades = catalog();
        let u = find(&mut upgrades, EFFICIENCY_ID);
        u.current_level = 9;
        assert!(!u.is_maxed());
        u.current_level = 10;
        assert!(u.is_maxed());
    }

    #[test]
    fn unbounded_upgrade_never_maxes() {
        let mut u = catalog().remove(0);
        u.max_level = None;
        u.current_level = 10_000;
        assert!(!u.is_maxed());
    }

    #[test]
    fn visibility_follows_unlock_points() {
        let upgrades = catalog();
        assert!(upgrades[0].is_visible(0.0));
        assert!(!upgrades[1].is_visible(29.9));
        assert!(upgrades[1].is_visible(30.0));
    }

    #[test]
    fn click_value_defaults_to_one() {
        assert!((recompute_click_value(&catalog()) - 1.0).abs() < 0.001);
    }

    #[test]
    fn click_value_additive_then_efficiency() {
        let mut upgrades = catalog();
        find(&mut upgrades, "better-click").current_level = 3;
        find(&mut upgrades, "innovation").current_level = 1;
        find(&mut upgrades, EFFICIENCY_ID).current_level = 2;
        // (1 + 3 + 10) × (1 + 0.5 × 2) = 28
        assert!((recompute_click_value(&upgrades) - 28.0).abs() < 0.001);
    }

    #[test]
    fn efficiency_alone_scales_base_click() {
        let mut upgrades = catalog();
        find(&mut upgrades, EFFICIENCY_ID).current_level = 1;
        assert!((recompute_click_value(&upgrades) - 1.5).abs() < 0.001);
    }

    #[test]
    fn passive_rate_sums_passive_upgrades() {
        let mut upgrades = catalog();
        find(&mut upgrades, "auto-clicker").current_level = 4;
        find(&mut upgrades, "factory").current_level = 2;
        find(&mut upgrades, "better-click").current_level = 7;
        assert!((recompute_passive_rate(&upgrades) - 54.0).abs() < 0.001);
    }

    #[test]
    fn total_levels_sums_everything() {
        let mut upgrades = catalog();
        find(&mut upgrades, "auto-clicker").current_level = 4;
        find(&mut upgrades, "better-click").current_level = 7;
        assert_eq!(total_levels(&upgrades), 11);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_cost_strictly_increases(idx in 0usize..6, level in 0u32..100) {
                let mut u = catalog().remove(idx);
                u.current_level = level;
                let before = u.cost();
                u.current_level = level + 1;
                prop_assert!(u.cost() > before);
            }

            #[test]
            fn prop_cost_never_below_base(idx in 0usize..6, level in 0u32..100) {
                let mut u = catalog().remove(idx);
                u.current_level = level;
                prop_assert!(u.cost() >= u.base_cost);
            }
        }
    }
}
