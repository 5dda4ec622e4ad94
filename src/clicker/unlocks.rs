//! Gated content (mini-games) and the propagator that unlocks it.

use std::collections::HashSet;

/// What must happen before a gated item opens.
#[derive(Clone, Debug, PartialEq)]
pub enum UnlockCondition {
    Level(u32),
    Achievement(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GatedGame {
    pub id: &'static str,
    pub name: &'static str,
    pub points_cost: f64,
    pub condition: UnlockCondition,
    pub is_unlocked: bool,
}

impl GatedGame {
    fn new(id: &'static str, name: &'static str, points_cost: f64, condition: UnlockCondition) -> Self {
        Self {
            id,
            name,
            points_cost,
            condition,
            is_unlocked: false,
        }
    }

    fn is_satisfied(&self, level: u32, achievements: &HashSet<String>) -> bool {
        match &self.condition {
            UnlockCondition::Level(n) => level >= *n,
            UnlockCondition::Achievement(id) => achievements.contains(id),
        }
    }
}

/// Fresh gated-game catalog. The level-1 entry starts open.
pub fn catalog() -> Vec<GatedGame> {
    let level = UnlockCondition::Level;
    let achievement = |id: &str| UnlockCondition::Achievement(id.to_string());
    let mut games = vec![
        GatedGame::new("diluvian-ultra", "Diluvian Ultra", 50.0, level(1)),
        GatedGame::new("zoeti", "Zoeti", 100.0, level(2)),
        GatedGame::new("hyperviolent", "Hyperviolent", 76.0, level(3)),
        GatedGame::new("ravensword-shadowlands", "Ravensword: Shadowlands", 126.0, level(4)),
        GatedGame::new("youtubers-life", "Youtubers Life", 176.0, achievement("first-click")),
        GatedGame::new("vengeance", "Vengeance of Mr. Peppermint", 276.0, achievement("click-master")),
        GatedGame::new("inua", "Inua - A Story in Ice and Time", 376.0, level(8)),
        GatedGame::new("end-of-sun", "The End of the Sun", 676.0, level(10)),
    ];
    games[0].is_unlocked = true;
    games
}

/// Open every locked game whose condition now holds, returning the names
/// of the ones that opened so the caller can notify once per item.
pub fn propagate(
    games: &mut [GatedGame],
    level: u32,
    unlocked_achievements: &HashSet<String>,
) -> Vec<&'static str> {
    let mut opened = Vec::new();
    for game in games.iter_mut() {
        if !game.is_unlocked && game.is_satisfied(level, unlocked_achievements) {
            game.is_unlocked = true;
            opened.push(game.name);
        }
    }
    opened
}
