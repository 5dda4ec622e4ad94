//! Achievement catalog and evaluator.
//!
//! The evaluator runs after discrete events (clicks, purchases, SURGE MODE
//! activations, secret-code input) and reports each achievement the first
//! time its condition holds. A set of ids already unlocked in an earlier
//! session is loaded once at startup and guards against re-reporting them.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::state::GameState;
use super::upgrades::UpgradeKind;

/// What an achievement measures.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    TotalClicks(u64),
    TotalPoints(f64),
    AnyUpgrade,
    AnyPassiveUpgrade,
    AnyPet,
    /// Every unlocked pet is owned (and at least one is unlocked).
    AllPetsCollected,
    SurgeActivations(u32),
    SecretCode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub unlock_message: &'static str,
    pub condition: Condition,
    pub is_unlocked: bool,
    pub progress: f64,
    pub progress_max: f64,
}

impl Achievement {
    fn new(
        id: &'static str,
        title: &'static str,
        description: &'static str,
        unlock_message: &'static str,
        condition: Condition,
        progress_max: f64,
    ) -> Self {
        Self {
            id,
            title,
            description,
            unlock_message,
            condition,
            is_unlocked: false,
            progress: 0.0,
            progress_max,
        }
    }
}

/// Everything the evaluator looks at besides the game state itself.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub state: &'a GameState,
    pub surge_activations: u32,
    pub secret_code_entered: bool,
}

impl Condition {
    /// `(progress, met)` for the current snapshot.
    fn measure(&self, snap: &Snapshot) -> (f64, bool) {
        let flag = |b: bool| (if b { 1.0 } else { 0.0 }, b);
        let state = snap.state;
        match self {
            Condition::TotalClicks(n) => (state.total_clicks as f64, state.total_clicks >= *n),
            Condition::TotalPoints(n) => (state.total_points, state.total_points >= *n),
            Condition::AnyUpgrade => flag(state.upgrades.iter().any(|u| u.current_level > 0)),
            Condition::AnyPassiveUpgrade => flag(
                state
                    .upgrades
                    .iter()
                    .any(|u| u.kind == UpgradeKind::Passive && u.current_level > 0),
            ),
            Condition::AnyPet => flag(state.pets.iter().any(|p| p.owned)),
            Condition::AllPetsCollected => {
                let unlocked = state.pets.iter().filter(|p| p.unlocked).count();
                let owned = state.pets.iter().filter(|p| p.owned).count();
                (owned as f64, unlocked > 0 && unlocked == owned)
            }
            Condition::SurgeActivations(n) => {
                (snap.surge_activations as f64, snap.surge_activations >= *n)
            }
            Condition::SecretCode => flag(snap.secret_code_entered),
        }
    }
}

/// Fresh achievement catalog, all locked.
pub fn catalog() -> Vec<Achievement> {
    use Condition::*;
    vec![
        Achievement::new("first-click", "First Steps", "Begin your clicking journey", "Click the main button once", TotalClicks(1), 1.0),
        Achievement::new("click-master", "Click Master", "Become proficient at clicking", "Reach 100 total clicks", TotalClicks(100), 100.0),
        Achievement::new("click-enthusiast", "Click Enthusiast", "Your fingers are getting stronger", "Reach 1,000 total clicks", TotalClicks(1_000), 1_000.0),
        Achievement::new("points-collector", "Points Collector", "Amass a small fortune", "Reach 1,000 total points", TotalPoints(1_000.0), 1_000.0),
        Achievement::new("points-hoarder", "Points Hoarder", "Your wealth is growing rapidly", "Reach 100,000 total points", TotalPoints(100_000.0), 100_000.0),
        Achievement::new("points-tycoon", "Points Tycoon", "You've become a points millionaire", "Reach 1,000,000 total points", TotalPoints(1_000_000.0), 1_000_000.0),
        Achievement::new("upgrade-novice", "Upgrade Novice", "Start improving your setup", "Purchase your first upgrade", AnyUpgrade, 1.0),
        Achievement::new("automation-beginner", "Automation Pioneer", "Begin your automation journey", "Purchase your first passive upgrade", AnyPassiveUpgrade, 1.0),
        Achievement::new("pet-friend", "Pet Friend", "Adopt your first pet companion", "Purchase your first pet", AnyPet, 1.0),
        Achievement::new("pet-collector", "Pet Collector", "Create a pet sanctuary", "Collect all available pets", AllPetsCollected, 5.0),
        Achievement::new("surge-master", "Surge Master", "Harness the power of SURGE MODE", "Activate SURGE MODE 5 times", SurgeActivations(5), 5.0),
        Achievement::new("konami-master", "Secret Code Master", "You know the legendary code", "Enter the Konami code", SecretCode, 1.0),
    ]
}

/// Persisted form of one achievement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRecord {
    pub id: String,
    pub is_unlocked: bool,
    #[serde(default)]
    pub progress: f64,
}

/// Live achievement list plus the previously-unlocked guard set.
#[derive(Clone, Debug, PartialEq)]
pub struct AchievementBook {
    pub achievements: Vec<Achievement>,
    previously_unlocked: HashSet<String>,
}

impl AchievementBook {
    pub fn new() -> Self {
        Self {
            achievements: catalog(),
            previously_unlocked: HashSet::new(),
        }
    }

    /// Restore saved records onto the catalog and seed the guard set.
    /// Records for ids no longer in the catalog are ignored.
    pub fn hydrate(records: &[AchievementRecord]) -> Self {
        let mut book = Self::new();
        for record in records {
            if let Some(a) = book.achievements.iter_mut().find(|a| a.id == record.id) {
                a.is_unlocked = record.is_unlocked;
                a.progress = record.progress.clamp(0.0, a.progress_max);
                if record.is_unlocked {
                    book.previously_unlocked.insert(record.id.clone());
                }
            }
        }
        book
    }

    pub fn records(&self) -> Vec<AchievementRecord> {
        self.achievements
            .iter()
            .map(|a| AchievementRecord {
                id: a.id.to_string(),
                is_unlocked: a.is_unlocked,
                progress: a.progress,
            })
            .collect()
    }

    /// Ids of every unlocked achievement.
    pub fn unlocked_ids(&self) -> HashSet<String> {
        self.achievements
            .iter()
            .filter(|a| a.is_unlocked)
            .map(|a| a.id.to_string())
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.is_unlocked).count()
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    /// Refresh progress and unlock whatever newly qualifies.
    /// Returns the newly unlocked achievements in catalog order.
    pub fn evaluate(&mut self, snap: &Snapshot) -> Vec<&Achievement> {
        let mut newly = Vec::new();
        for (idx, a) in self.achievements.iter_mut().enumerate() {
            let (progress, met) = a.condition.measure(snap);
            a.progress = progress.min(a.progress_max);
            if met && !a.is_unlocked && !self.previously_unlocked.contains(a.id) {
                a.is_unlocked = true;
                self.previously_unlocked.insert(a.id.to_string());
                newly.push(idx);
            }
        }
        newly.iter().map(|&i| &self.achievements[i]).collect()
    }
}

impl Default for AchievementBook {
    fn default() -> Self {
        Self::new()
    }
}

/// A direction or letter key fed to the secret-code matcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeKey {
    Up,
    Down,
    Left,
    Right,
    Char(char),
}

const SECRET_CODE: [CodeKey; 10] = [
    CodeKey::Up,
    CodeKey::Up,
    CodeKey::Down,
    CodeKey::Down,
    CodeKey::Left,
    CodeKey::Right,
    CodeKey::Left,
    CodeKey::Right,
    CodeKey::Char('b'),
    CodeKey::Char('a'),
];

/// Rolling window over the last few keys, matched against the secret code.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SecretCode {
    recent: VecDeque<CodeKey>,
    entered: bool,
}

impl SecretCode {
    /// Record a key. Returns true on the press that completes the code.
    pub fn push(&mut self, key: CodeKey) -> bool {
        let key = match key {
            CodeKey::Char(c) => CodeKey::Char(c.to_ascii_lowercase()),
            other => other,
        };
        self.recent.push_back(key);
        if self.recent.len() > SECRET_CODE.len() {
            self.recent.pop_front();
        }
        if self.recent.iter().eq(SECRET_CODE.iter()) {
            self.recent.clear();
            self.entered = true;
            return true;
        }
        false
    }

    pub fn entered(&self) -> bool {
        self.entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(state: &GameState) -> Snapshot<'_> {
        Snapshot {
            state,
            surge_activations: 0,
            secret_code_entered: false,
        }
    }

    fn ids(list: &[&Achievement]) -> Vec<&'static str> {
        list.iter().map(|a| a.id).collect()
    }

    #[test]
    fn nothing_unlocks_on_fresh_state() {
        let mut book = AchievementBook::new();
        let state = GameState::new();
        assert!(book.evaluate(&snap(&state)).is_empty());
        assert_eq!(book.unlocked_count(), 0);
    }

    #[test]
    fn click_master_fires_once() {
        let mut book = AchievementBook::new();
        let mut state = GameState::new();
        state.total_clicks = 99;
        assert_eq!(ids(&book.evaluate(&snap(&state))), vec!["first-click"]);

        state.total_clicks = 100;
        assert_eq!(ids(&book.evaluate(&snap(&state))), vec!["click-master"]);

        state.total_clicks = 101;
        assert!(book.evaluate(&snap(&state)).is_empty());
        assert!(book.get("click-master").unwrap().is_unlocked);
    }

    #[test]
    fn evaluate_twice_is_idempotent() {
        let mut book = AchievementBook::new();
        let mut state = GameState::new();
        state.total_points = 2_000.0;
        assert_eq!(ids(&book.evaluate(&snap(&state))), vec!["points-collector"]);
        let after_first = book.clone();
        assert!(book.evaluate(&snap(&state)).is_empty());
        assert_eq!(book, after_first);
    }

    #[test]
    fn progress_is_clamped() {
        let mut book = AchievementBook::new();
        let mut state = GameState::new();
        state.total_clicks = 5_000;
        book.evaluate(&snap(&state));
        assert!((book.get("click-master").unwrap().progress - 100.0).abs() < 0.001);
        assert!((book.get("click-enthusiast").unwrap().progress - 1_000.0).abs() < 0.001);
    }

    #[test]
    fn previously_unlocked_never_refires() {
        let records = vec![AchievementRecord {
            id: "first-click".into(),
            is_unlocked: true,
            progress: 1.0,
        }];
        let mut book = AchievementBook::hydrate(&records);
        let mut state = GameState::new();
        state.total_clicks = 1;
        assert!(book.evaluate(&snap(&state)).is_empty());
        assert!(book.get("first-click").unwrap().is_unlocked);
    }

    #[test]
    fn guard_set_blocks_even_if_live_flag_cleared() {
        let records = vec![AchievementRecord {
            id: "first-click".into(),
            is_unlocked: true,
            progress: 1.0,
        }];
        let mut book = AchievementBook::hydrate(&records);
        book.achievements[0].is_unlocked = false;
        let mut state = GameState::new();
        state.total_clicks = 1;
        assert!(book.evaluate(&snap(&state)).is_empty());
    }

    #[test]
    fn hydrate_ignores_unknown_ids() {
        let records = vec![AchievementRecord {
            id: "retired".into(),
            is_unlocked: true,
            progress: 1.0,
        }];
        let book = AchievementBook::hydrate(&records);
        assert_eq!(book.unlocked_count(), 0);
    }

    #[test]
    fn upgrade_and_pet_conditions() {
        let mut book = AchievementBook::new();
        let mut state = GameState::new();
        state.upgrades[1].current_level = 1; // auto-clicker (passive)
        let got = ids(&book.evaluate(&snap(&state)));
        assert_eq!(got, vec!["upgrade-novice", "automation-beginner"]);

        state.pets[0].unlocked = true;
        state.pets[0].owned = true;
        let got = ids(&book.evaluate(&snap(&state)));
        assert_eq!(got, vec!["pet-friend", "pet-collector"]);
    }

    #[test]
    fn pet_collector_needs_every_unlocked_pet() {
        let mut book = AchievementBook::new();
        let mut state = GameState::new();
        state.pets[0].unlocked = true;
        state.pets[0].owned = true;
        state.pets[1].unlocked = true;
        let got = ids(&book.evaluate(&snap(&state)));
        assert_eq!(got, vec!["pet-friend"]);
        assert!((book.get("pet-collector").unwrap().progress - 1.0).abs() < 0.001);
    }

    #[test]
    fn surge_and_secret_code_inputs() {
        let mut book = AchievementBook::new();
        let state = GameState::new();
        let s = Snapshot {
            state: &state,
            surge_activations: 5,
            secret_code_entered: true,
        };
        assert_eq!(ids(&book.evaluate(&s)), vec!["surge-master", "konami-master"]);
    }

    #[test]
    fn records_round_trip_through_json() {
        let mut book = AchievementBook::new();
        let mut state = GameState::new();
        state.total_clicks = 1;
        book.evaluate(&snap(&state));
        let json = serde_json::to_string(&book.records()).unwrap();
        assert!(json.contains(r#""isUnlocked":true"#));
        let parsed: Vec<AchievementRecord> = serde_json::from_str(&json).unwrap();
        let restored = AchievementBook::hydrate(&parsed);
        assert!(restored.get("first-click").unwrap().is_unlocked);
        assert!(!restored.get("click-master").unwrap().is_unlocked);
    }

    #[test]
    fn secret_code_matches_full_sequence() {
        let mut code = SecretCode::default();
        let mut hit = false;
        for key in SECRET_CODE.iter().take(9) {
            assert!(!code.push(*key));
        }
        hit |= code.push(CodeKey::Char('A'));
        assert!(hit);
        assert!(code.entered());
    }

    #[test]
    fn secret_code_tolerates_leading_noise() {
        let mut code = SecretCode::default();
        code.push(CodeKey::Char('x'));
        code.push(CodeKey::Up);
        let done = SECRET_CODE.iter().map(|k| code.push(*k)).last();
        assert_eq!(done, Some(true));
    }

    #[test]
    fn secret_code_wrong_order_fails() {
        let mut code = SecretCode::default();
        for key in SECRET_CODE.iter().rev() {
            code.push(*key);
        }
        assert!(!code.entered());
    }
}
