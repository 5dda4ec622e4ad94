//! Persistence: the key-value storage seam, the save format, and load-time
//! migration.
//!
//! ## Versioning
//!
//! - `SAVE_VERSION` is the current format version, stored as a `version` field next
//!   to the game fields. Bump it when fields are added.
//! - `MIN_COMPATIBLE_VERSION` is the oldest version still loadable. Only bump it on a
//!   breaking change (a field changing meaning or disappearing).
//! - Snapshots without a `version` field (written before it existed) are read as
//!   version 1.
//!
//! Any loadable snapshot that lacks newer fields gets them backfilled from a fresh
//! [`GameState`], so adding a field never invalidates an old save.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::achievements::{AchievementBook, AchievementRecord};
use super::pets;
use super::state::{xp_for_level, GameState};

pub const STATE_KEY: &str = "clickerGameState";
pub const ACHIEVEMENTS_KEY: &str = "clickerGameAchievements";
pub const SOUND_KEY: &str = "clickerGameSoundEnabled";

const SAVE_VERSION: u32 = 2;
const MIN_COMPATIBLE_VERSION: u32 = 1;
const LEGACY_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[cfg(target_arch = "wasm32")]
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("could not encode save data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key-value store (browser localStorage, or memory under test).
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share the same entries, so a test can keep a
/// handle after moving one into a session.
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    available: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            entries: Rc::default(),
            available: true,
        }
    }

    /// A store whose every call fails, for exercising best-effort writes.
    #[cfg(test)]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// `window.localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn handle() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|e| StorageError::Backend(format!("{e:?}")))?
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::handle()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::handle()?
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Self::handle()?
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}

fn legacy_version() -> u32 {
    LEGACY_VERSION
}

/// The flat snapshot stored under [`STATE_KEY`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct GameSave {
    #[serde(default = "legacy_version")]
    version: u32,
    points: f64,
    total_points: f64,
    total_clicks: u64,
    points_per_click: f64,
    points_per_second: f64,
    points_multiplier: f64,
    surge_time_bonus: f64,
    upgrades: Vec<UpgradeSave>,
    pets: Vec<PetSave>,
    last_saved: DateTime<Utc>,
    level: u32,
    xp: f64,
    xp_to_next_level: f64,
    games: Vec<GameUnlockSave>,
}

/// Missing fields take their fresh-game values.
impl Default for GameSave {
    fn default() -> Self {
        extract_save(&GameState::new())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpgradeSave {
    id: String,
    #[serde(default)]
    current_level: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct PetSave {
    id: String,
    #[serde(default)]
    unlocked: bool,
    #[serde(default)]
    owned: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameUnlockSave {
    id: String,
    #[serde(default)]
    is_unlocked: bool,
}

fn extract_save(state: &GameState) -> GameSave {
    GameSave {
        version: SAVE_VERSION,
        points: state.points,
        total_points: state.total_points,
        total_clicks: state.total_clicks,
        points_per_click: state.points_per_click,
        points_per_second: state.points_per_second,
        points_multiplier: state.points_multiplier,
        surge_time_bonus: state.surge_time_bonus,
        upgrades: state
            .upgrades
            .iter()
            .map(|u| UpgradeSave {
                id: u.id.to_string(),
                current_level: u.current_level,
            })
            .collect(),
        pets: state
            .pets
            .iter()
            .map(|p| PetSave {
                id: p.id.to_string(),
                unlocked: p.unlocked,
                owned: p.owned,
            })
            .collect(),
        last_saved: state.last_saved,
        level: state.level,
        xp: state.xp,
        xp_to_next_level: state.xp_to_next_level,
        games: state
            .games
            .iter()
            .map(|g| GameUnlockSave {
                id: g.id.to_string(),
                is_unlocked: g.is_unlocked,
            })
            .collect(),
    }
}

/// Restore a save onto a fresh state. Catalog entries are matched by id;
/// ids the catalog no longer knows are dropped. Derived fields are rebuilt
/// from their sources rather than trusted.
fn apply_save(state: &mut GameState, save: &GameSave) {
    state.points = save.points.max(0.0);
    state.total_points = save.total_points.max(state.points);
    state.total_clicks = save.total_clicks;
    state.last_saved = save.last_saved;
    state.level = save.level.max(1);
    state.xp = save.xp.max(0.0);
    state.xp_to_next_level = xp_for_level(state.level);

    for saved in &save.upgrades {
        if let Some(u) = state.upgrades.iter_mut().find(|u| u.id == saved.id) {
            u.current_level = match u.max_level {
                Some(max) => saved.current_level.min(max),
                None => saved.current_level,
            };
        }
    }

    for saved in &save.pets {
        if let Some(p) = state.pets.iter_mut().find(|p| p.id == saved.id) {
            p.owned = saved.owned;
            p.unlocked = saved.unlocked || saved.owned;
        }
    }
    let levels = state.total_upgrade_levels();
    pets::update_unlocks(&mut state.pets, levels);

    for saved in &save.games {
        if let Some(g) = state.games.iter_mut().find(|g| g.id == saved.id) {
            g.is_unlocked |= saved.is_unlocked;
        }
    }

    state.recompute_derived();
}

fn parse_state(json: &str) -> Result<GameSave, serde_json::Error> {
    serde_json::from_str(json)
}

fn discard(storage: &mut dyn Storage, key: &str) {
    if let Err(e) = storage.remove(key) {
        log::warn!("could not remove {key}: {e}");
    }
}

fn read(storage: &dyn Storage, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("could not read {key}: {e}");
            None
        }
    }
}

/// Load the saved game, or a fresh one when nothing usable is stored.
/// Corrupt or too-old snapshots are removed.
pub fn load_state(storage: &mut dyn Storage) -> GameState {
    let mut state = GameState::new();
    let Some(json) = read(storage, STATE_KEY) else {
        return state;
    };

    let save = match parse_state(&json) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("discarding corrupt save data: {e}");
            discard(storage, STATE_KEY);
            return state;
        }
    };

    let version = save.version;
    if version < MIN_COMPATIBLE_VERSION || version > SAVE_VERSION {
        log::info!(
            "save version unsupported (saved={version}, min={MIN_COMPATIBLE_VERSION}, current={SAVE_VERSION}); starting fresh"
        );
        discard(storage, STATE_KEY);
        return state;
    }
    if version < SAVE_VERSION {
        log::info!("migrating save data (saved={version}, current={SAVE_VERSION})");
    }

    apply_save(&mut state, &save);
    log::info!("loaded save: {:.0} points, level {}", state.points, state.level);
    state
}

pub fn save_state(storage: &mut dyn Storage, state: &GameState) -> Result<(), StorageError> {
    let json = serde_json::to_string(&extract_save(state))?;
    storage.set(STATE_KEY, &json)
}

/// Load achievements and seed the previously-unlocked guard from them.
pub fn load_achievements(storage: &mut dyn Storage) -> AchievementBook {
    let Some(json) = read(storage, ACHIEVEMENTS_KEY) else {
        return AchievementBook::new();
    };
    match serde_json::from_str::<Vec<AchievementRecord>>(&json) {
        Ok(records) => AchievementBook::hydrate(&records),
        Err(e) => {
            log::warn!("discarding corrupt achievement data: {e}");
            discard(storage, ACHIEVEMENTS_KEY);
            AchievementBook::new()
        }
    }
}

pub fn save_achievements(
    storage: &mut dyn Storage,
    book: &AchievementBook,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(&book.records())?;
    storage.set(ACHIEVEMENTS_KEY, &json)
}

/// Sound defaults to on when nothing is stored; a stored value other than
/// `"true"` turns it off.
pub fn load_sound_enabled(storage: &dyn Storage) -> bool {
    read(storage, SOUND_KEY).map_or(true, |v| v == "true")
}

pub fn save_sound_enabled(storage: &mut dyn Storage, enabled: bool) -> Result<(), StorageError> {
    storage.set(SOUND_KEY, if enabled { "true" } else { "false" })
}

/// Remove the game and achievement snapshots. The sound setting survives.
pub fn clear(storage: &mut dyn Storage) -> Result<(), StorageError> {
    storage.remove(STATE_KEY)?;
    storage.remove(ACHIEVEMENTS_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clicker::achievements::Snapshot;
    use crate::clicker::logic;

    fn progressed_state() -> GameState {
        let mut state = GameState::new();
        state.points = 100_000.0;
        state.total_points = 100_000.0;
        for _ in 0..6 {
            logic::purchase_upgrade(&mut state, "better-click");
        }
        logic::purchase_pet(&mut state, "fluffy");
        state.total_clicks = 42;
        state.level = 3;
        state.xp = 12.0;
        state.xp_to_next_level = xp_for_level(3);
        state
    }

    #[test]
    fn extract_and_apply_roundtrip() {
        let original = progressed_state();
        let json = serde_json::to_string(&extract_save(&original)).unwrap();
        let save = parse_state(&json).unwrap();
        assert_eq!(save.version, SAVE_VERSION);

        let mut restored = GameState::new();
        apply_save(&mut restored, &save);
        assert_eq!(restored, original);
    }

    #[test]
    fn save_then_load_through_storage() {
        let mut storage = MemoryStorage::new();
        let original = progressed_state();
        save_state(&mut storage, &original).unwrap();
        assert_eq!(load_state(&mut storage), original);
    }

    #[test]
    fn keys_are_camel_case() {
        let json = serde_json::to_string(&extract_save(&GameState::new())).unwrap();
        for key in ["totalPoints", "pointsPerClick", "surgeTimeBonus", "lastSaved", "xpToNextLevel", "currentLevel", "isUnlocked"] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn snapshot_is_flat_with_version_inline() {
        let mut storage = MemoryStorage::new();
        save_state(&mut storage, &progressed_state()).unwrap();
        let json = storage.get(STATE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let top = value.as_object().unwrap();
        assert!(top["points"].is_number());
        assert!(top["lastSaved"].is_string());
        assert_eq!(top["version"], SAVE_VERSION);
        assert!(top["upgrades"].is_array());
        assert!(!top.contains_key("game"));
    }

    #[test]
    fn unversioned_snapshot_reads_as_legacy() {
        let save = parse_state(r#"{"points": 5}"#).unwrap();
        assert_eq!(save.version, LEGACY_VERSION);
        assert!((save.points - 5.0).abs() < 0.001);
    }

    #[test]
    fn missing_pets_backfilled_from_catalog() {
        let json = r#"{
            "points": 75,
            "totalPoints": 500,
            "totalClicks": 120,
            "pointsPerClick": 3,
            "pointsPerSecond": 0,
            "upgrades": [{"id": "better-click", "currentLevel": 2}],
            "lastSaved": "2024-03-01T12:00:00Z"
        }"#;
        let mut storage = MemoryStorage::new();
        storage.set(STATE_KEY, json).unwrap();

        let state = load_state(&mut storage);
        assert_eq!(state.pets, pets::catalog());
        assert!((state.points - 75.0).abs() < 0.001);
        assert!((state.total_points - 500.0).abs() < 0.001);
        assert_eq!(state.total_clicks, 120);
        assert_eq!(state.upgrade("better-click").unwrap().current_level, 2);
        assert!((state.points_per_click - 3.0).abs() < 0.001);
        assert_eq!(state.last_saved.to_rfc3339(), "2024-03-01T12:00:00+00:00");
        // Leveling fields absent: fresh defaults.
        assert_eq!(state.level, 1);
        assert!((state.xp_to_next_level - 100.0).abs() < 0.001);
        assert!((state.points_multiplier - 1.0).abs() < 0.001);
        assert_eq!(state.games.len(), 8);
    }

    #[test]
    fn legacy_upgrade_objects_with_extra_fields_load() {
        let json = r#"{
            "points": 10,
            "totalPoints": 10,
            "upgrades": [{"id": "auto-clicker", "name": "Auto Clicker", "cost": 50, "currentLevel": 3, "maxLevel": 100}]
        }"#;
        let mut storage = MemoryStorage::new();
        storage.set(STATE_KEY, json).unwrap();
        let state = load_state(&mut storage);
        assert_eq!(state.upgrade("auto-clicker").unwrap().current_level, 3);
        assert!((state.points_per_second - 3.0).abs() < 0.001);
    }

    #[test]
    fn unknown_catalog_ids_are_dropped() {
        let json = r#"{"version": 2, "upgrades": [{"id": "warp-drive", "currentLevel": 9}], "pets": [{"id": "ghost", "owned": true}]}"#;
        let mut storage = MemoryStorage::new();
        storage.set(STATE_KEY, json).unwrap();
        let state = load_state(&mut storage);
        assert_eq!(state.total_upgrade_levels(), 0);
        assert!(state.pets.iter().all(|p| !p.owned));
    }

    #[test]
    fn corrupt_save_is_removed() {
        let mut storage = MemoryStorage::new();
        storage.set(STATE_KEY, "{not json").unwrap();
        let state = load_state(&mut storage);
        assert_eq!(state.points, 0.0);
        assert!(!storage.contains(STATE_KEY));
    }

    #[test]
    fn future_version_is_discarded() {
        let mut storage = MemoryStorage::new();
        storage
            .set(STATE_KEY, r#"{"version": 99, "points": 5}"#)
            .unwrap();
        let state = load_state(&mut storage);
        assert_eq!(state.points, 0.0);
        assert!(!storage.contains(STATE_KEY));
    }

    #[test]
    fn negative_points_are_clamped_on_load() {
        let mut storage = MemoryStorage::new();
        storage.set(STATE_KEY, r#"{"points": -50}"#).unwrap();
        assert_eq!(load_state(&mut storage).points, 0.0);
    }

    #[test]
    fn unavailable_storage_falls_back_to_defaults() {
        let mut storage = MemoryStorage::unavailable();
        assert_eq!(load_state(&mut storage).total_clicks, 0);
        assert!(load_sound_enabled(&storage));
        assert!(matches!(
            save_state(&mut storage, &GameState::new()),
            Err(StorageError::Unavailable)
        ));
    }

    #[test]
    fn achievements_roundtrip_and_seed_guard() {
        let mut storage = MemoryStorage::new();
        let mut book = AchievementBook::new();
        let mut state = GameState::new();
        state.total_clicks = 1;
        book.evaluate(&Snapshot {
            state: &state,
            surge_activations: 0,
            secret_code_entered: false,
        });
        save_achievements(&mut storage, &book).unwrap();

        let mut loaded = load_achievements(&mut storage);
        assert!(loaded.get("first-click").unwrap().is_unlocked);
        let again = loaded.evaluate(&Snapshot {
            state: &state,
            surge_activations: 0,
            secret_code_entered: false,
        });
        assert!(again.is_empty());
    }

    #[test]
    fn corrupt_achievements_are_removed() {
        let mut storage = MemoryStorage::new();
        storage.set(ACHIEVEMENTS_KEY, "[{]").unwrap();
        let book = load_achievements(&mut storage);
        assert_eq!(book.unlocked_count(), 0);
        assert!(!storage.contains(ACHIEVEMENTS_KEY));
    }

    #[test]
    fn sound_setting() {
        let mut storage = MemoryStorage::new();
        assert!(load_sound_enabled(&storage));
        save_sound_enabled(&mut storage, false).unwrap();
        assert!(!load_sound_enabled(&storage));
        save_sound_enabled(&mut storage, true).unwrap();
        assert!(load_sound_enabled(&storage));
    }

    #[test]
    fn sound_is_off_unless_stored_value_is_true() {
        let mut storage = MemoryStorage::new();
        for stored in ["0", "TRUE ", "yes", ""] {
            storage.set(SOUND_KEY, stored).unwrap();
            assert!(!load_sound_enabled(&storage), "{stored:?} should mean off");
        }
    }

    #[test]
    fn clear_removes_both_snapshots() {
        let mut storage = MemoryStorage::new();
        save_state(&mut storage, &GameState::new()).unwrap();
        save_achievements(&mut storage, &AchievementBook::new()).unwrap();
        save_sound_enabled(&mut storage, false).unwrap();
        clear(&mut storage).unwrap();
        assert!(!storage.contains(STATE_KEY));
        assert!(!storage.contains(ACHIEVEMENTS_KEY));
        assert!(storage.contains(SOUND_KEY));
    }
}
