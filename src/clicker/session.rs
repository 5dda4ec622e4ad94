//! The single owner of a running game.
//!
//! UI events and timer expiries are both turned into [`Command`]s and pushed
//! onto one FIFO queue, which is drained to empty after every dispatch and
//! after every tick. Nothing else mutates the game, so a timer can never
//! observe half of a purchase.

use std::collections::VecDeque;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::achievements::{AchievementBook, CodeKey, SecretCode, Snapshot};
use super::logic::{self, Gain};
use super::save::{self, Storage};
use super::state::GameState;
use super::surge::{self, BonusTarget, SurgeSession, SURGE_MULTIPLIER};
use super::unlocks;
use crate::time::{Interval, TICKS_PER_SEC};

const PASSIVE_PERIOD: u32 = 1;
const COUNTDOWN_PERIOD: u32 = TICKS_PER_SEC;
const AUTOSAVE_PERIOD: u32 = 3 * TICKS_PER_SEC;

/// Oldest notifications are dropped past this many.
const MAX_NOTIFICATIONS: usize = 50;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Click,
    PurchaseUpgrade(String),
    PurchasePet(String),
    ClaimBonusTarget,
    ActivateSurge,
    SecretKey(CodeKey),
    ToggleSound,
    Reset,
    PassiveTick,
    SurgeCountdown,
    Autosave,
    HideBonusTarget,
    SpawnBonusTarget,
}

/// Fire-and-forget click feedback.
pub trait SoundTrigger {
    fn play_click_sound(&mut self);
}

/// A sound trigger that does nothing.
pub struct Silent;

impl SoundTrigger for Silent {
    fn play_click_sound(&mut self) {}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// Bounded, newest-last list of user-facing notifications.
#[derive(Clone, Debug, Default)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
}

impl NotificationLog {
    pub fn notify(&mut self, title: &str, body: impl Into<String>) {
        let body = body.into();
        log::info!("{title}: {body}");
        self.entries.push_back(Notification {
            title: title.to_string(),
            body,
        });
        while self.entries.len() > MAX_NOTIFICATIONS {
            self.entries.pop_front();
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct Session {
    state: GameState,
    achievements: AchievementBook,
    surge: SurgeSession,
    /// Activations this session; feeds the surge achievement.
    surge_activations: u32,
    target: BonusTarget,
    secret: SecretCode,
    sound_enabled: bool,

    passive: Interval,
    countdown: Interval,
    autosave: Interval,
    queue: VecDeque<Command>,
    running: bool,

    storage: Box<dyn Storage>,
    sound: Box<dyn SoundTrigger>,
    notifications: NotificationLog,
    rng: SmallRng,
}

impl Session {
    /// Load whatever the storage holds, start the periodic timers, and
    /// schedule the first bonus target.
    pub fn new(mut storage: Box<dyn Storage>, sound: Box<dyn SoundTrigger>, seed: u64) -> Self {
        let state = save::load_state(storage.as_mut());
        let achievements = save::load_achievements(storage.as_mut());
        let sound_enabled = save::load_sound_enabled(storage.as_ref());
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut target = BonusTarget::new();
        target.schedule(&mut rng);

        Self {
            state,
            achievements,
            surge: SurgeSession::default(),
            surge_activations: 0,
            target,
            secret: SecretCode::default(),
            sound_enabled,
            passive: Interval::every(PASSIVE_PERIOD),
            countdown: Interval::stopped(COUNTDOWN_PERIOD),
            autosave: Interval::every(AUTOSAVE_PERIOD),
            queue: VecDeque::new(),
            running: true,
            storage,
            sound,
            notifications: NotificationLog::default(),
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    pub fn surge(&self) -> &SurgeSession {
        &self.surge
    }

    pub fn surge_activations(&self) -> u32 {
        self.surge_activations
    }

    pub fn bonus_target(&self) -> &BonusTarget {
        &self.target
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.notifications
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Length in seconds of a SURGE MODE session started now.
    pub fn get_surge_time(&self) -> u32 {
        surge::surge_duration(self.state.surge_time_bonus)
    }

    /// Queue a command and process the queue. Ignored after shutdown.
    pub fn dispatch(&mut self, command: Command) {
        if !self.running {
            return;
        }
        self.queue.push_back(command);
        self.drain();
    }

    /// Step every timer `ticks` times, processing whatever falls due after
    /// each single tick.
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            if !self.running {
                return;
            }
            if self.passive.tick() {
                self.queue.push_back(Command::PassiveTick);
            }
            if self.countdown.tick() {
                self.queue.push_back(Command::SurgeCountdown);
            }
            if self.autosave.tick() {
                self.queue.push_back(Command::Autosave);
            }
            let (spawn_due, hide_due) = self.target.tick();
            if spawn_due {
                self.queue.push_back(Command::SpawnBonusTarget);
            }
            if hide_due {
                self.queue.push_back(Command::HideBonusTarget);
            }
            self.drain();
        }
    }

    /// Stop every timer (bonus-target ones included) and drop queued work.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn shutdown(&mut self) {
        self.running = false;
        self.passive.stop();
        self.countdown.stop();
        self.autosave.stop();
        self.target.cancel();
        self.queue.clear();
        log::debug!("session shut down");
    }

    fn drain(&mut self) {
        while let Some(command) = self.queue.pop_front() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Click => self.click(),
            Command::PurchaseUpgrade(id) => self.purchase_upgrade(&id),
            Command::PurchasePet(id) => self.purchase_pet(&id),
            Command::ClaimBonusTarget => {
                if self.target.take() {
                    self.target.schedule(&mut self.rng);
                    self.queue.push_front(Command::ActivateSurge);
                }
            }
            Command::ActivateSurge => self.start_surge(),
            Command::SecretKey(key) => {
                if self.secret.push(key) {
                    log::info!("secret code entered");
                }
                self.evaluate_achievements();
            }
            Command::ToggleSound => {
                self.sound_enabled = !self.sound_enabled;
                if let Err(e) = save::save_sound_enabled(self.storage.as_mut(), self.sound_enabled) {
                    log::warn!("could not store sound setting: {e}");
                }
            }
            Command::Reset => self.reset(),
            Command::PassiveTick => {
                if let Some(gain) = logic::passive_tick(&mut self.state, self.surge.multiplier()) {
                    self.after_gain(gain);
                }
            }
            Command::SurgeCountdown => {
                if self.surge.countdown() {
                    self.countdown.stop();
                    log::info!("SURGE MODE ended");
                }
            }
            Command::Autosave => self.persist_state(),
            Command::HideBonusTarget => {
                if self.target.take() {
                    self.target.schedule(&mut self.rng);
                }
            }
            Command::SpawnBonusTarget => {
                if !self.target.show(self.surge.is_active()) {
                    self.target.schedule(&mut self.rng);
                }
            }
        }
    }

    fn click(&mut self) {
        if !self.surge.is_active() && logic::roll_surge_trigger(&self.state, &mut self.rng) {
            self.start_surge();
        }
        let gain = logic::click(&mut self.state, self.surge.multiplier());
        if self.sound_enabled {
            self.sound.play_click_sound();
        }
        self.after_gain(gain);
        self.evaluate_achievements();
    }

    fn purchase_upgrade(&mut self, id: &str) {
        let Some(purchase) = logic::purchase_upgrade(&mut self.state, id) else {
            log::debug!("upgrade purchase rejected: {id}");
            return;
        };
        log::info!(
            "bought {id} level {} for {:.0}",
            purchase.new_level,
            purchase.cost
        );
        for pet_id in purchase.pets_unlocked {
            let name = self.state.pet(pet_id).map_or(pet_id, |p| p.name);
            self.notifications
                .notify("New Pet Available", format!("{name} can now be adopted!"));
        }
        self.persist_state();
        self.evaluate_achievements();
    }

    fn purchase_pet(&mut self, id: &str) {
        if !logic::purchase_pet(&mut self.state, id) {
            log::debug!("pet purchase rejected: {id}");
            return;
        }
        if let Some(pet) = self.state.pet(id) {
            self.notifications
                .notify("New Pet!", format!("{} joined you: {}", pet.name, pet.bonus.describe()));
        }
        self.persist_state();
        self.evaluate_achievements();
    }

    /// Idle → Active. Does nothing while a session is already running.
    fn start_surge(&mut self) {
        let seconds = self.get_surge_time();
        if !self.surge.activate(seconds) {
            return;
        }
        self.countdown.start();
        self.surge_activations += 1;
        self.notifications.notify(
            "SURGE MODE!",
            format!("{SURGE_MULTIPLIER}x points for {seconds} seconds!"),
        );
        self.evaluate_achievements();
    }

    fn after_gain(&mut self, gain: Gain) {
        if let Some(level) = gain.level_up {
            self.notifications
                .notify("Level Up!", format!("You reached level {level}!"));
            self.propagate_unlocks();
        }
    }

    fn evaluate_achievements(&mut self) {
        let snapshot = Snapshot {
            state: &self.state,
            surge_activations: self.surge_activations,
            secret_code_entered: self.secret.entered(),
        };
        let newly: Vec<(&'static str, &'static str)> = self
            .achievements
            .evaluate(&snapshot)
            .iter()
            .map(|a| (a.title, a.unlock_message))
            .collect();
        if newly.is_empty() {
            return;
        }
        for (title, message) in newly {
            self.notifications
                .notify("Achievement Unlocked!", format!("{title}: {message}"));
        }
        if let Err(e) = save::save_achievements(self.storage.as_mut(), &self.achievements) {
            log::warn!("could not store achievements: {e}");
        }
        self.propagate_unlocks();
    }

    fn propagate_unlocks(&mut self) {
        let unlocked = self.achievements.unlocked_ids();
        for name in unlocks::propagate(&mut self.state.games, self.state.level, &unlocked) {
            self.notifications
                .notify("New Game Unlocked!", format!("{name} is now available"));
        }
    }

    fn reset(&mut self) {
        if let Err(e) = save::clear(self.storage.as_mut()) {
            log::warn!("could not clear saved progress: {e}");
        }
        self.state = GameState::new();
        self.achievements = AchievementBook::new();
        self.surge = SurgeSession::default();
        self.countdown.stop();
        self.surge_activations = 0;
        self.secret = SecretCode::default();
        self.target.cancel();
        self.target.schedule(&mut self.rng);
        self.notifications
            .notify("Game Reset", "All progress has been reset");
    }

    fn persist_state(&mut self) {
        self.state.last_saved = Utc::now();
        if let Err(e) = save::save_state(self.storage.as_mut(), &self.state) {
            log::warn!("could not save game: {e}");
        }
    }
}
