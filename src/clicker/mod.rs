//! Surge Clicker: an incremental clicker with upgrades, pets, SURGE MODE,
//! achievements, and unlockable mini-games.

pub mod achievements;
pub mod actions;
pub mod format;
pub mod logic;
pub mod pets;
pub mod render;
pub mod save;
pub mod session;
pub mod state;
pub mod surge;
pub mod unlocks;
pub mod upgrades;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{Arrow, ClickState, InputEvent};

use achievements::CodeKey;
use actions::*;
use session::{Command, Session};

/// Which shop panel is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Upgrades,
    Pets,
    Achievements,
    Games,
}

/// Translates UI input into session commands and owns the view state.
pub struct ClickerGame {
    session: Session,
    tab: Tab,
    confirming_reset: bool,
}

impl ClickerGame {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            tab: Tab::Upgrades,
            confirming_reset: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn confirming_reset(&self) -> bool {
        self.confirming_reset
    }

    /// Returns true if the event did something.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Arrow(arrow) => {
                let key = match arrow {
                    Arrow::Up => CodeKey::Up,
                    Arrow::Down => CodeKey::Down,
                    Arrow::Left => CodeKey::Left,
                    Arrow::Right => CodeKey::Right,
                };
                self.session.dispatch(Command::SecretKey(key));
                true
            }
            InputEvent::Key(c) => {
                self.session.dispatch(Command::SecretKey(CodeKey::Char(*c)));
                self.handle_key(c.to_ascii_lowercase())
            }
            InputEvent::Click(id) => self.handle_click(*id),
        }
    }

    fn handle_key(&mut self, key: char) -> bool {
        if self.confirming_reset {
            self.confirming_reset = false;
            if key == 'y' {
                self.session.dispatch(Command::Reset);
            }
            return true;
        }
        match key {
            ' ' | 'c' => self.session.dispatch(Command::Click),
            'x' => self.session.dispatch(Command::ClaimBonusTarget),
            'm' => self.session.dispatch(Command::ToggleSound),
            'r' => self.confirming_reset = true,
            'u' => self.tab = Tab::Upgrades,
            'p' => self.tab = Tab::Pets,
            'a' => self.tab = Tab::Achievements,
            'g' => self.tab = Tab::Games,
            '1'..='9' => {
                let slot = (key as u8 - b'1') as usize;
                return self.buy_slot(slot);
            }
            _ => return false,
        }
        true
    }

    /// Number keys buy the n-th entry of the current panel.
    fn buy_slot(&mut self, slot: usize) -> bool {
        let state = self.session.state();
        let command = match self.tab {
            Tab::Upgrades => state
                .visible_upgrades()
                .nth(slot)
                .map(|u| Command::PurchaseUpgrade(u.id.to_string())),
            Tab::Pets => state
                .pets
                .get(slot)
                .map(|p| Command::PurchasePet(p.id.to_string())),
            Tab::Achievements | Tab::Games => None,
        };
        match command {
            Some(command) => {
                self.session.dispatch(command);
                true
            }
            None => false,
        }
    }

    fn handle_click(&mut self, id: u16) -> bool {
        match id {
            CLICK_BUTTON => self.session.dispatch(Command::Click),
            CLAIM_BONUS => self.session.dispatch(Command::ClaimBonusTarget),
            TOGGLE_SOUND => self.session.dispatch(Command::ToggleSound),
            RESET_GAME => self.confirming_reset = true,
            CONFIRM_RESET => {
                self.confirming_reset = false;
                self.session.dispatch(Command::Reset);
            }
            CANCEL_RESET => self.confirming_reset = false,
            TAB_UPGRADES => self.tab = Tab::Upgrades,
            TAB_PETS => self.tab = Tab::Pets,
            TAB_ACHIEVEMENTS => self.tab = Tab::Achievements,
            TAB_GAMES => self.tab = Tab::Games,
            _ => {
                let state = self.session.state();
                let command = if (BUY_PET_BASE..BUY_PET_BASE + 100).contains(&id) {
                    state
                        .pets
                        .get((id - BUY_PET_BASE) as usize)
                        .map(|p| Command::PurchasePet(p.id.to_string()))
                } else if (BUY_UPGRADE_BASE..BUY_UPGRADE_BASE + 100).contains(&id) {
                    state
                        .upgrades
                        .get((id - BUY_UPGRADE_BASE) as usize)
                        .map(|u| Command::PurchaseUpgrade(u.id.to_string()))
                } else {
                    None
                };
                let Some(command) = command else {
                    return false;
                };
                self.session.dispatch(command);
            }
        }
        true
    }

    pub fn tick(&mut self, delta_ticks: u32) {
        self.session.advance(delta_ticks);
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }

    /// Stop all timers; used when the page is being torn down.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }
}
