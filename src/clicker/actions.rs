//! Action ids for the clicker's click targets. Registered during render,
//! delivered back through `InputEvent::Click`.

// ── Core ────────────────────────────────────────────────────────
pub const CLICK_BUTTON: u16 = 0;
pub const CLAIM_BONUS: u16 = 1;
pub const TOGGLE_SOUND: u16 = 2;
pub const RESET_GAME: u16 = 3;
pub const CONFIRM_RESET: u16 = 4;
pub const CANCEL_RESET: u16 = 5;

// ── Tabs ────────────────────────────────────────────────────────
pub const TAB_UPGRADES: u16 = 10;
pub const TAB_PETS: u16 = 11;
pub const TAB_ACHIEVEMENTS: u16 = 12;
pub const TAB_GAMES: u16 = 13;

// ── Purchases (base + catalog index) ────────────────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;
pub const BUY_PET_BASE: u16 = 200;
