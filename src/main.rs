mod clicker;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use clicker::save::Storage;
use clicker::session::{Session, SoundTrigger};
use clicker::ClickerGame;
use input::{pixel_x_to_col, pixel_y_to_row, Arrow, ClickState, InputEvent};
use time::{GameTime, TICKS_PER_SEC};

#[cfg(target_arch = "wasm32")]
const CLICK_SOUND_URL: &str = "click.mp3";

/// Plays the click sample, restarting it if it is still playing.
#[cfg(target_arch = "wasm32")]
struct ClickSound {
    audio: Option<web_sys::HtmlAudioElement>,
}

#[cfg(target_arch = "wasm32")]
impl ClickSound {
    fn new() -> Self {
        let audio = web_sys::HtmlAudioElement::new_with_src(CLICK_SOUND_URL).ok();
        if audio.is_none() {
            log::warn!("click sound unavailable");
        }
        Self { audio }
    }
}

#[cfg(target_arch = "wasm32")]
impl SoundTrigger for ClickSound {
    fn play_click_sound(&mut self) {
        if let Some(audio) = &self.audio {
            audio.set_current_time(0.0);
            let _ = audio.play();
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn platform() -> (Box<dyn Storage>, Box<dyn SoundTrigger>, u64) {
    let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (
        Box::new(clicker::save::LocalStorage),
        Box::new(ClickSound::new()),
        seed,
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn platform() -> (Box<dyn Storage>, Box<dyn SoundTrigger>, u64) {
    let seed = chrono::Utc::now().timestamp_millis() as u64;
    (
        Box::new(clicker::save::MemoryStorage::new()),
        Box::new(clicker::session::Silent),
        seed,
    )
}

/// Stop the session's timers when the page goes away.
#[cfg(target_arch = "wasm32")]
fn shutdown_on_pagehide(game: Rc<RefCell<ClickerGame>>) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let Some(window) = web_sys::window() else {
        return;
    };
    let on_hide = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        game.borrow_mut().shutdown();
    });
    if window
        .add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref())
        .is_err()
    {
        log::warn!("could not listen for pagehide");
    }
    on_hide.forget();
}

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

/// Convert a mouse position to a terminal cell using the grid container's rect.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let document = web_sys::window()?.document()?;
    // DomBackend renders its grid as the first <div> in <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logging::init();

    let (storage, sound, seed) = platform();
    let game = Rc::new(RefCell::new(ClickerGame::new(Session::new(storage, sound, seed))));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let clock = RefCell::new(GameTime::new(TICKS_PER_SEC));

    #[cfg(target_arch = "wasm32")]
    shutdown_on_pagehide(game.clone());

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed || mouse_event.button != MouseButton::Left {
                return;
            }
            let action = {
                let cs = click_state.borrow();
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };
            if let Some(id) = action {
                log::debug!("click target {id}");
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c),
                KeyCode::Up => InputEvent::Arrow(Arrow::Up),
                KeyCode::Down => InputEvent::Arrow(Arrow::Down),
                KeyCode::Left => InputEvent::Arrow(Arrow::Left),
                KeyCode::Right => InputEvent::Arrow(Arrow::Right),
                _ => return,
            };
            game.borrow_mut().handle_input(&event);
        }
    });

    terminal.draw_web(move |f| {
        let ticks = clock.borrow_mut().update(now_ms());
        if ticks > 0 {
            game.borrow_mut().tick(ticks);
        }

        let size = f.area();
        {
            let mut cs = click_state.borrow_mut();
            cs.terminal_cols = size.width;
            cs.terminal_rows = size.height;
            cs.clear_targets();
        }
        game.borrow().render(f, size, &click_state);
    });

    Ok(())
}
