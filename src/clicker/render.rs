//! Terminal-cell rendering for the clicker.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ClickableList, TabBar};

use super::actions::*;
use super::format::{format_number, format_time, time_to_target};
use super::session::Session;
use super::unlocks::UnlockCondition;
use super::{ClickerGame, Tab};

const XP_BAR_WIDTH: usize = 20;

pub fn render(game: &ClickerGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let session = game.session();
    let mut cs = click_state.borrow_mut();

    let bonus_height = if session.bonus_target().is_visible() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),            // stats
            Constraint::Length(3),            // click button
            Constraint::Length(bonus_height), // bonus target
            Constraint::Length(1),            // tabs
            Constraint::Min(6),               // shop + log
            Constraint::Length(1),            // hints
        ])
        .split(area);

    render_stats(session, f, chunks[0]);
    render_click_button(session, f, chunks[1], &mut cs);
    if bonus_height > 0 {
        render_bonus_target(session, f, chunks[2], &mut cs);
    }
    render_tabs(game, f, chunks[3], &mut cs);

    let (shop_area, log_area) = if is_narrow_layout(area.width) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(6)])
            .split(chunks[4]);
        (parts[0], parts[1])
    } else {
        let parts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[4]);
        (parts[0], parts[1])
    };
    match game.tab() {
        Tab::Upgrades => render_upgrades(session, f, shop_area, &mut cs),
        Tab::Pets => render_pets(session, f, shop_area, &mut cs),
        Tab::Achievements => render_achievements(session, f, shop_area),
        Tab::Games => render_games(session, f, shop_area),
    }
    render_log(session, f, log_area);
    render_hints(game, f, chunks[5], &mut cs);
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn render_stats(session: &Session, f: &mut Frame, area: Rect) {
    let state = session.state();
    let surge = session.surge();

    let filled = (state.level_progress() * XP_BAR_WIDTH as f64) as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(XP_BAR_WIDTH - filled));

    let surge_line = if surge.is_active() {
        Line::from(Span::styled(
            format!("⚡ SURGE MODE x2 ⚡  {}s left", surge.time_left()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!(
                "Catch a bonus target for {}s of SURGE MODE  (surges: {})",
                session.get_surge_time(),
                session.surge_activations()
            ),
            dim(),
        ))
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} points", format_number(state.points.floor())),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("   {}/click   {}/s", format_number(state.points_per_click), format_number(state.points_per_second)),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(vec![
            Span::styled(format!("Lv {} ", state.level), Style::default().fg(Color::Green)),
            Span::styled(bar, Style::default().fg(Color::Green)),
            Span::styled(
                format!(" {}/{}", format_number(state.xp.floor()), format_number(state.xp_to_next_level)),
                dim(),
            ),
        ]),
        surge_line,
    ];

    let border = if surge.is_active() { Color::Yellow } else { Color::DarkGray };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Surge Clicker "),
    );
    f.render_widget(widget, area);
}

fn render_click_button(session: &Session, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let state = session.state();
    let gain = state.points_per_click
        * state.points_multiplier
        * session.surge().multiplier()
        * (1.0 + state.pet_bonuses().click_value_boost);
    let style = if session.surge().is_active() {
        Style::default().fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };
    let widget = Paragraph::new(Line::from(Span::styled(format!("  CLICK  +{}  ", format_number(gain)), style)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Yellow)));
    f.render_widget(widget, area);
    cs.add_click_target(area, CLICK_BUTTON);
}

fn render_bonus_target(session: &Session, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let widget = Paragraph::new(Line::from(Span::styled(
        format!("★ BONUS TARGET ★  tap or press X for {}s of SURGE MODE", session.get_surge_time()),
        Style::default().fg(Color::Black).bg(Color::Magenta).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(widget, area);
    cs.add_click_target(area, CLAIM_BONUS);
}

fn render_tabs(game: &ClickerGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let book = game.session().achievements();
    let style = |tab: Tab, color: Color| {
        if game.tab() == tab {
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        }
    };
    TabBar::new(" | ")
        .tab("Upgrades", style(Tab::Upgrades, Color::Cyan), TAB_UPGRADES)
        .tab("Pets", style(Tab::Pets, Color::Magenta), TAB_PETS)
        .tab(
            format!("Achievements {}/{}", book.unlocked_count(), book.achievements.len()),
            style(Tab::Achievements, Color::Yellow),
            TAB_ACHIEVEMENTS,
        )
        .tab("Games", style(Tab::Games, Color::Green), TAB_GAMES)
        .render(f, area, cs);
}

fn render_upgrades(session: &Session, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let state = session.state();
    let mut cl = ClickableList::new();

    for (slot, (idx, u)) in state
        .upgrades
        .iter()
        .enumerate()
        .filter(|(_, u)| u.is_visible(state.total_points))
        .enumerate()
    {
        let cost = u.cost();
        let (price, style) = if u.is_maxed() {
            ("MAX".to_string(), Style::default().fg(Color::Green))
        } else if state.points >= cost {
            (format_number(cost), Style::default().fg(Color::White))
        } else {
            let wait = time_to_target(state.points, cost, state.points_per_second)
                .map(|s| format!(" ({})", format_time(s)))
                .unwrap_or_default();
            (format!("{}{wait}", format_number(cost)), dim())
        };
        let max = u.max_level.map_or("∞".to_string(), |m| m.to_string());
        let line = Line::from(vec![
            Span::styled(format!(" {}. ", slot + 1), Style::default().fg(Color::Yellow)),
            Span::styled(format!("{} ", u.name), style.add_modifier(Modifier::BOLD)),
            Span::styled(format!("Lv {}/{max}  ", u.current_level), style),
            Span::styled(price, style),
            Span::styled(format!("  {}", u.description), dim()),
        ]);
        cl.push_clickable(line, BUY_UPGRADE_BASE + idx as u16);
    }

    let next_gate = state
        .upgrades
        .iter()
        .filter_map(|u| u.unlock_points.filter(|&gate| gate > state.total_points))
        .fold(None, |best: Option<f64>, gate| Some(best.map_or(gate, |b| b.min(gate))));
    if let Some(gate) = next_gate {
        cl.push(Line::from(Span::styled(
            format!(" More upgrades at {} total points", format_number(gate)),
            dim(),
        )));
    }

    render_list(cl, f, area, cs, " Upgrades ", Color::Cyan);
}

fn render_pets(session: &Session, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let state = session.state();
    let levels = state.total_upgrade_levels();
    let mut cl = ClickableList::new();

    for (idx, pet) in state.pets.iter().enumerate() {
        let bonus = pet.bonus.describe();
        if pet.owned {
            cl.push(Line::from(vec![
                Span::styled(format!(" ✓ {} ", pet.name), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled(bonus, Style::default().fg(Color::Green)),
            ]));
        } else if pet.unlocked {
            let style = if pet.can_buy(state.points) {
                Style::default().fg(Color::White)
            } else {
                dim()
            };
            let line = Line::from(vec![
                Span::styled(format!(" {}. ", idx + 1), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{} ", pet.name), style.add_modifier(Modifier::BOLD)),
                Span::styled(format!("{}  ", format_number(pet.cost)), style),
                Span::styled(bonus, dim()),
            ]);
            cl.push_clickable(line, BUY_PET_BASE + idx as u16);
        } else {
            cl.push(Line::from(Span::styled(
                format!(" 🔒 {}  {}/{} upgrade levels", pet.name, levels, pet.unlock_level),
                dim(),
            )));
        }
    }

    render_list(cl, f, area, cs, " Pets ", Color::Magenta);
}

fn render_achievements(session: &Session, f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = session
        .achievements()
        .achievements
        .iter()
        .map(|a| {
            if a.is_unlocked {
                Line::from(vec![
                    Span::styled(format!(" ★ {} ", a.title), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                    Span::styled(a.description, dim()),
                ])
            } else {
                Line::from(vec![
                    Span::styled(format!(" · {} ", a.title), Style::default().fg(Color::Gray)),
                    Span::styled(
                        format!("{}/{}  ", format_number(a.progress.floor()), format_number(a.progress_max)),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::styled(a.unlock_message, dim()),
                ])
            }
        })
        .collect();
    render_plain(lines, f, area, " Achievements ", Color::Yellow);
}

fn render_games(session: &Session, f: &mut Frame, area: Rect) {
    let book = session.achievements();
    let lines: Vec<Line> = session
        .state()
        .games
        .iter()
        .map(|g| {
            if g.is_unlocked {
                Line::from(vec![
                    Span::styled(format!(" ▶ {} ", g.name), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                    Span::styled(format!("{} pts", format_number(g.points_cost)), dim()),
                ])
            } else {
                let needs = match &g.condition {
                    UnlockCondition::Level(n) => format!("reach level {n}"),
                    UnlockCondition::Achievement(id) => {
                        let title = book.get(id).map_or(id.as_str(), |a| a.title);
                        format!("unlock \"{title}\"")
                    }
                };
                Line::from(Span::styled(format!(" 🔒 {}  {needs}", g.name), dim()))
            }
        })
        .collect();
    render_plain(lines, f, area, " Games ", Color::Green);
}

fn render_log(session: &Session, f: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let log = session.notifications();
    if log.is_empty() {
        let hint = Line::from(Span::styled(" Click to start earning points.", Style::default().fg(Color::DarkGray)));
        let widget = Paragraph::new(hint)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue)).title(" Log "));
        f.render_widget(widget, area);
        return;
    }
    let lines: Vec<Line> = log
        .iter()
        .skip(log.len().saturating_sub(visible))
        .map(|n| {
            let color = match n.title.as_str() {
                "SURGE MODE!" => Color::Yellow,
                "Achievement Unlocked!" => Color::Magenta,
                "Level Up!" | "New Game Unlocked!" => Color::Green,
                _ => Color::Cyan,
            };
            Line::from(vec![
                Span::styled(format!("{} ", n.title), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(n.body.as_str(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue)).title(" Log "));
    f.render_widget(widget, area);
}

fn render_hints(game: &ClickerGame, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let key_style = Style::default().fg(Color::DarkGray);
    let bar = if game.confirming_reset() {
        TabBar::new("  ")
            .tab("[Y] Confirm reset", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD), CONFIRM_RESET)
            .tab("[N] Cancel", key_style, CANCEL_RESET)
    } else {
        let sound = if game.session().sound_enabled() { "on" } else { "off" };
        TabBar::new("  ")
            .tab("Space: click", key_style, CLICK_BUTTON)
            .tab(format!("[M] Sound {sound}"), key_style, TOGGLE_SOUND)
            .tab("[R] Reset", key_style, RESET_GAME)
    };
    bar.render(f, area, cs);
}

fn render_list(cl: ClickableList, f: &mut Frame, area: Rect, cs: &mut ClickState, title: &str, color: Color) {
    cl.register_targets(area, cs, 1, 1);
    render_plain(cl.into_lines(), f, area, title, color);
}

fn render_plain(lines: Vec<Line>, f: &mut Frame, area: Rect, title: &str, color: Color) {
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title.to_string()),
    );
    f.render_widget(widget, area);
}
