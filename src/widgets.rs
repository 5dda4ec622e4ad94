//! Clickable UI building blocks. Each one renders and registers its own
//! click targets, so the rows that are drawn and the rows that respond to
//! taps cannot drift apart.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::Paragraph;
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

/// One row of labelled tabs.
///
/// ```ignore
/// TabBar::new(" | ")
///     .tab("Upgrades", active_style, TAB_UPGRADES)
///     .tab("Pets", idle_style, TAB_PETS)
///     .render(f, area, &mut cs);
/// ```
pub struct TabBar<'a> {
    tabs: Vec<(String, Style, u16)>,
    separator: &'a str,
}

impl<'a> TabBar<'a> {
    pub fn new(separator: &'a str) -> Self {
        Self {
            tabs: Vec::new(),
            separator,
        }
    }

    pub fn tab(mut self, label: impl Into<String>, style: Style, action_id: u16) -> Self {
        self.tabs.push((label.into(), style, action_id));
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let separator_width = Line::from(self.separator).width() as u16;
        let mut spans = Vec::new();
        let mut labels = Vec::new();
        for (i, (label, style, action_id)) in self.tabs.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(self.separator, Style::default().fg(Color::DarkGray)));
            }
            let padded = format!(" {label} ");
            labels.push((Line::from(padded.as_str()).width() as u16, action_id));
            spans.push(Span::styled(padded, style));
        }

        f.render_widget(Paragraph::new(Line::from(spans)), area);
        cs.register_tab_targets(&labels, separator_width, area);
    }
}

/// Lines paired with the action each clickable one triggers.
///
/// ```ignore
/// let mut cl = ClickableList::new();
/// cl.push(Line::from("Shop"));
/// cl.push_clickable(Line::from("Better Click"), BUY_UPGRADE_BASE);
/// cl.register_targets(area, &mut cs, 1, 1);
/// f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
/// ```
#[derive(Default)]
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line index, action id)`
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        self.actions.push((self.lines.len() as u16, action_id));
        self.lines.push(line);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register one row target per clickable line, one line per row,
    /// skipping rows hidden behind the top/bottom offsets (borders).
    pub fn register_targets(&self, area: Rect, cs: &mut ClickState, top_offset: u16, bottom_offset: u16) {
        let first = area.y + top_offset;
        let end = area.y + area.height.saturating_sub(bottom_offset);
        for &(line, action_id) in &self.actions {
            let row = first + line;
            if row < end {
                cs.add_row_target(area, row, action_id);
            }
        }
    }
}
