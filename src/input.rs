//! Input plumbing: normalized events, registered click targets, and
//! pixel-to-cell conversion for mouse and touch.

use ratzilla::ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

/// Keyboard, mouse, and touch input reduced to what the game reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(char),
    Arrow(Arrow),
    /// A tap on a registered target, carrying its action id (see `clicker::actions`).
    Click(u16),
}

/// A screen region, in terminal cells, bound to an action id.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Targets registered by the last render, shared with the mouse handler.
#[derive(Debug, Default)]
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register one full-width row of `area`. Rows outside the area are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Register side-by-side tab labels on one row. `labels` holds each
    /// label's display width and action id; a label's target runs from its
    /// own start to the next label's start, and the last one to the edge.
    pub fn register_tab_targets(&mut self, labels: &[(u16, u16)], separator_width: u16, area: Rect) {
        let mut x = area.x;
        let right = area.x + area.width;
        for (i, &(width, action_id)) in labels.iter().enumerate() {
            if x >= right {
                break;
            }
            let end = if i + 1 == labels.len() {
                right
            } else {
                (x + width + separator_width).min(right)
            };
            self.add_click_target(Rect::new(x, area.y, end - x, area.height.max(1)), action_id);
            x = end;
        }
    }

    /// Action id under a cell. Later registrations sit on top of earlier ones.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = t.rect;
            let inside = col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height;
            inside.then_some(t.action_id)
        })
    }
}

/// Below this width the shop and the notification log stack vertically.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 70
}

/// Map a Y offset (pixels from the grid's top edge) to a terminal row.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    pixel_to_cell(click_y, grid_height, terminal_rows)
}

/// Map an X offset (pixels from the grid's left edge) to a terminal column.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    pixel_to_cell(click_x, grid_width, terminal_cols)
}

fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    (cell < cells).then_some(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_rows_and_columns() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 3, 10, 1), 1);
        cs.add_click_target(Rect::new(10, 3, 10, 2), 2);

        assert_eq!(cs.hit_test(0, 3), Some(1));
        assert_eq!(cs.hit_test(9, 3), Some(1));
        assert_eq!(cs.hit_test(10, 3), Some(2));
        assert_eq!(cs.hit_test(15, 4), Some(2));
        assert_eq!(cs.hit_test(20, 3), None);
        assert_eq!(cs.hit_test(5, 2), None);
    }

    #[test]
    fn later_target_wins_on_overlap() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 40, 5), 1);
        cs.add_click_target(Rect::new(5, 2, 4, 1), 7);
        assert_eq!(cs.hit_test(6, 2), Some(7));
        assert_eq!(cs.hit_test(1, 2), Some(1));
    }

    #[test]
    fn row_target_clipped_to_area() {
        let mut cs = ClickState::new();
        let area = Rect::new(2, 10, 20, 3);
        cs.add_row_target(area, 9, 1);
        cs.add_row_target(area, 13, 2);
        assert!(cs.targets.is_empty());
        cs.add_row_target(area, 11, 3);
        assert_eq!(cs.hit_test(2, 11), Some(3));
        assert_eq!(cs.hit_test(1, 11), None);
    }

    #[test]
    fn tab_targets_cover_the_row() {
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[(8, 10), (6, 11), (5, 12)], 3, Rect::new(0, 4, 40, 1));
        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(0, 4), Some(10));
        assert_eq!(cs.hit_test(10, 4), Some(10)); // separator after the first label
        assert_eq!(cs.hit_test(11, 4), Some(11));
        assert_eq!(cs.hit_test(20, 4), Some(12));
        assert_eq!(cs.hit_test(39, 4), Some(12));
    }

    #[test]
    fn tab_targets_stop_at_area_edge() {
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[(8, 10), (8, 11), (8, 12)], 3, Rect::new(0, 0, 12, 1));
        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(11, 0), Some(11));
    }

    #[test]
    fn clear_drops_targets() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 1, 1), 1);
        cs.clear_targets();
        assert_eq!(cs.hit_test(0, 0), None);
    }

    #[test]
    fn narrow_threshold() {
        assert!(is_narrow_layout(40));
        assert!(is_narrow_layout(69));
        assert!(!is_narrow_layout(70));
    }

    #[test]
    fn pixel_conversion() {
        assert_eq!(pixel_y_to_row(0.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 450.0, 30), Some(1));
        assert_eq!(pixel_y_to_row(449.0, 450.0, 30), Some(29));
        assert_eq!(pixel_y_to_row(450.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(-1.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 0.0, 30), None);
        assert_eq!(pixel_x_to_col(10.0, 800.0, 80), Some(1));
        assert_eq!(pixel_x_to_col(5.0, 800.0, 0), None);
    }

    #[test]
    fn pixel_to_hit_pipeline() {
        let mut cs = ClickState::new();
        cs.terminal_cols = 80;
        cs.terminal_rows = 30;
        cs.add_row_target(Rect::new(0, 0, 80, 30), 12, 5);

        let row = pixel_y_to_row(12.0 * 15.0 + 7.0, 450.0, cs.terminal_rows).unwrap();
        let col = pixel_x_to_col(400.0, 800.0, cs.terminal_cols).unwrap();
        assert_eq!(cs.hit_test(col, row), Some(5));
    }
}
