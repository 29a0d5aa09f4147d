//! Responsive breakpoints for the board and summary layouts.
//!
//! Width thresholds live here so render code never carries magic numbers.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Breakpoint {
    /// < 72 cols: status groups stack in one column
    Narrow,
    /// 72-119 cols: one column per status, compact cards
    Normal,
    /// 120+ cols: columns with planned dates and effort on each card
    Wide,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        match width {
            0..=71 => Breakpoint::Narrow,
            72..=119 => Breakpoint::Normal,
            _ => Breakpoint::Wide,
        }
    }

    pub fn at_least(&self, min: Breakpoint) -> bool {
        *self >= min
    }

    /// Whether the three status groups sit side by side
    pub fn side_by_side(&self) -> bool {
        self.at_least(Breakpoint::Normal)
    }

    /// Whether cards show their planning fields
    pub fn card_details(&self) -> bool {
        self.at_least(Breakpoint::Wide)
    }
}

/// Split the board area into one region per status group.
///
/// Side by side the columns share width evenly. Stacked, each group gets
/// height in proportion to its card count, with room for its header.
pub fn board_regions(area: Rect, counts: [usize; 3]) -> [Rect; 3] {
    let bp = Breakpoint::from_width(area.width);
    let chunks = if bp.side_by_side() {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(area)
    } else {
        // Borders plus at least one line per group
        let weights = counts.map(|c| (c.max(1) as u32) + 2);
        Layout::default()
            .direction(Direction::Vertical)
            .constraints(weights.map(|w| Constraint::Fill(w as u16)))
            .split(area)
    };
    [chunks[0], chunks[1], chunks[2]]
}

/// A rect of at most `width` x `height`, centered in `area`
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}
