//! Daily summary view state and chart derivation

use crate::api::ApiError;
use crate::model::{DaySummary, StatusDistribution, TaskStatus};

/// Shown for both transport and application-level failures
pub const SUMMARY_ERROR: &str = "Error loading data. Please try again later.";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SummaryView {
    #[default]
    Loading,
    Ready(DaySummary),
    Failed(String),
}

impl SummaryView {
    pub fn from_result(result: Result<DaySummary, ApiError>) -> Self {
        match result {
            Ok(summary) => SummaryView::Ready(summary),
            Err(e) => {
                tracing::warn!(error = %e, "Day summary unavailable");
                SummaryView::Failed(SUMMARY_ERROR.to_string())
            }
        }
    }

    pub fn summary(&self) -> Option<&DaySummary> {
        match self {
            SummaryView::Ready(summary) => Some(summary),
            _ => None,
        }
    }
}

/// One chart segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartSlice {
    pub status: TaskStatus,
    pub count: u32,
    /// Share of the total in `0.0..=1.0`; all zero when the total is zero
    pub fraction: f64,
}

impl ChartSlice {
    pub fn label(&self) -> &'static str {
        self.status.label()
    }

    pub fn percent(&self) -> u32 {
        (self.fraction * 100.0).round() as u32
    }
}

/// Chart-ready triplet in Pending, In Progress, Completed order
pub fn chart_slices(dist: &StatusDistribution) -> [ChartSlice; 3] {
    let total = dist.total();
    TaskStatus::ALL.map(|status| {
        let count = dist.count(status);
        let fraction = if total == 0 {
            0.0
        } else {
            f64::from(count) / f64::from(total)
        };
        ChartSlice {
            status,
            count,
            fraction,
        }
    })
}

/// Apportion `width` cells across slices by largest remainder
///
/// Widths sum to `width` exactly unless every slice is empty.
pub fn segment_widths(slices: &[ChartSlice; 3], width: u16) -> [u16; 3] {
    let mut widths = [0u16; 3];
    if slices.iter().all(|s| s.count == 0) {
        return widths;
    }

    let exact: Vec<f64> = slices.iter().map(|s| s.fraction * f64::from(width)).collect();
    for (w, e) in widths.iter_mut().zip(&exact) {
        *w = e.floor() as u16;
    }

    let mut remaining = width.saturating_sub(widths.iter().sum());
    let mut order: Vec<usize> = (0..3).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra)
    });
    for i in order {
        if remaining == 0 {
            break;
        }
        if slices[i].count > 0 {
            widths[i] += 1;
            remaining -= 1;
        }
    }
    widths
}

/// Per-task time display: `Xh Ym` from an hour up, `Ym` below
pub fn format_time_spent(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
