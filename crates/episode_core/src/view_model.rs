use serde::Serialize;

use crate::{SessionState, SkippedPage};

/// Status snapshot pulled by whatever presents a harvest.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AppViewModel {
    pub session: SessionState,
    pub series_session: Option<String>,
    pub series_title: Option<String>,
    pub percent: f64,
    pub phase_label: String,
    pub pages_completed: u32,
    pub total_pages: u32,
    /// `"<episode>: <direct url>"`, in catalog order.
    pub entries: Vec<String>,
    pub harvested_count: usize,
    pub skipped_pages: Vec<SkippedPage>,
    pub failed_episodes: usize,
    pub last_error: Option<String>,
}
