use crate::JobId;

/// Work the state machine asks its host to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run a batch harvest. `total_pages: None` asks the engine to discover
    /// the page count from the first catalog page.
    StartHarvest {
        job_id: JobId,
        series_session: String,
        total_pages: Option<u32>,
    },
}
