use crate::{HarvestEntry, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A client asked for a batch harvest of one series.
    HarvestRequested {
        series_session: String,
        series_title: Option<String>,
        total_pages: Option<u32>,
    },
    /// Engine confirmed the page count and began walking the catalog.
    HarvestStarted { job_id: JobId, total_pages: u32 },
    /// Engine started fetching a page's episode list.
    PageStarted { job_id: JobId, page: u32 },
    /// Every episode task of a page finished; `entries` are in catalog order.
    PageCompleted {
        job_id: JobId,
        page: u32,
        entries: Vec<HarvestEntry>,
        failed_episodes: usize,
    },
    /// A page's episode listing could not be fetched.
    PageSkipped {
        job_id: JobId,
        page: u32,
        reason: String,
    },
    /// All pages processed.
    HarvestFinished { job_id: JobId },
    /// The harvest could not start (page count discovery failed).
    HarvestFailed { job_id: JobId, reason: String },
}
