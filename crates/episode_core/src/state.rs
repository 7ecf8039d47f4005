use serde::Serialize;

use crate::view_model::AppViewModel;
use crate::{HarvestEntry, HarvestProgress, SkippedPage};

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    session: SessionState,
    next_job_id: JobId,
    active_job: Option<JobId>,
    series_session: Option<String>,
    series_title: Option<String>,
    progress: HarvestProgress,
    entries: Vec<HarvestEntry>,
    skipped_pages: Vec<SkippedPage>,
    failed_episodes: usize,
    last_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn active_job(&self) -> Option<JobId> {
        self.active_job
    }

    pub fn entries(&self) -> &[HarvestEntry] {
        &self.entries
    }

    pub fn view(&self) -> AppViewModel {
        let percent = match self.session {
            SessionState::Idle => 0.0,
            SessionState::Finished => self.progress.percent(),
            // Page count may still be undiscovered; a failed run never claims completion.
            SessionState::Running | SessionState::Failed => {
                if self.progress.total_pages == 0 {
                    0.0
                } else {
                    self.progress.percent()
                }
            }
        };
        AppViewModel {
            session: self.session,
            series_session: self.series_session.clone(),
            series_title: self.series_title.clone(),
            percent,
            phase_label: self.progress.phase_label.clone(),
            pages_completed: self.progress.pages_completed,
            total_pages: self.progress.total_pages,
            entries: self.entries.iter().map(ToString::to_string).collect(),
            harvested_count: self.entries.len(),
            skipped_pages: self.skipped_pages.clone(),
            failed_episodes: self.failed_episodes,
            last_error: self.last_error.clone(),
        }
    }

    pub(crate) fn is_active(&self, job_id: JobId) -> bool {
        self.session == SessionState::Running && self.active_job == Some(job_id)
    }

    pub(crate) fn begin(
        &mut self,
        series_session: String,
        series_title: Option<String>,
        total_pages: Option<u32>,
    ) -> JobId {
        self.next_job_id += 1;
        let job_id = self.next_job_id;
        self.session = SessionState::Running;
        self.active_job = Some(job_id);
        self.series_session = Some(series_session);
        self.series_title = series_title;
        self.progress = HarvestProgress::new(total_pages.unwrap_or(0));
        self.progress.phase_label = "Starting...".to_string();
        self.entries.clear();
        self.skipped_pages.clear();
        self.failed_episodes = 0;
        self.last_error = None;
        job_id
    }

    pub(crate) fn set_total_pages(&mut self, total_pages: u32) {
        self.progress.total_pages = total_pages;
    }

    pub(crate) fn start_page(&mut self, page: u32) {
        self.progress.start_page(page);
    }

    pub(crate) fn complete_page(
        &mut self,
        page: u32,
        entries: Vec<HarvestEntry>,
        failed_episodes: usize,
    ) {
        self.entries.extend(entries);
        self.failed_episodes += failed_episodes;
        self.progress.complete_page(page);
    }

    pub(crate) fn skip_page(&mut self, page: u32, reason: String) {
        self.skipped_pages.push(SkippedPage { page, reason });
        self.progress.complete_page(page);
    }

    pub(crate) fn finish(&mut self) {
        self.session = SessionState::Finished;
        self.progress.finish();
    }

    pub(crate) fn fail(&mut self, reason: String) {
        self.session = SessionState::Failed;
        self.progress.phase_label = "Error occurred.".to_string();
        self.last_error = Some(reason);
    }
}
