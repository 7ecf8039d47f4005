//! Episode core: data model, quality ranking, and the harvest session state machine.
mod effect;
mod filename;
mod msg;
mod quality;
mod resolution;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use filename::{
    download_filename, header_safe_filename, sanitize_title, DEFAULT_DOWNLOAD_FILENAME,
};
pub use msg::Msg;
pub use quality::{compare_quality_desc, quality_rank};
pub use resolution::EpisodeResolution;
pub use state::{AppState, JobId, SessionState};
pub use types::{CandidateLink, HarvestEntry, HarvestProgress, ResolvedSource, SkippedPage};
pub use update::update;
pub use view_model::AppViewModel;
