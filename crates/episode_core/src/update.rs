use crate::{AppState, Effect, Msg, SessionState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Engine messages carrying a job id other than the active one are ignored.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::HarvestRequested {
            series_session,
            series_title,
            total_pages,
        } => {
            let series_session = series_session.trim().to_string();
            if series_session.is_empty() || state.session() == SessionState::Running {
                return (state, Vec::new());
            }
            let job_id = state.begin(series_session.clone(), series_title, total_pages);
            vec![Effect::StartHarvest {
                job_id,
                series_session,
                total_pages,
            }]
        }
        Msg::HarvestStarted {
            job_id,
            total_pages,
        } => {
            if state.is_active(job_id) {
                state.set_total_pages(total_pages);
            }
            Vec::new()
        }
        Msg::PageStarted { job_id, page } => {
            if state.is_active(job_id) {
                state.start_page(page);
            }
            Vec::new()
        }
        Msg::PageCompleted {
            job_id,
            page,
            entries,
            failed_episodes,
        } => {
            if state.is_active(job_id) {
                state.complete_page(page, entries, failed_episodes);
            }
            Vec::new()
        }
        Msg::PageSkipped {
            job_id,
            page,
            reason,
        } => {
            if state.is_active(job_id) {
                state.skip_page(page, reason);
            }
            Vec::new()
        }
        Msg::HarvestFinished { job_id } => {
            if state.is_active(job_id) {
                state.finish();
            }
            Vec::new()
        }
        Msg::HarvestFailed { job_id, reason } => {
            if state.is_active(job_id) {
                state.fail(reason);
            }
            Vec::new()
        }
    };

    (state, effects)
}
