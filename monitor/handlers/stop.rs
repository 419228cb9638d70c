use std::io::Cursor;
use std::sync::atomic::Ordering;
use tiny_http::Response;

use crate::state::{lock, SharedState, TrainingStatus};

/// `POST /stop` — raises the stop flag; the loop exits after its current step.
pub fn handle_post(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = lock(state);
    if let TrainingStatus::Running { stop_flag, .. } = &st.training {
        log::info!("stop requested from the monitor page");
        stop_flag.store(true, Ordering::Relaxed);
    }
    drop(st);
    crate::routes::no_content()
}
