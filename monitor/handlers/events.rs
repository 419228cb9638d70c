use std::io::Write;
use std::time::Duration;
use tiny_http::Request;

use crate::sse::{format_sse_event, format_sse_keepalive, write_all, SSE_PREAMBLE};
use crate::state::{lock, SharedState};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Polls without news before a keep-alive comment goes out.
const PINGS_AFTER: u32 = 8;

/// `GET /events` — Server-Sent Events handler.
///
/// Replays the step history recorded so far, then polls the shared state:
/// 1. New `StepStats` entries are written as `event: step` frames.
/// 2. Idle periods produce a `: ping` keep-alive comment.
/// 3. Once training has finished and every step was sent, a final `done`,
///    `stopped` or `failed` event is written and the stream closes.
///
/// Client reconnection is handled natively by `EventSource`; a reconnecting
/// client gets the full history again.
pub fn handle(request: Request, state: SharedState) {
    let mut writer = request.into_writer();
    stream(&mut writer, &state, POLL_INTERVAL);
}

/// Writes the event stream for `state` into `writer` until training has
/// finished or the client goes away.
pub fn stream<W: Write>(writer: &mut W, state: &SharedState, poll_interval: Duration) {
    if write_all(writer, SSE_PREAMBLE.as_bytes()).is_err() {
        return;
    }

    let mut cursor = 0usize;
    let mut idle_polls = 0u32;

    loop {
        // Copy out what is needed so the lock is not held while writing.
        let (pending, final_event) = {
            let st = lock(state);
            let pending: Vec<String> = st.step_history[cursor..].iter()
                .filter_map(|stats| serde_json::to_string(stats).ok())
                .collect();
            cursor = st.step_history.len();
            (pending, st.final_event())
        };

        if pending.is_empty() {
            if let Some((name, payload)) = final_event {
                let _ = write_all(writer, format_sse_event(name, &payload).as_bytes());
                return;
            }
            idle_polls += 1;
            if idle_polls >= PINGS_AFTER {
                idle_polls = 0;
                if write_all(writer, format_sse_keepalive().as_bytes()).is_err() {
                    return;
                }
            }
        } else {
            idle_polls = 0;
            let frames: String = pending.iter()
                .map(|json| format_sse_event("step", json))
                .collect();
            if write_all(writer, frames.as_bytes()).is_err() {
                return;
            }
            // History may have grown while writing; go again before sleeping.
            continue;
        }

        std::thread::sleep(poll_interval);
    }
}
