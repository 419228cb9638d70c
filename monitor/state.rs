use std::sync::{Arc, Mutex, MutexGuard, atomic::AtomicBool};

use bitadd_rnn::StepStats;

// ---------------------------------------------------------------------------
// Training status
// ---------------------------------------------------------------------------

pub enum TrainingStatus {
    /// Training is running in a background thread.
    Running {
        stop_flag:   Arc<AtomicBool>,
        total_steps: usize,
    },
    /// Training ran to completion or was stopped from the page.
    Done {
        elapsed_total_ms: u64,
        stopped_early:    bool,
        final_loss:       Option<f64>,
        predicted_3_plus_5: u64,
    },
    /// Training ended with an error (invalid config or non-finite loss).
    Failed {
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct MonitorState {
    pub training:     TrainingStatus,
    /// Every `StepStats` received so far, in step order.
    pub step_history: Vec<StepStats>,
    /// One-line description of the hyperparameters, shown in the page header.
    pub summary:      String,
}

pub type SharedState = Arc<Mutex<MonitorState>>;

impl MonitorState {
    pub fn new(stop_flag: Arc<AtomicBool>, total_steps: usize, summary: String) -> Self {
        MonitorState {
            training: TrainingStatus::Running { stop_flag, total_steps },
            step_history: Vec::with_capacity(total_steps),
            summary,
        }
    }

    /// JSON payload of the terminal SSE event.
    pub fn final_event(&self) -> Option<(&'static str, String)> {
        match &self.training {
            TrainingStatus::Running { .. } => None,
            TrainingStatus::Done { elapsed_total_ms, stopped_early, final_loss, predicted_3_plus_5 } => {
                let payload = serde_json::json!({
                    "elapsed_total_ms": elapsed_total_ms,
                    "steps_completed": self.step_history.len(),
                    "final_loss": final_loss,
                    "predicted_3_plus_5": predicted_3_plus_5,
                });
                let name = if *stopped_early { "stopped" } else { "done" };
                Some((name, payload.to_string()))
            }
            TrainingStatus::Failed { reason } => {
                Some(("failed", serde_json::json!({ "reason": reason }).to_string()))
            }
        }
    }
}

/// Locks the shared state, recovering the data if a handler thread panicked
/// while holding the lock.
pub fn lock(state: &SharedState) -> MutexGuard<'_, MonitorState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> MonitorState {
        MonitorState::new(Arc::new(AtomicBool::new(false)), 10, "test".into())
    }

    #[test]
    fn running_has_no_final_event() {
        assert!(state().final_event().is_none());
    }

    #[test]
    fn stopped_run_reports_stopped() {
        let mut st = state();
        st.training = TrainingStatus::Done {
            elapsed_total_ms: 5,
            stopped_early: true,
            final_loss: Some(0.25),
            predicted_3_plus_5: 8,
        };
        let (name, payload) = st.final_event().unwrap();
        assert_eq!(name, "stopped");
        let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(json["predicted_3_plus_5"], 8);
        assert_eq!(json["steps_completed"], 0);
    }

    #[test]
    fn failure_carries_reason() {
        let mut st = state();
        st.training = TrainingStatus::Failed { reason: "loss became non-finite".into() };
        let (name, payload) = st.final_event().unwrap();
        assert_eq!(name, "failed");
        assert!(payload.contains("non-finite"));
    }
}
