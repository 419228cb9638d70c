use std::io::Cursor;
use tiny_http::Response;

use crate::state::{lock, SharedState, TrainingStatus};

const TEMPLATE: &str = include_str!("../assets/monitor.html");

/// `GET /` — the live chart page.  The page itself is static apart from the
/// header placeholders; all data arrives over `/events`.
pub fn handle_get(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = lock(state);
    let total_steps = match &st.training {
        TrainingStatus::Running { total_steps, .. } => total_steps.to_string(),
        _ => st.step_history.last().map(|s| s.total_steps.to_string()).unwrap_or_default(),
    };
    let html = TEMPLATE
        .replace("{{SUMMARY}}", &html_escape(&st.summary))
        .replace("{{TOTAL_STEPS}}", &total_steps);
    drop(st);
    crate::routes::html_response(html)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(html_escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn template_has_placeholders() {
        assert!(TEMPLATE.contains("{{SUMMARY}}"));
        assert!(TEMPLATE.contains("{{TOTAL_STEPS}}"));
    }
}
