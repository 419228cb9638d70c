use std::io::Write;

// ---------------------------------------------------------------------------
// SSE framing helpers
// ---------------------------------------------------------------------------

/// Raw HTTP preamble for an event stream; written before any frame.
pub const SSE_PREAMBLE: &str = "HTTP/1.1 200 OK\r\n\
                                Content-Type: text/event-stream\r\n\
                                Cache-Control: no-cache\r\n\
                                Connection: keep-alive\r\n\
                                X-Accel-Buffering: no\r\n\
                                \r\n";

/// Formats a named SSE event with a JSON data payload.
///
/// Output format:
/// ```text
/// event: <name>\n
/// data: <json>\n
/// \n
/// ```
pub fn format_sse_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// Keep-alive comment.  EventSource clients ignore lines starting with `:`,
/// but the bytes stop idle proxies from closing the connection.
pub fn format_sse_keepalive() -> &'static str {
    ": ping\n\n"
}

/// Writes all bytes and flushes, returning `Err` once the client is gone.
pub fn write_all<W: Write>(w: &mut W, data: &[u8]) -> std::io::Result<()> {
    w.write_all(data)?;
    w.flush()
}
