/// Extension of every exported file.
pub const EXPORT_EXTENSION: &str = "png";

/// Replace each run of characters outside `[A-Za-z0-9]` with a single `_`.
pub fn sanitize_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// `<event>_<user>_<timestamp_ms>.png`, each name sanitized with [`sanitize_component`].
pub fn export_filename(event_name: &str, user_name: &str, timestamp_ms: u128) -> String {
    format!(
        "{}_{}_{timestamp_ms}.{EXPORT_EXTENSION}",
        sanitize_component(event_name),
        sanitize_component(user_name),
    )
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub fn now_ms() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/export/filename.rs"]
mod tests;
