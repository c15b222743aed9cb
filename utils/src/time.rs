//! Duration formatting for log lines.

/// Render a span of seconds as a short human-readable string.
///
/// `u64::MAX` (the "never" sentinel of a schedule) renders as `"never"`.
pub fn format_duration(secs: u64) -> String {
    if secs == u64::MAX {
        "never".to_string()
    } else if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}
