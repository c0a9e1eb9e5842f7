//! Countdown display formatting.

/// Render a playback time as `mm:ss`, or `hh:mm:ss` from one hour on.
///
/// Every component is zero padded to two digits; hours grow past two digits
/// when needed.
pub fn format_playback_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Same as [`format_playback_time`] for a millisecond value, truncating
/// partial seconds.
pub fn format_playback_millis(millis: u64) -> String {
    format_playback_time(millis / 1_000)
}
