use crate::types::TrackId;
use regex::Regex;
use std::sync::LazyLock;

/// Track links as the chat service renders them: `<spotify:track:ID>` or
/// `<https://open.spotify.com/track/ID?si=...>`. The URL form also accepts a
/// `:` after `track`, which some clients produce when rewriting URIs.
static TRACK_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<(?:spotify:track:([a-zA-Z0-9]+)|https://open\.spotify\.com/track[/:]([a-zA-Z0-9]+)(?:\?[^>]*)?)>",
    )
    .expect("track reference pattern is valid")
});

/// Extract the track referenced by a message body, if any.
///
/// Only the first reference in a message is returned; later references in the
/// same message are ignored.
///
/// # Examples
///
/// ```rust
/// use spotctl::extract_track;
///
/// let track = extract_track("new favourite <spotify:track:4uLU6hMCjMI75M1A2tKUQC>");
/// assert_eq!(track.unwrap().as_str(), "4uLU6hMCjMI75M1A2tKUQC");
///
/// assert!(extract_track("no links here").is_none());
/// ```
pub fn extract_track(body: &str) -> Option<TrackId> {
    let captures = TRACK_REFERENCE.captures(body)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| TrackId::new(m.as_str()))
}
