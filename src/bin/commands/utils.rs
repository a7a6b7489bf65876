use http_client::HttpClient;
use spotctl::{PipelineError, ScrapeError};
use std::sync::Arc;

/// Shared HTTP client for both services.
pub fn native_http_client() -> Arc<dyn HttpClient> {
    Arc::new(http_client::native::NativeClient::new())
}

/// Human-readable diagnostic for a failed run, with a hint where one helps.
pub fn diagnose(error: &PipelineError) -> String {
    let hint = match root_cause(&error.source) {
        ScrapeError::AuthExpired(_) => Some(
            "the stored Spotify token can no longer be refreshed; run `spotctl logout` and authorize again",
        ),
        ScrapeError::NotFound { kind: "channel", .. } => {
            Some("check the channel name and that the Slack token can see it")
        }
        ScrapeError::NotFound { kind: "playlist", .. } => {
            Some("the playlist must already exist in the authorized Spotify account")
        }
        _ => None,
    };

    let mut message = error.to_string();
    if let ScrapeError::Commit { committed, .. } = &error.source {
        message.push_str(&format!(
            "\n   {committed} tracks were added before the failure; they will be added again on the next run"
        ));
    }
    if let Some(hint) = hint {
        message.push_str(&format!("\n   Hint: {hint}"));
    }
    message
}

fn root_cause(error: &ScrapeError) -> &ScrapeError {
    match error {
        ScrapeError::Commit { source, .. } => root_cause(source),
        other => other,
    }
}
