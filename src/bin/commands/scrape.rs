use super::utils::{diagnose, native_http_client};
use spotctl::{
    Config, CredentialSession, ScrapePipeline, ScrapeError, SlackClient, SpotifyClient,
    SpotifyTokenRefresher,
};

/// Handle copying a channel's track links into a playlist
pub async fn handle_scrape(
    config: &Config,
    channel: &str,
    playlist: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let slack_token = config.slack_token()?;
    let store = config.token_store();

    let http = native_http_client();
    let refresher = SpotifyTokenRefresher::new(
        http.clone(),
        config.spotify_client_id.clone(),
        config.spotify_client_secret.clone(),
    );
    let session = CredentialSession::from_store(&store, refresher)?;
    if let Err(ScrapeError::AuthRequired) = session.current_credential() {
        return Err(format!(
            "no Spotify token stored at {}; authorize spotctl with Spotify and store the token there first",
            store.path().display()
        )
        .into());
    }

    let spotify = SpotifyClient::new(http.clone(), session);
    let slack = SlackClient::new(http, slack_token.to_string());

    println!("🎵 Copying tracks from #{channel} to '{playlist}'...");
    let result = ScrapePipeline::new(&slack, &spotify)
        .run(channel, playlist)
        .await;

    // A refreshed token is worth keeping even when the run failed.
    match spotify.session().persist_if_replaced(&store) {
        Ok(true) => log::info!("Saved refreshed token to {}", store.path().display()),
        Ok(false) => {}
        Err(e) => {
            println!("⚠️  Warning: Failed to save refreshed token: {e}");
            println!("   (The token will be refreshed again next time)");
        }
    }

    match result {
        Ok(report) => {
            println!(
                "✅ Added {} tracks to '{playlist}' ({} messages scanned)",
                report.tracks_committed, report.messages_scanned
            );
            Ok(())
        }
        Err(e) => Err(diagnose(&e).into()),
    }
}
