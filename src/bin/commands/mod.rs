pub mod logout;
pub mod scrape;
pub mod utils;

use clap::Subcommand;
use spotctl::Config;

#[derive(Subcommand)]
pub enum Commands {
    /// Copy every Spotify track linked in a Slack channel into a playlist
    ///
    /// The whole channel history is scanned, newest messages first, and the
    /// first Spotify track link of each message is appended to the playlist.
    /// Tracks already in the playlist are not skipped.
    ///
    /// Usage examples:
    /// # Copy tracks from #music into the playlist "Heard in #music"
    /// spotctl scrape music "Heard in #music"
    ///
    /// # Same, with request-level logging
    /// spotctl scrape music "Heard in #music" --verbose
    Scrape {
        /// Slack channel name, without the leading '#'
        channel: String,

        /// Name of the destination Spotify playlist
        playlist: String,
    },

    /// Forget the stored Spotify token
    Logout,
}

pub async fn execute_command(
    command: Commands,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Scrape { channel, playlist } => {
            scrape::handle_scrape(config, &channel, &playlist).await
        }
        Commands::Logout => logout::handle_logout(config),
    }
}
