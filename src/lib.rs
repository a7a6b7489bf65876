pub mod batch;
pub mod config;
pub mod credential;
pub mod error;
pub mod extract;
pub mod history;
pub mod iterator;
pub mod pipeline;
pub mod resolve;
pub mod session;
pub mod slack;
pub mod spotify;
pub mod token_store;
pub mod r#trait;
pub mod types;

pub use batch::{BatchCommitter, BATCH_SIZE};
pub use config::Config;
pub use credential::Credential;
pub use error::ScrapeError;
pub use extract::extract_track;
pub use history::HistoryScanner;
pub use iterator::{AsyncPaginatedIterator, CursorIterator, PageFuture};
pub use pipeline::{PipelineError, PipelineState, ScrapePipeline, ScrapeReport, Stage};
pub use r#trait::{ChatClient, MusicClient, MAX_TRACKS_PER_REQUEST};
pub use resolve::{resolve_channel, resolve_playlist};
pub use session::{CredentialSession, TokenRefresher};
pub use slack::SlackClient;
pub use spotify::{SpotifyClient, SpotifyTokenRefresher};
pub use token_store::TokenStore;
pub use types::{Channel, Cursor, Message, Page, Playlist, TrackId};

#[cfg(feature = "mock")]
pub use r#trait::{MockChatClient, MockMusicClient};
#[cfg(feature = "mock")]
pub use session::MockTokenRefresher;

pub type Result<T> = std::result::Result<T, ScrapeError>;
