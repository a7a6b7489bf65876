use thiserror::Error;

/// Error types for scraping a chat channel into a playlist.
///
/// Every variant is fatal to a run: nothing in this crate retries on its own.
/// Callers decide what to tell the operator based on the variant.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use spotctl::{ScrapeError, TokenStore};
///
/// let store = TokenStore::new("/tmp/spotctl-token.json");
/// match store.load() {
///     Ok(credential) => println!("token expires at {}", credential.expiry),
///     Err(ScrapeError::NotFound { .. }) => eprintln!("no stored token, authorize first"),
///     Err(e) => eprintln!("cannot read token: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// No credential is available and none can be obtained without the
    /// interactive authorization handshake.
    #[error("Authorization required: no stored credential")]
    AuthRequired,

    /// The refresh secret was rejected by the music service.
    ///
    /// The stored credential is unusable; the authorization handshake must be
    /// run again before the next invocation.
    #[error("Authorization expired: {0}")]
    AuthExpired(String),

    /// A channel, playlist or stored record could not be found.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was being looked up ("channel", "playlist", "token")
        kind: &'static str,
        /// The name or location that did not resolve
        name: String,
    },

    /// HTTP/network related errors.
    ///
    /// This includes connection failures, non-success status codes and error
    /// payloads returned by either remote service.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A batch of tracks was rejected by the destination playlist.
    ///
    /// `committed` is the number of tracks added by earlier batches of the same
    /// run, which is where a manual resume should start.
    #[error("Adding tracks failed after {committed} tracks were committed: {source}")]
    Commit {
        /// Tracks already committed before the failing batch
        committed: usize,
        /// Why the batch was rejected
        #[source]
        source: Box<ScrapeError>,
    },

    /// The token store could not be written.
    #[error("Failed to persist credential: {0}")]
    Persist(String),

    /// A response body or stored record could not be parsed.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
