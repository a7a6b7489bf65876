use crate::credential::Credential;
use crate::token_store::TokenStore;
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

/// Exchange of a refresh secret for a fresh access secret.
///
/// Implementations must fail with [`ScrapeError::AuthExpired`] when the service
/// rejects the refresh secret itself, and may keep the old refresh secret when
/// the service does not rotate it.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait TokenRefresher {
    async fn refresh(&self, credential: &Credential) -> Result<Credential>;
}

/// The credential in use for one run, plus the one it started from.
///
/// Every authenticated call on the music side asks the session for a token.
/// When the access secret has expired, or the service rejects it, the session
/// refreshes in place; callers compare against the start state with
/// [`was_replaced`](Self::was_replaced) to decide whether the token store
/// needs to be rewritten.
pub struct CredentialSession<R: TokenRefresher> {
    initial: Option<Credential>,
    current: Mutex<Option<Credential>>,
    refresher: R,
}

impl<R: TokenRefresher> CredentialSession<R> {
    pub fn new(credential: Option<Credential>, refresher: R) -> Self {
        Self {
            initial: credential.clone(),
            current: Mutex::new(credential),
            refresher,
        }
    }

    /// Start a session from whatever the token store holds.
    ///
    /// A missing record is not an error here: the session starts empty and
    /// [`current_credential`](Self::current_credential) reports
    /// [`ScrapeError::AuthRequired`] once something needs a token.
    pub fn from_store(store: &TokenStore, refresher: R) -> Result<Self> {
        match store.load() {
            Ok(credential) => Ok(Self::new(Some(credential), refresher)),
            Err(ScrapeError::NotFound { .. }) => {
                log::debug!("No stored credential at {}", store.path().display());
                Ok(Self::new(None, refresher))
            }
            Err(e) => Err(e),
        }
    }

    /// The credential as it stands now, which may differ from the one the
    /// session was started with.
    pub fn current_credential(&self) -> Result<Credential> {
        self.lock().clone().ok_or(ScrapeError::AuthRequired)
    }

    /// A usable credential, refreshing first if the current one has expired.
    pub async fn usable_credential(&self) -> Result<Credential> {
        let credential = self.current_credential()?;
        if !credential.is_expired() {
            return Ok(credential);
        }

        log::debug!("Access token expired at {}, refreshing", credential.expiry);
        self.refresh().await
    }

    /// A usable access secret, refreshing first if the current one has expired.
    pub async fn access_token(&self) -> Result<String> {
        Ok(self.usable_credential().await?.access_token)
    }

    /// Force a refresh exchange, e.g. after the service rejected the access secret.
    pub async fn refresh(&self) -> Result<Credential> {
        let credential = self.current_credential()?;
        if !credential.can_refresh() {
            return Err(ScrapeError::AuthExpired(
                "stored credential has no refresh token".to_string(),
            ));
        }

        let refreshed = self.refresher.refresh(&credential).await?;
        log::info!(
            "Refreshed access token, new token expires at {}",
            refreshed.expiry
        );
        *self.lock() = Some(refreshed.clone());
        Ok(refreshed)
    }

    /// Whether the current credential differs from the one the session started with.
    pub fn was_replaced(&self) -> bool {
        *self.lock() != self.initial
    }

    /// Write the current credential back to `store` if it changed during the run.
    ///
    /// Returns whether anything was written.
    pub fn persist_if_replaced(&self, store: &TokenStore) -> Result<bool> {
        if !self.was_replaced() {
            return Ok(false);
        }

        match self.lock().as_ref() {
            Some(credential) => store.save(credential)?,
            None => return Ok(false),
        }
        Ok(true)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Credential>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
