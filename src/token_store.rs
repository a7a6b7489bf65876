use crate::credential::Credential;
use crate::{Result, ScrapeError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Credential persistence for the music-service token.
///
/// A single credential record is kept per local user, by default at
/// `~/.local/share/spotctl/token.json` (the XDG data directory). Writes go to a
/// sibling temporary file that is renamed over the record, so a crash mid-write
/// never leaves a truncated record for the next `load`.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the default token file path using XDG directories.
    ///
    /// Returns a path like: `~/.local/share/spotctl/token.json`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            ScrapeError::Config("Cannot determine XDG data directory".to_string())
        })?;

        Ok(data_dir.join("spotctl").join("token.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential.
    ///
    /// Fails with [`ScrapeError::NotFound`] when no record exists yet (first
    /// run) and with [`ScrapeError::Parse`] when the record is unreadable.
    pub fn load(&self) -> Result<Credential> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ScrapeError::NotFound {
                    kind: "token",
                    name: self.path.display().to_string(),
                });
            }
            Err(e) => return Err(ScrapeError::Io(e)),
        };

        let credential = Credential::from_json(&json).map_err(|e| {
            ScrapeError::Parse(format!(
                "Failed to parse token file {}: {e}",
                self.path.display()
            ))
        })?;

        log::debug!("Credential loaded from: {}", self.path.display());
        Ok(credential)
    }

    /// Save a credential, replacing any existing record.
    ///
    /// This creates the necessary directory structure, writes the record to a
    /// temporary file readable only by the owning user, and renames it into place.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    ScrapeError::Persist(format!("Failed to create token directory: {e}"))
                })?;
            }
        }

        let json = credential
            .to_json()
            .map_err(|e| ScrapeError::Persist(format!("Failed to serialize credential: {e}")))?;

        let temp_path = self.temp_path();
        let written = write_private(&temp_path, json.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(ScrapeError::Persist(format!(
                "Failed to write token file {}: {e}",
                self.path.display()
            )));
        }

        log::debug!("Credential saved to: {}", self.path.display());
        Ok(())
    }

    /// Check if a stored credential exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove the stored credential. Removing a missing record succeeds.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("Credential removed from: {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScrapeError::Persist(format!(
                "Failed to remove token file {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "token.json".into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
