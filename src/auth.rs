// Authentication context
//
// Holds the bearer credential and the authenticated/unauthenticated state that
// gates the Tasks and Summary screens. The state is probed once at startup from
// the credential file and observed by the TUI through a watch channel, so a 401
// from any request can force the login screen without the caller knowing.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tokio::sync::watch;

/// Whether a usable credential is currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

/// File-backed storage for the bearer token
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token; a missing or blank file means no token
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read credentials {}", self.path.display())),
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create credentials directory")?;
        }
        fs::write(&self.path, token).context("Failed to write credentials")?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove credentials"),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .context("Failed to restrict credentials file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Shared authentication context
///
/// Cheap to clone; all clones observe the same state.
#[derive(Clone)]
pub struct AuthContext {
    store: CredentialStore,
    token: Arc<RwLock<Option<String>>>,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthContext {
    /// Probe the credential store and build the initial state
    pub fn probe(store: CredentialStore) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Ignoring unreadable credentials: {:#}", e);
                None
            }
        };

        let initial = if token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        tracing::debug!(
            state = ?initial,
            path = %store.path().display(),
            "Auth context initialized"
        );

        let (tx, _rx) = watch::channel(initial);
        Self {
            store,
            token: Arc::new(RwLock::new(token)),
            state: Arc::new(tx),
        }
    }

    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    /// Subscribe to state transitions
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Current bearer token, if any
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    /// Store a freshly issued token and become authenticated
    pub fn login(&self, token: String) -> Result<()> {
        let mut slot = self.slot();
        self.store.save(&token)?;
        *slot = Some(token);
        self.state.send_replace(AuthState::Authenticated);
        tracing::info!("Logged in");
        Ok(())
    }

    /// User-initiated logout
    pub fn logout(&self) -> Result<()> {
        let mut slot = self.slot();
        *slot = None;
        self.state.send_replace(AuthState::Unauthenticated);
        self.store.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Server rejected `rejected`; discard it and force re-login
    ///
    /// A no-op when a different token has been stored since the rejected
    /// request went out. Returns whether the credential was dropped.
    pub fn invalidate_if(&self, rejected: &str) -> bool {
        let mut slot = self.slot();
        if slot.as_deref() != Some(rejected) {
            tracing::debug!("Ignoring 401 for a credential that was already replaced");
            return false;
        }

        *slot = None;
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear rejected credentials: {:#}", e);
        }
        self.state.send_replace(AuthState::Unauthenticated);
        tracing::warn!("Credential rejected by server, login required");
        true
    }

    /// Lock the token slot; the file and the watch only change under it
    fn slot(&self) -> RwLockWriteGuard<'_, Option<String>> {
        self.token.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
