use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Session cookies issued by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }

    /// Value for an outgoing `Cookie` header
    pub fn cookie_header(&self) -> Option<String> {
        let parts: Vec<String> = [("access", &self.access), ("refresh", &self.refresh)]
            .into_iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{}={}", name, v)))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }

    /// Apply one `Set-Cookie` header. Returns true if anything changed.
    pub fn absorb_set_cookie(&mut self, header: &str) -> bool {
        let mut attributes = header.split(';').map(str::trim);
        let Some((name, value)) = attributes.next().and_then(|pair| pair.split_once('=')) else {
            return false;
        };

        let value = value.trim().trim_matches('"');
        let expired = attributes.any(|attr| {
            attr.split_once('=')
                .map(|(k, v)| k.trim().eq_ignore_ascii_case("max-age") && v.trim() == "0")
                .unwrap_or(false)
        });
        let new_value = if value.is_empty() || expired {
            None
        } else {
            Some(value.to_string())
        };

        let slot = match name.trim() {
            "access" => &mut self.access,
            "refresh" => &mut self.refresh,
            _ => return false,
        };
        if *slot == new_value {
            return false;
        }
        *slot = new_value;
        true
    }
}

/// Holder for the session credential, injectable so the client can be
/// tested without a real cookie jar
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Credentials;
    fn set(&self, credentials: Credentials);
    fn clear(&self);
}

/// Process-lifetime credential holder
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Credentials {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => {
                tracing::warn!("Credential lock poisoned, reading last stored value");
                poisoned.into_inner().clone()
            }
        }
    }

    fn set(&self, credentials: Credentials) {
        match self.inner.write() {
            Ok(mut guard) => *guard = credentials,
            Err(poisoned) => {
                tracing::warn!("Credential lock poisoned, overwriting stored value");
                *poisoned.into_inner() = credentials;
            }
        }
    }

    fn clear(&self) {
        self.set(Credentials::default());
    }
}

/// Credential holder persisted as JSON so a CLI session survives restarts
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    cache: MemoryCredentialStore,
}

impl FileCredentialStore {
    /// Open the store, loading any credentials already on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let credentials = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path,
            cache: MemoryCredentialStore::with(credentials),
        }
    }

    fn persist(&self, credentials: &Credentials) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, json)
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Credentials {
        self.cache.get()
    }

    fn set(&self, credentials: Credentials) {
        if let Err(e) = self.persist(&credentials) {
            tracing::warn!("Failed to save session to {:?}: {}", self.path, e);
        }
        self.cache.set(credentials);
    }

    fn clear(&self) {
        self.cache.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove session file {:?}: {}", self.path, e),
        }
    }
}
