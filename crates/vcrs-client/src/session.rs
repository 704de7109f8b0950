//! Persistent session storage.
//!
//! The session is three flat string entries (token, role, user id) in a
//! key-value store. `MemorySessionStore` keeps them for the lifetime of the
//! process; `FileSessionStore` persists them as a YAML map on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::ClientResult;
use crate::models::{Role, Session};
use crate::page::Page;
use crate::ui::{Capabilities, Notice};

pub const TOKEN_KEY: &str = "vcrs_token";
pub const ROLE_KEY: &str = "vcrs_role";
pub const USER_ID_KEY: &str = "vcrs_user_id";

/// Key-value session storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    fn remove(&self, key: &str) -> ClientResult<()>;

    /// Overwrite all three session entries.
    fn save(&self, token: &str, role: &str, user_id: &str) -> ClientResult<()> {
        self.set(TOKEN_KEY, token)?;
        self.set(ROLE_KEY, role)?;
        self.set(USER_ID_KEY, user_id)
    }

    /// Stored token, `None` when absent or empty.
    fn token(&self) -> ClientResult<Option<String>> {
        Ok(self.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Stored role, `None` when absent or not a known role.
    fn role(&self) -> ClientResult<Option<Role>> {
        Ok(self.get(ROLE_KEY)?.and_then(|r| r.parse().ok()))
    }

    fn user_id(&self) -> ClientResult<Option<String>> {
        Ok(self.get(USER_ID_KEY)?.filter(|id| !id.is_empty()))
    }

    /// The stored session, if it has a token and a known role.
    fn session(&self) -> ClientResult<Option<Session>> {
        let (Some(token), Some(role)) = (self.token()?, self.role()?) else {
            return Ok(None);
        };
        Ok(Some(Session {
            token,
            role,
            user_id: self.user_id()?.unwrap_or_default(),
        }))
    }

    fn clear(&self) -> ClientResult<()> {
        self.remove(TOKEN_KEY)?;
        self.remove(ROLE_KEY)?;
        self.remove(USER_ID_KEY)
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

/// Session store backed by a YAML file.
///
/// Every read goes to disk so that clearing the file from outside the
/// process is observed on the next access.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Open the store, creating the parent directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> ClientResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        let content = serde_yaml::to_string(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

/// End the session: clear storage, acknowledge, return to the landing page.
pub fn logout(caps: &Capabilities) -> ClientResult<()> {
    caps.store.clear()?;
    tracing::info!("Session cleared");
    caps.notifier.notify(Notice::info("Logged out successfully."));
    caps.navigator.navigate(Page::Landing);
    Ok(())
}
