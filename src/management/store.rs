use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::types::Credential;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const EXPIRATION_DATE_KEY: &str = "expiration_date";

type Entries = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential store is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("credential store entry is invalid: {0}")]
    Invalid(String),
}

/// Durable home of the credential, kept as three independent scalar entries.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<Credential>, StoreError>;
    async fn save(&self, credential: &Credential) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Writes `credential` into `entries`. A credential without a refresh token
/// leaves the stored one in place.
pub fn merge_entries(entries: &mut Entries, credential: &Credential) {
    entries.insert(
        ACCESS_TOKEN_KEY.to_string(),
        credential.access_token.clone(),
    );
    entries.insert(
        EXPIRATION_DATE_KEY.to_string(),
        credential
            .expires_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
    );
    if let Some(refresh_token) = &credential.refresh_token {
        entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh_token.clone());
    }
}

pub fn credential_from_entries(entries: &Entries) -> Result<Option<Credential>, StoreError> {
    let Some(access_token) = entries.get(ACCESS_TOKEN_KEY) else {
        return Ok(None);
    };

    let expiration = entries.get(EXPIRATION_DATE_KEY).ok_or_else(|| {
        StoreError::Invalid(format!("{EXPIRATION_DATE_KEY} is missing"))
    })?;
    let expires_at = DateTime::parse_from_rfc3339(expiration)
        .map_err(|e| StoreError::Invalid(format!("{EXPIRATION_DATE_KEY}: {e}")))?
        .with_timezone(&Utc);

    Ok(Some(Credential {
        access_token: access_token.clone(),
        refresh_token: entries.get(REFRESH_TOKEN_KEY).cloned(),
        expires_at,
    }))
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("sporlplay/cache/credentials.json");
        path
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries, StoreError> {
        match async_fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        let entries = self.read_entries().await?;
        credential_from_entries(&entries)
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut entries = self.read_entries().await?;
        merge_entries(&mut entries, credential);

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

/// Non-persistent store with the same entry layout as the file store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<Entries>,
    saves: AtomicUsize,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: &Credential) -> Self {
        let mut entries = Entries::new();
        merge_entries(&mut entries, credential);
        Self {
            entries: Mutex::new(entries),
            saves: AtomicUsize::new(0),
        }
    }

    pub async fn entry(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        credential_from_entries(&*self.entries.lock().await)
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        merge_entries(&mut *self.entries.lock().await, credential);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.lock().await.clear();
        Ok(())
    }
}
