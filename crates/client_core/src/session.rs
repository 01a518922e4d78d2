use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use storage::Storage;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// Key the token is persisted under.
pub const TOKEN_KEY: &str = "token";

#[async_trait]
pub trait TokenPersistence: Send + Sync {
    async fn load_token(&self) -> Result<Option<String>>;
    async fn save_token(&self, token: &str) -> Result<()>;
    async fn remove_token(&self) -> Result<()>;
}

#[async_trait]
impl TokenPersistence for Storage {
    async fn load_token(&self) -> Result<Option<String>> {
        self.load_value(TOKEN_KEY).await
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        self.save_value(TOKEN_KEY, token).await
    }

    async fn remove_token(&self) -> Result<()> {
        self.delete_value(TOKEN_KEY).await.map(|_| ())
    }
}

/// Process-local persistence; nothing outlives the process.
#[derive(Default)]
pub struct MemoryTokenPersistence {
    value: Mutex<Option<String>>,
}

impl MemoryTokenPersistence {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(token.into())),
        }
    }

    pub async fn stored(&self) -> Option<String> {
        self.value.lock().await.clone()
    }
}

#[async_trait]
impl TokenPersistence for MemoryTokenPersistence {
    async fn load_token(&self) -> Result<Option<String>> {
        Ok(self.value.lock().await.clone())
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        *self.value.lock().await = Some(token.to_string());
        Ok(())
    }

    async fn remove_token(&self) -> Result<()> {
        *self.value.lock().await = None;
        Ok(())
    }
}

/// Holds the bearer token for the current process.
///
/// Persistence errors never surface to callers: a failed restore leaves the
/// session unauthenticated, a failed save keeps the token in memory and a
/// failed removal still clears it from memory.
pub struct SessionStore {
    token: RwLock<Option<String>>,
    persistence: Arc<dyn TokenPersistence>,
}

impl SessionStore {
    pub fn new(persistence: Arc<dyn TokenPersistence>) -> Arc<Self> {
        Arc::new(Self {
            token: RwLock::new(None),
            persistence,
        })
    }

    pub fn in_memory() -> Arc<Self> {
        Self::new(Arc::new(MemoryTokenPersistence::default()))
    }

    /// Loads a previously persisted token. Returns whether one was found.
    pub async fn restore(&self) -> bool {
        let restored = match self.persistence.load_token().await {
            Ok(token) => token.filter(|token| !token.trim().is_empty()),
            Err(err) => {
                warn!("failed to restore persisted session token: {err:#}");
                None
            }
        };

        let found = restored.is_some();
        if found {
            *self.token.write().await = restored;
        }
        debug!(found, "session restore");
        found
    }

    pub async fn set(&self, token: impl Into<String>) {
        let token = token.into();
        if let Err(err) = self.persistence.save_token(&token).await {
            warn!("failed to persist session token: {err:#}");
        }
        *self.token.write().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
        if let Err(err) = self.persistence.remove_token().await {
            warn!("failed to remove persisted session token: {err:#}");
        }
    }

    pub async fn read(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
