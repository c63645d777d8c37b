//! Authentication service implementation
//!
//! The admin login of the dashboard. Credentials come from configuration and
//! the active session is mirrored to a small JSON file so it survives a
//! restart, the way the browser kept it in local storage. This gates the admin
//! screens; it is not meant to keep a determined attacker out.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::notification::NotificationService;
use crate::config::AuthConfig;
use crate::utils::errors::{GateError, Result};

/// Role carried by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

/// A logged-in admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub username: String,
    pub role: Role,
}

/// Authentication service for the admin area
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    session_path: PathBuf,
    session: Arc<RwLock<Option<AdminSession>>>,
    notifier: NotificationService,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: AuthConfig, notifier: NotificationService) -> Self {
        let session_path = PathBuf::from(&config.session_path);
        Self {
            config,
            session_path,
            session: Arc::new(RwLock::new(None)),
            notifier,
        }
    }

    /// Pick up a session persisted by a previous run
    pub async fn restore(&self) -> Result<Option<AdminSession>> {
        let raw = match tokio::fs::read_to_string(&self.session_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GateError::Io(e)),
        };

        match serde_json::from_str::<AdminSession>(&raw) {
            Ok(session) => {
                debug!(username = %session.username, "Restored admin session");
                *self.session.write().await = Some(session.clone());
                Ok(Some(session))
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session file");
                self.remove_session_file().await?;
                Ok(None)
            }
        }
    }

    /// Check credentials; on success the session is stored and persisted
    pub async fn login(&self, username: &str, password: &str) -> Result<bool> {
        if username != self.config.admin_username || password != self.config.admin_password {
            warn!(username = username, "Failed admin login attempt");
            self.notifier.error("Login Failed", "Invalid username or password");
            return Ok(false);
        }

        let session = AdminSession {
            username: username.to_string(),
            role: Role::Admin,
        };
        let serialized = serde_json::to_string(&session)?;
        tokio::fs::write(&self.session_path, serialized).await?;
        *self.session.write().await = Some(session);

        info!(username = username, "Admin logged in");
        self.notifier.success("Login Successful", "Welcome back, Admin!");
        Ok(true)
    }

    pub async fn logout(&self) -> Result<()> {
        let previous = self.session.write().await.take();
        self.remove_session_file().await?;

        if let Some(session) = previous {
            info!(username = %session.username, "Admin logged out");
        }
        self.notifier.success("Logged Out", "You've been logged out successfully");
        Ok(())
    }

    pub async fn current(&self) -> Option<AdminSession> {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    async fn remove_session_file(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.session_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GateError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn service(dir: &tempfile::TempDir) -> AuthService {
        let mut config = Settings::default().auth;
        config.session_path = dir.path().join("session.json").to_string_lossy().into_owned();
        AuthService::new(config, NotificationService::default())
    }

    #[tokio::test]
    async fn test_login_with_default_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service(&dir);

        assert!(!auth.login("admin", "wrong").await.unwrap());
        assert!(!auth.is_authenticated().await);

        assert!(auth.login("admin", "admin123").await.unwrap());
        let session = auth.current().await.unwrap();
        assert_eq!(session.username, "admin");
        assert_eq!(session.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_session_survives_restart_and_logout_clears_it() {
        let dir = tempfile::tempdir().unwrap();
        let auth = service(&dir);
        auth.login("admin", "admin123").await.unwrap();

        let restarted = service(&dir);
        assert!(restarted.restore().await.unwrap().is_some());
        assert!(restarted.is_authenticated().await);

        restarted.logout().await.unwrap();
        assert!(!restarted.is_authenticated().await);
        assert!(service(&dir).restore().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("session.json"), "{not json").unwrap();

        let auth = service(&dir);
        assert!(auth.restore().await.unwrap().is_none());
        assert!(!dir.path().join("session.json").exists());
    }
}
