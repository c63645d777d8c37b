//! Admin route guard
//!
//! Decides which screens a visitor may open. The public dashboard is open to
//! everyone; the admin area needs a logged-in session.

use tracing::{debug, warn};

use crate::services::auth::{AdminSession, AuthService};
use crate::utils::errors::{GateError, Result};

/// Screens of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Live camera, door, stats and attendance
    Dashboard,
    /// Roster management and sync controls
    Admin,
    Login,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Admin => "/admin",
            Route::Login => "/login",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "" => Some(Route::Dashboard),
            "/admin" => Some(Route::Admin),
            "/login" => Some(Route::Login),
            _ => None,
        }
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Route::Admin)
    }
}

/// What to do with a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Send the visitor to the login screen first
    RedirectToLogin,
    /// Already logged in; skip the login screen
    RedirectTo(Route),
}

/// Guard in front of the admin screens
#[derive(Clone)]
pub struct AdminGate {
    auth: AuthService,
}

impl AdminGate {
    /// Create a new AdminGate instance
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }

    /// Session required by admin-only operations
    pub async fn require(&self) -> Result<AdminSession> {
        match self.auth.current().await {
            Some(session) => {
                debug!(username = %session.username, "Admin authentication successful");
                Ok(session)
            }
            None => {
                warn!("Unauthorized admin access attempt");
                Err(GateError::PermissionDenied("Admin privileges required".to_string()))
            }
        }
    }

    pub async fn check_route(&self, route: Route) -> RouteDecision {
        let logged_in = self.auth.is_authenticated().await;
        match (route, logged_in) {
            (Route::Login, true) => RouteDecision::RedirectTo(Route::Admin),
            (r, false) if r.requires_admin() => RouteDecision::RedirectToLogin,
            _ => RouteDecision::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::services::NotificationService;

    fn gate(dir: &tempfile::TempDir) -> (AdminGate, AuthService) {
        let mut config = Settings::default().auth;
        config.session_path = dir.path().join("session.json").to_string_lossy().into_owned();
        let auth = AuthService::new(config, NotificationService::default());
        (AdminGate::new(auth.clone()), auth)
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::from_path("/admin/"), Some(Route::Admin));
        assert_eq!(Route::from_path("/"), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/nope"), None);
        assert!(Route::Admin.requires_admin());
        assert!(!Route::Dashboard.requires_admin());
    }

    #[tokio::test]
    async fn test_admin_route_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let (gate, auth) = gate(&dir);

        assert_eq!(gate.check_route(Route::Admin).await, RouteDecision::RedirectToLogin);
        assert_eq!(gate.check_route(Route::Dashboard).await, RouteDecision::Allow);
        assert!(gate.require().await.is_err());

        auth.login("admin", "admin123").await.unwrap();
        assert_eq!(gate.check_route(Route::Admin).await, RouteDecision::Allow);
        assert_eq!(gate.check_route(Route::Login).await, RouteDecision::RedirectTo(Route::Admin));
        assert_eq!(gate.require().await.unwrap().username, "admin");
    }
}
