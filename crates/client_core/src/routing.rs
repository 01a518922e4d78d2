use std::fmt;

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Register,
    Login,
    Workouts,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Register => "/register",
            Route::Login => "/login",
            Route::Workouts => "/workouts",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        match path {
            "/register" => Some(Route::Register),
            "/login" => Some(Route::Login),
            "/workouts" => Some(Route::Workouts),
            _ => None,
        }
    }

    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Workouts)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow(Route),
    RedirectTo(Route),
}

/// Decides a single navigation. Unknown paths land on the login page.
pub fn guard(token: Option<&str>, path: &str) -> RouteDecision {
    match Route::from_path(path) {
        Some(route) if route.requires_session() && token.is_none() => {
            RouteDecision::RedirectTo(Route::Login)
        }
        Some(route) => RouteDecision::Allow(route),
        None => RouteDecision::RedirectTo(Route::Login),
    }
}

/// Reads the session on every call; decisions are never cached.
pub async fn evaluate(session: &SessionStore, path: &str) -> RouteDecision {
    let token = session.read().await;
    guard(token.as_deref(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workouts_route_requires_a_token() {
        assert_eq!(
            guard(None, "/workouts"),
            RouteDecision::RedirectTo(Route::Login)
        );
        assert_eq!(
            guard(Some("tok123"), "/workouts"),
            RouteDecision::Allow(Route::Workouts)
        );
        assert_eq!(
            guard(Some("tok123"), "/workouts/"),
            RouteDecision::Allow(Route::Workouts)
        );
    }

    #[test]
    fn public_routes_are_always_reachable() {
        assert_eq!(guard(None, "/login"), RouteDecision::Allow(Route::Login));
        assert_eq!(
            guard(None, "/register"),
            RouteDecision::Allow(Route::Register)
        );
    }

    #[test]
    fn unknown_routes_redirect_to_login() {
        for path in ["/", "", "/profile", "/workouts/w1", "workouts"] {
            assert_eq!(
                guard(Some("tok123"), path),
                RouteDecision::RedirectTo(Route::Login),
                "path {path:?}"
            );
        }
    }

    #[tokio::test]
    async fn evaluation_follows_session_changes() {
        let session = SessionStore::in_memory();
        assert_eq!(
            evaluate(&session, "/workouts").await,
            RouteDecision::RedirectTo(Route::Login)
        );

        session.set("tok123").await;
        assert_eq!(
            evaluate(&session, "/workouts").await,
            RouteDecision::Allow(Route::Workouts)
        );

        session.clear().await;
        assert_eq!(
            evaluate(&session, "/workouts").await,
            RouteDecision::RedirectTo(Route::Login)
        );
    }
}
