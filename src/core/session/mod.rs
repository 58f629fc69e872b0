//! Server-side sessions.
//!
//! The browser only ever holds an opaque session id in a cookie. Everything
//! attached to the session, currently just its CSRF token, stays here.

use crate::core::config::SessionConfig;
use crate::security::csrf::CsrfToken;
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub csrf: CsrfToken,
    pub last_seen: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            csrf: CsrfToken::new(),
            last_seen: now,
        }
    }

    fn is_expired(&self, ttl_minutes: i64, now: DateTime<Utc>) -> bool {
        ttl_minutes > 0 && now - self.last_seen > Duration::minutes(ttl_minutes)
    }
}

#[derive(Debug)]
pub struct SessionManager {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Looks up a live session and refreshes its idle timer. Never creates one.
    pub async fn resolve(&self, session_id: Option<&str>) -> Option<Session> {
        let session_id = session_id?;
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(session_id) {
            Some(session) if !session.is_expired(self.config.ttl_minutes, now) => {
                session.last_seen = now;
                return Some(session.clone());
            }
            Some(_) => {}
            None => return None,
        }

        debug!("[SESSION] Session {} expired", session_id);
        sessions.remove(session_id);
        None
    }

    /// Returns the live session, or starts a new one. The flag is `true` when created.
    pub async fn resolve_or_create(&self, session_id: Option<&str>) -> (Session, bool) {
        if let Some(session) = self.resolve(session_id).await {
            return (session, false);
        }

        let purged = self.purge_expired().await;
        let session = Session::new();

        let mut sessions = self.sessions.write().await;
        let evicted = evict_least_recent(&mut sessions, self.config.max_sessions.max(1) - 1);
        sessions.insert(session.id.clone(), session.clone());

        info!(
            "[SESSION] Started session {} ({} expired purged, {} evicted)",
            session.id, purged, evicted
        );
        (session, true)
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let ttl = self.config.ttl_minutes;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(ttl, now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub fn session_id_from(&self, cookies: &Cookies) -> Option<String> {
        cookies
            .get(&self.config.cookie_name)
            .map(|c| c.value().to_string())
    }

    /// Page requests: resolve the caller's session, issuing the cookie when new.
    pub async fn session_for_page(&self, cookies: &Cookies) -> Session {
        let current = self.session_id_from(cookies);
        let (session, created) = self.resolve_or_create(current.as_deref()).await;
        if created {
            cookies.add(self.build_cookie(&session.id));
        }
        session
    }

    /// Mutating requests: only an existing session counts.
    pub async fn session_for_write(&self, cookies: &Cookies) -> Option<Session> {
        let current = self.session_id_from(cookies);
        self.resolve(current.as_deref()).await
    }

    pub fn build_cookie(&self, session_id: &str) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), session_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.config.cookie_secure)
            .build()
    }
}

/// Drops the stalest sessions until at most `keep` remain.
fn evict_least_recent(sessions: &mut HashMap<String, Session>, keep: usize) -> usize {
    let excess = sessions.len().saturating_sub(keep);
    if excess == 0 {
        return 0;
    }

    let mut by_age: Vec<(DateTime<Utc>, String)> = sessions
        .values()
        .map(|s| (s.last_seen, s.id.clone()))
        .collect();
    by_age.sort();

    for (_, id) in by_age.into_iter().take(excess) {
        sessions.remove(&id);
    }
    excess
}
