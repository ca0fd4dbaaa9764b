//! Cached torrent-site session.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;

use super::login::LoginClient;
use super::YtsError;

/// Authentication cookies plus the moment they were obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub cookies: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Session {
    /// Value for a `Cookie` request header.
    pub fn cookie_header(&self) -> String {
        self.cookies.join("; ")
    }
}

/// Holds at most one session; it is valid while `now - timestamp < ttl`.
pub struct SessionCache {
    slot: RwLock<Option<Session>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached session, if one exists and is still inside the window.
    pub fn get(&self) -> Option<Session> {
        let now = self.clock.now();
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|s| now - s.timestamp < self.ttl)
            .cloned()
    }

    /// Replace whatever is cached, stamped with the current time.
    pub fn store(&self, cookies: Vec<String>) -> Session {
        let session = Session {
            cookies,
            timestamp: self.clock.now(),
        };
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        session
    }

    pub fn invalidate(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn expires_at(&self, session: &Session) -> DateTime<Utc> {
        session
            .timestamp
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// A session and whether obtaining it took a login round trip.
#[derive(Debug, Clone)]
pub struct ObtainedSession {
    pub session: Session,
    pub fresh_login: bool,
}

/// Hands out a valid session, logging in only when the cache is empty or
/// expired.
///
/// There is no lock around the login: callers that find the cache expired at
/// the same time each log in, and whichever stores last wins. Duplicate
/// logins are harmless for the site, so this race is accepted.
pub struct SessionProvider {
    cache: SessionCache,
    login: Arc<dyn LoginClient>,
}

impl SessionProvider {
    pub fn new(cache: SessionCache, login: Arc<dyn LoginClient>) -> Self {
        Self { cache, login }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    pub async fn session(&self) -> Result<ObtainedSession, YtsError> {
        if let Some(session) = self.cache.get() {
            debug!("Reusing cached torrent-site session from {}", session.timestamp);
            return Ok(ObtainedSession {
                session,
                fresh_login: false,
            });
        }
        self.refresh().await
    }

    /// Log in regardless of what is cached.
    pub async fn refresh(&self) -> Result<ObtainedSession, YtsError> {
        let cookies = self.login.login().await?;
        Ok(ObtainedSession {
            session: self.cache.store(cookies),
            fresh_login: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::MockLoginClient;

    fn provider(clock: &Arc<ManualClock>, login: &Arc<MockLoginClient>) -> SessionProvider {
        SessionProvider::new(
            SessionCache::new(Duration::hours(24), clock.clone()),
            login.clone(),
        )
    }

    #[tokio::test]
    async fn test_reuses_session_within_window() {
        let clock = Arc::new(ManualClock::default());
        let login = Arc::new(MockLoginClient::with_cookies(vec!["sid=1"]));
        let provider = provider(&clock, &login);

        let first = provider.session().await.unwrap();
        clock.advance(Duration::hours(23));
        let second = provider.session().await.unwrap();
        let third = provider.session().await.unwrap();

        assert!(first.fresh_login);
        assert!(!second.fresh_login);
        assert_eq!(first.session, second.session);
        assert_eq!(second.session, third.session);
        assert_eq!(login.call_count(), 1);
    }

    #[tokio::test]
    async fn test_logs_in_again_after_expiry() {
        let clock = Arc::new(ManualClock::default());
        let login = Arc::new(MockLoginClient::with_cookies(vec!["sid=1"]));
        let provider = provider(&clock, &login);

        let first = provider.session().await.unwrap();
        clock.advance(Duration::hours(24));
        let second = provider.session().await.unwrap();
        let third = provider.session().await.unwrap();

        assert!(second.fresh_login);
        assert!(!third.fresh_login);
        assert_eq!(second.session.timestamp, first.session.timestamp + Duration::hours(24));
        assert_eq!(login.call_count(), 2);
    }

    #[tokio::test]
    async fn test_refresh_ignores_cache() {
        let clock = Arc::new(ManualClock::default());
        let login = Arc::new(MockLoginClient::with_cookies(vec!["sid=1"]));
        let provider = provider(&clock, &login);

        provider.session().await.unwrap();
        login.set_cookies(vec!["sid=2"]).await;
        let refreshed = provider.refresh().await.unwrap();

        assert_eq!(refreshed.session.cookies, vec!["sid=2".to_string()]);
        assert_eq!(provider.cache().get().unwrap().cookies, vec!["sid=2".to_string()]);
        assert_eq!(login.call_count(), 2);
    }

    #[tokio::test]
    async fn test_login_failure_leaves_cache_empty() {
        let clock = Arc::new(ManualClock::default());
        let login = Arc::new(MockLoginClient::with_cookies(vec!["sid=1"]));
        login.fail_next(YtsError::TokenNotFound).await;
        let provider = provider(&clock, &login);

        let result = provider.session().await;
        assert!(matches!(result, Err(YtsError::TokenNotFound)));
        assert!(provider.cache().get().is_none());
    }

    #[test]
    fn test_cookie_header_and_expiry() {
        let clock = Arc::new(ManualClock::default());
        let cache = SessionCache::new(Duration::hours(24), clock.clone());
        let session = cache.store(vec!["a=1".to_string(), "b=2".to_string()]);

        assert_eq!(session.cookie_header(), "a=1; b=2");
        assert_eq!(cache.expires_at(&session), clock.now() + Duration::hours(24));

        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
