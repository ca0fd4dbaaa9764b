//! Mock login client for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::yts::{LoginClient, YtsError};

/// Hands out a configurable cookie set and counts login round trips.
#[derive(Debug, Default)]
pub struct MockLoginClient {
    cookies: RwLock<Vec<String>>,
    calls: AtomicUsize,
    next_error: RwLock<Option<YtsError>>,
}

impl MockLoginClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookies(cookies: Vec<&str>) -> Self {
        Self {
            cookies: RwLock::new(cookies.into_iter().map(str::to_string).collect()),
            ..Default::default()
        }
    }

    /// Cookies returned by subsequent logins.
    pub async fn set_cookies(&self, cookies: Vec<&str>) {
        *self.cookies.write().await = cookies.into_iter().map(str::to_string).collect();
    }

    /// Make the next login fail with `error`.
    pub async fn fail_next(&self, error: YtsError) {
        *self.next_error.write().await = Some(error);
    }

    /// Number of login attempts so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LoginClient for MockLoginClient {
    async fn login(&self) -> Result<Vec<String>, YtsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let cookies = self.cookies.read().await.clone();
        if cookies.is_empty() {
            return Err(YtsError::NoCookies);
        }
        Ok(cookies)
    }
}
