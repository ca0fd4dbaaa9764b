//! Two-step HTML login against the torrent site.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, SET_COOKIE};
use reqwest::{redirect, Client};
use tracing::{debug, info};

use crate::config::YtsConfig;

use super::token::{FormTokenExtractor, RegexTokenExtractor};
use super::YtsError;

/// Name of the hidden anti-forgery field on the login form.
pub const CSRF_FIELD: &str = "csrf_token";

/// Produces a fresh set of authentication cookies.
#[async_trait]
pub trait LoginClient: Send + Sync {
    async fn login(&self) -> Result<Vec<String>, YtsError>;
}

/// Logs in through the site's HTML form.
pub struct HttpLoginClient {
    login_url: String,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
    extractor: Arc<dyn FormTokenExtractor>,
}

impl HttpLoginClient {
    pub fn new(config: &YtsConfig) -> Self {
        Self {
            login_url: format!("{}/login", config.site_url.trim_end_matches('/')),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_secs as u64),
            extractor: Arc::new(RegexTokenExtractor),
        }
    }

    /// Swap the hidden-field extraction strategy.
    pub fn with_extractor(mut self, extractor: Arc<dyn FormTokenExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    fn credentials(&self) -> Result<(&str, &str), YtsError> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
            _ => Err(YtsError::MissingCredentials),
        }
    }

    /// A client with its own cookie jar so the login page's cookies travel
    /// with the POST, and with redirects off so the POST's 3xx is observable.
    fn build_client(&self) -> Result<Client, YtsError> {
        Ok(Client::builder()
            .timeout(self.timeout)
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()?)
    }
}

#[async_trait]
impl LoginClient for HttpLoginClient {
    async fn login(&self) -> Result<Vec<String>, YtsError> {
        let (username, password) = self.credentials()?;
        let client = self.build_client()?;

        debug!("Fetching torrent site login page: {}", self.login_url);
        let page = client.get(&self.login_url).send().await?;
        let status = page.status();
        if !status.is_success() {
            return Err(YtsError::UpstreamStatus {
                step: "login page",
                status: status.as_u16(),
            });
        }

        let html = page.text().await?;
        let token = self
            .extractor
            .extract(&html, CSRF_FIELD)
            .ok_or(YtsError::TokenNotFound)?;

        let response = client
            .post(&self.login_url)
            .form(&[
                ("username", username),
                ("password", password),
                (CSRF_FIELD, token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(YtsError::UpstreamStatus {
                step: "login submit",
                status: status.as_u16(),
            });
        }

        let cookies = cookie_pairs(response.headers());
        if cookies.is_empty() {
            return Err(YtsError::NoCookies);
        }

        info!("Logged in to torrent site ({} cookies)", cookies.len());
        Ok(cookies)
    }
}

/// `name=value` pairs of every Set-Cookie header, attributes stripped, in
/// header order.
pub(crate) fn cookie_pairs(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .map(String::from)
        .collect()
}
