use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::store::MovieTable;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    #[serde(default)]
    pub yts: YtsConfig,
    #[serde(default)]
    pub similar: SimilarConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Gate for the sync trigger route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Shared bearer token (required when method = "bearer").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    Bearer,
}

/// Movie store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// SQLite database path (backend = "sqlite").
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Hosted Postgres REST settings (backend = "supabase").
    #[serde(default)]
    pub supabase: Option<SupabaseConfig>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_db_path(),
            supabase: None,
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("movono.db")
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Supabase,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupabaseConfig {
    /// Project URL (e.g., "https://xyz.supabase.co")
    pub url: String,
    /// Anon or service-role key
    pub anon_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
}

/// Torrent index (YTS) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct YtsConfig {
    /// Site root, used for the HTML login form.
    #[serde(default = "default_yts_site_url")]
    pub site_url: String,
    /// Public JSON API root.
    #[serde(default = "default_yts_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_short_ttl")]
    pub torrent_cache_ttl_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for YtsConfig {
    fn default() -> Self {
        Self {
            site_url: default_yts_site_url(),
            api_url: default_yts_api_url(),
            username: None,
            password: None,
            session_ttl_secs: default_session_ttl(),
            torrent_cache_ttl_secs: default_short_ttl(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_yts_site_url() -> String {
    "https://yts.mx".to_string()
}

fn default_yts_api_url() -> String {
    "https://yts.mx/api/v2".to_string()
}

fn default_session_ttl() -> u64 {
    24 * 60 * 60
}

fn default_short_ttl() -> u64 {
    60 * 60
}

fn default_timeout() -> u32 {
    30
}

/// Similar-movies cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarConfig {
    #[serde(default = "default_short_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for SimilarConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_short_ttl(),
        }
    }
}

/// Sync orchestrator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Page size pulled from the metadata API's upcoming list.
    #[serde(default = "default_page_size")]
    pub upcoming_limit: u32,
    /// Page size pulled from the torrent index's newest list.
    #[serde(default = "default_page_size")]
    pub latest_limit: u32,
    /// Run a combined sync periodically. Manual trigger only when unset.
    #[serde(default)]
    pub interval_secs: Option<u64>,
    #[serde(default)]
    pub target_table: MovieTable,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            upcoming_limit: default_page_size(),
            latest_limit: default_page_size(),
            interval_secs: None,
            target_table: MovieTable::default(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub store: SanitizedStoreConfig,
    pub tmdb_configured: bool,
    pub yts: SanitizedYtsConfig,
    pub similar: SimilarConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: AuthMethod,
    pub token_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supabase_url: Option<String>,
    pub supabase_key_configured: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedYtsConfig {
    pub site_url: String,
    pub api_url: String,
    pub credentials_configured: bool,
    pub session_ttl_secs: u64,
    pub torrent_cache_ttl_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method,
                token_configured: config
                    .auth
                    .token
                    .as_ref()
                    .is_some_and(|t| !t.is_empty()),
            },
            server: config.server.clone(),
            store: SanitizedStoreConfig {
                backend: config.store.backend,
                path: config.store.path.clone(),
                supabase_url: config.store.supabase.as_ref().map(|s| s.url.clone()),
                supabase_key_configured: config
                    .store
                    .supabase
                    .as_ref()
                    .is_some_and(|s| !s.anon_key.is_empty()),
            },
            tmdb_configured: config
                .tmdb
                .as_ref()
                .is_some_and(|t| !t.api_key.is_empty()),
            yts: SanitizedYtsConfig {
                site_url: config.yts.site_url.clone(),
                api_url: config.yts.api_url.clone(),
                credentials_configured: config.yts.username.is_some()
                    && config.yts.password.is_some(),
                session_ttl_secs: config.yts.session_ttl_secs,
                torrent_cache_ttl_secs: config.yts.torrent_cache_ttl_secs,
            },
            similar: config.similar.clone(),
            sync: config.sync.clone(),
        }
    }
}
