//! Torrent index integration (YTS).
//!
//! Two independent halves live here:
//! - the HTML login flow plus a single cached session ([`SessionProvider`]),
//! - the public JSON API with a cached, strategy-ordered torrent lookup
//!   ([`TorrentLookup`]).

mod index;
mod login;
mod lookup;
mod session;
mod token;
mod types;

pub use index::{TorrentIndex, YtsApiClient};
pub use login::{HttpLoginClient, LoginClient, CSRF_FIELD};
pub use lookup::{
    MovieDetailsResolver, SearchTermResolver, TorrentLookup, TorrentLookupResult,
    TorrentResolver,
};
pub use session::{ObtainedSession, Session, SessionCache, SessionProvider};
pub use token::{FormTokenExtractor, RegexTokenExtractor};
pub use types::*;

use thiserror::Error;

/// Errors from the torrent index integration.
#[derive(Debug, Error)]
pub enum YtsError {
    /// Username or password missing from configuration.
    #[error("Torrent site credentials are not configured")]
    MissingCredentials,

    /// Lookup called without a movie id.
    #[error("Movie id is required")]
    MissingId,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Upstream answered with a non-OK status.
    #[error("{step} returned HTTP {status}")]
    UpstreamStatus { step: &'static str, status: u16 },

    /// The login page did not contain the expected hidden field.
    #[error("Login token not found on the login page")]
    TokenNotFound,

    /// The login POST produced no Set-Cookie headers.
    #[error("Login response did not set any cookies")]
    NoCookies,

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}
