use super::{
    types::{AuthMethod, Config, StoreBackend},
    ConfigError,
};

/// Upper bound for every cache TTL.
pub const MAX_CACHE_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Bearer auth has a non-empty token
/// - Supabase backend has url and key
/// - Cache TTLs are positive and at most ten years
/// - Sync page sizes are positive
///
/// Torrent-site credentials are deliberately not required here: their absence
/// is reported per request by the login flow.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::Bearer
        && config.auth.token.as_ref().is_none_or(|t| t.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.token must be set when auth.method = \"bearer\"".to_string(),
        ));
    }

    if config.store.backend == StoreBackend::Supabase {
        match &config.store.supabase {
            Some(s) if !s.url.is_empty() && !s.anon_key.is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationError(
                    "store.supabase.url and store.supabase.anon_key are required for the supabase backend"
                        .to_string(),
                ))
            }
        }
    }

    if config.yts.session_ttl_secs == 0
        || config.yts.torrent_cache_ttl_secs == 0
        || config.similar.cache_ttl_secs == 0
    {
        return Err(ConfigError::ValidationError(
            "cache TTLs must be greater than 0".to_string(),
        ));
    }

    for (name, ttl) in [
        ("yts.session_ttl_secs", config.yts.session_ttl_secs),
        ("yts.torrent_cache_ttl_secs", config.yts.torrent_cache_ttl_secs),
        ("similar.cache_ttl_secs", config.similar.cache_ttl_secs),
    ] {
        if ttl > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot exceed {} seconds",
                name, MAX_CACHE_TTL_SECS
            )));
        }
    }

    if config.sync.upcoming_limit == 0 || config.sync.latest_limit == 0 {
        return Err(ConfigError::ValidationError(
            "sync page sizes must be greater than 0".to_string(),
        ));
    }

    if config.sync.interval_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "sync.interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
