use std::sync::Arc;

use chrono::Duration;
use movono_core::{
    config::MAX_CACHE_TTL_SECS,
    tmdb::MetadataCatalog,
    yts::{LoginClient, SessionCache, SessionProvider, TorrentIndex, TorrentLookup},
    Authenticator, Clock, Config, MovieStore, SanitizedConfig, SimilarMovies, SyncOrchestrator,
};

/// TTL clamped to the ceiling `validate_config` enforces.
fn ttl_duration(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_CACHE_TTL_SECS) as i64)
}

/// Upstream clients and storage the server is wired with.
pub struct AppServices {
    pub login: Arc<dyn LoginClient>,
    pub index: Arc<dyn TorrentIndex>,
    /// Absent when no TMDB key is configured.
    pub catalog: Option<Arc<dyn MetadataCatalog>>,
    pub store: Arc<dyn MovieStore>,
    pub clock: Arc<dyn Clock>,
}

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    sessions: SessionProvider,
    torrents: TorrentLookup,
    similar: Option<SimilarMovies>,
    catalog: Option<Arc<dyn MetadataCatalog>>,
    store: Arc<dyn MovieStore>,
    sync: Arc<SyncOrchestrator>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        services: AppServices,
    ) -> Self {
        let AppServices {
            login,
            index,
            catalog,
            store,
            clock,
        } = services;

        let sessions = SessionProvider::new(
            SessionCache::new(
                ttl_duration(config.yts.session_ttl_secs),
                clock.clone(),
            ),
            login,
        );
        let torrents = TorrentLookup::with_default_resolvers(
            index.clone(),
            ttl_duration(config.yts.torrent_cache_ttl_secs),
            clock.clone(),
        );
        let similar = catalog.as_ref().map(|c| {
            SimilarMovies::new(
                c.clone(),
                ttl_duration(config.similar.cache_ttl_secs),
                clock.clone(),
            )
        });
        let sync = Arc::new(SyncOrchestrator::new(
            catalog.clone(),
            index,
            store.clone(),
            config.sync.clone(),
            clock,
        ));

        Self {
            config,
            authenticator,
            sessions,
            torrents,
            similar,
            catalog,
            store,
            sync,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn sessions(&self) -> &SessionProvider {
        &self.sessions
    }

    pub fn torrents(&self) -> &TorrentLookup {
        &self.torrents
    }

    pub fn similar(&self) -> Option<&SimilarMovies> {
        self.similar.as_ref()
    }

    pub fn catalog(&self) -> Option<&Arc<dyn MetadataCatalog>> {
        self.catalog.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn MovieStore> {
        &self.store
    }

    pub fn sync(&self) -> &Arc<SyncOrchestrator> {
        &self.sync
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_duration_clamps_out_of_range() {
        assert_eq!(ttl_duration(3600), Duration::hours(1));
        let ceiling = Duration::seconds(MAX_CACHE_TTL_SECS as i64);
        assert_eq!(ttl_duration(10_000_000_000_000_000), ceiling);
        assert_eq!(ttl_duration(u64::MAX), ceiling);
    }
}
