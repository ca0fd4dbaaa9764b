pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod similar;
pub mod store;
pub mod sync;
pub mod testing;
pub mod tmdb;
pub mod yts;

pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, BearerTokenAuthenticator,
    Caller, NoneAuthenticator,
};
pub use cache::TtlCache;
pub use clock::{system_clock, Clock, ManualClock, SystemClock};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig, StoreBackend,
};
pub use similar::{SimilarError, SimilarMovies};
pub use store::{
    MovieRecord, MovieStore, MovieSummary, MovieTable, SqliteMovieStore, StoreError,
    SupabaseStore,
};
pub use sync::{CombinedSyncResult, SyncCounts, SyncError, SyncOrchestrator, SyncScheduler, SyncType};
pub use tmdb::{CatalogError, MetadataCatalog, TmdbClient};
pub use yts::{
    HttpLoginClient, LoginClient, SessionCache, SessionProvider, Torrent, TorrentIndex,
    TorrentLookup, YtsApiClient, YtsError,
};
