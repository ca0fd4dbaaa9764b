pub mod handlers;
pub mod middleware;
pub mod movies;
pub mod routes;
pub mod search;
pub mod session;
pub mod similar;
pub mod sync;
pub mod torrents;

pub use handlers::ErrorResponse;
pub use routes::create_router;
