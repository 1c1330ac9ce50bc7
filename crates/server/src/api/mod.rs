pub mod catalog;
pub mod favorites;
pub mod handlers;
pub mod middleware;
pub mod providers;
pub mod routes;

pub use routes::create_router;
