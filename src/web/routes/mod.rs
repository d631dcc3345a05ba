pub mod auth_routes;
pub mod tag_routes;
pub mod time_routes;
pub mod tsundoku_routes;
pub mod user_routes;
