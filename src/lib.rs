pub mod db;
pub mod logging;
pub mod server;
pub mod services;
pub mod web;
