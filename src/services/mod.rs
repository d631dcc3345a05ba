pub mod backlog_service;
pub mod line_client;
pub mod time_budget;
pub mod user_directory;

pub use backlog_service::{BacklogService, TsundokuWithTags};
pub use line_client::{LineClient, LineProfile};
pub use user_directory::UserDirectory;
