pub mod entities;
pub mod schema;
pub mod store;
