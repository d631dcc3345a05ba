//! SeaORM Entity Crate
//!
//! Defines the SeaORM entities that map to database tables.

pub mod user;
pub mod tsundoku;
pub mod tag;
pub mod tsundoku_tag;

// Entity aliases for schema bootstrap
pub mod prelude {
    pub use super::tag::Entity as Tag;
    pub use super::tsundoku::Entity as Tsundoku;
    pub use super::tsundoku_tag::Entity as TsundokuTag;
    pub use super::user::Entity as User;
}
