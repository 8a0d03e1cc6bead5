//! Persistent [`LineStore`](tallyscan_inventory::LineStore) implementations.
//!
//! The in-memory store lives next to the trait in `tallyscan-inventory`.

pub mod sqlite;

pub use sqlite::SqliteLineStore;
