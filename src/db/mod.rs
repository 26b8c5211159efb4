//! SQLite persistence for the key-value store.

mod connection;
mod entries;
mod migrations;

pub use connection::Database;
