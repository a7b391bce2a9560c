//! Database module: models, schema and access to the `users` table.
//!
//! Layout:
//! - `models.rs`: request/response structs and the dynamic row mapping
//! - `schema.rs`: SQL DDL for the `users` table (SQLite)
//! - `sqlite.rs`: one-connection-per-call storage operations

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{ColumnValue, CreateUserRequest, CreatedUser, NewUser, RowMap};
pub use schema::USERS_INIT;
pub use sqlite::UsersStorage;
