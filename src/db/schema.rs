//! SQL DDL for the `users` table.
//! The services never require it; it exists for `init_schema` and tests.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT (server-generated, monotonic)
/// - `name`, `username`, `password` as non-null TEXT
pub const USERS_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    username TEXT NOT NULL,
    password TEXT NOT NULL
);
"#;
