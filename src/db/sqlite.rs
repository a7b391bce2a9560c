use crate::db::models::{ColumnValue, NewUser, RowMap};
use crate::db::schema::USERS_INIT;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Row, TypeInfo, ValueRef};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

/// Access to the `users` table. Holds only the connection string: every call
/// opens its own connection, runs one statement and closes it again.
#[derive(Clone, Debug)]
pub struct UsersStorage {
    url: Arc<str>,
}

impl UsersStorage {
    pub fn new(url: impl Into<Arc<str>>) -> Self {
        Self { url: url.into() }
    }

    async fn connect(&self) -> Result<SqliteConnection, sqlx::Error> {
        SqliteConnectOptions::from_str(&self.url)?.connect().await
    }

    /// Open and close one connection; used as a startup diagnostic.
    pub async fn probe(&self) -> Result<(), sqlx::Error> {
        self.connect().await?.close().await
    }

    /// Startup diagnostic: probe, then optionally create the schema. Both
    /// outcomes are logged; the returned value is the probe result.
    ///
    /// The probe runs first because `init_schema` creates a missing file.
    pub async fn startup_check(&self, init_schema: bool) -> Result<(), sqlx::Error> {
        let probed = self.probe().await;
        match &probed {
            Ok(()) => info!("successfully connected to the database"),
            Err(e) => error!(error = %e, "failed to connect to the database on startup"),
        }

        if init_schema {
            match self.init_schema().await {
                Ok(()) => info!("users schema ready"),
                Err(e) => error!(error = %e, "failed to initialize users schema"),
            }
        }
        probed
    }

    /// Create the database file and the `users` table if missing.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = SqliteConnectOptions::from_str(&self.url)?
            .create_if_missing(true)
            .connect()
            .await?;
        sqlx::query(USERS_INIT.trim()).execute(&mut conn).await?;
        conn.close().await
    }

    /// `SELECT * FROM users`, each row converted into a [`RowMap`].
    pub async fn list_users(&self) -> Result<Vec<RowMap>, sqlx::Error> {
        let mut conn = self.connect().await?;
        let rows = sqlx::query("SELECT * FROM users").fetch_all(&mut conn).await?;
        conn.close().await?;
        rows.iter().map(row_to_map).collect()
    }

    /// Insert one user and return the generated id, if the store produced one.
    pub async fn insert_user(&self, user: &NewUser) -> Result<Option<i64>, sqlx::Error> {
        let mut conn = self.connect().await?;
        let id = sqlx::query_scalar::<_, Option<i64>>(
            "INSERT INTO users (name, username, password) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password)
        .fetch_optional(&mut conn)
        .await?;
        conn.close().await?;
        Ok(id.flatten())
    }
}

/// Convert a row whose column types are unknown at compile time.
///
/// The runtime storage class decides the variant. INTEGER values in a column
/// declared `BOOLEAN` become booleans; BLOBs are base64 text.
pub fn row_to_map(row: &SqliteRow) -> Result<RowMap, sqlx::Error> {
    let mut map = RowMap::with_capacity(row.columns().len());
    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            ColumnValue::Null
        } else {
            let storage = raw.type_info().name().to_ascii_uppercase();
            let declared_bool = column.type_info().name().eq_ignore_ascii_case("BOOLEAN");
            match storage.as_str() {
                "INTEGER" if declared_bool => {
                    ColumnValue::Bool(row.try_get_unchecked::<i64, _>(idx)? != 0)
                }
                "INTEGER" => ColumnValue::Integer(row.try_get_unchecked(idx)?),
                "REAL" => ColumnValue::Real(row.try_get_unchecked(idx)?),
                "BLOB" => {
                    let bytes: Vec<u8> = row.try_get_unchecked(idx)?;
                    ColumnValue::Text(STANDARD.encode(bytes))
                }
                _ => ColumnValue::Text(row.try_get_unchecked(idx)?),
            }
        };
        map.insert(column.name(), value);
    }
    Ok(map)
}
