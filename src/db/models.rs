use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Raw `POST /users` payload. Fields are optional so that a missing field is a
/// validation error rather than a deserialization one. Capitalized keys
/// (`Name`, `Username`, `Password`) are accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "Username")]
    pub username: Option<String>,
    #[serde(default, alias = "Password")]
    pub password: Option<String>,
}

/// A validated user ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Response body of a successful insert. The password is never echoed back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: i64,
    pub name: String,
    pub username: String,
}

impl CreatedUser {
    pub fn new(id: i64, user: NewUser) -> Self {
        Self {
            id,
            name: user.name,
            username: user.username,
        }
    }

    pub fn location(&self) -> String {
        format!("/users/{}", self.id)
    }
}

/// One column value whose type is only known once the query ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Column name to value, in result-set column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowMap(Vec<(String, ColumnValue)>);

impl RowMap {
    pub fn with_capacity(cap: usize) -> Self {
        Self(Vec::with_capacity(cap))
    }

    /// A repeated column name replaces the earlier value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: ColumnValue) {
        let column = column.into();
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RowMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
