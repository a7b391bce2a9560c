use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::db::{CreateUserRequest, CreatedUser, NewUser, RowMap, UsersStorage};
use crate::error::GateError;
use crate::router::AppState;

fn storage(state: &AppState, route: &str) -> Result<UsersStorage, GateError> {
    state.users_storage().ok_or_else(|| {
        warn!(route, "database route called but DefaultConnection is not configured");
        GateError::DatabaseNotConfigured
    })
}

/// GET /users -> every row of `users` as a column-name keyed object.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<RowMap>>, GateError> {
    let storage = storage(&state, "GET /users")?;
    let rows = storage.list_users().await.map_err(|e| {
        error!(error = %e, "error while fetching users from database");
        GateError::FetchUsers(e)
    })?;
    Ok(Json(rows))
}

/// POST /users -> 201 with `Location: /users/{id}` and the stored user minus password.
pub async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, GateError> {
    // Validation runs before any configuration or database check.
    let user = parse_new_user(&body)?;
    let storage = storage(&state, "POST /users")?;

    let inserted = storage.insert_user(&user).await.map_err(|source| {
        error!(
            error = %source,
            username = %user.username,
            "error while creating user"
        );
        GateError::CreateUser {
            username: user.username.clone(),
            source,
        }
    })?;

    let Some(id) = inserted else {
        error!(username = %user.username, "insert returned no id");
        return Err(GateError::UserNotCreated);
    };

    let created = CreatedUser::new(id, user);
    info!(id = created.id, username = %created.username, "user created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, created.location())],
        Json(created),
    )
        .into_response())
}

/// Decode and validate a create-user body.
pub fn parse_new_user(body: &[u8]) -> Result<NewUser, GateError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GateError::validation("Request body is required."));
    }

    let request = serde_json::from_slice::<Option<CreateUserRequest>>(body)
        .map_err(|_| {
            GateError::validation(
                "Request body must be a JSON object with name, username and password.",
            )
        })?
        .ok_or_else(|| GateError::validation("Request body is required."))?;

    Ok(NewUser {
        name: required(request.name, "Name is required.")?,
        username: required(request.username, "Username is required.")?,
        password: required(request.password, "Password is required.")?,
    })
}

fn required(field: Option<String>, message: &str) -> Result<String, GateError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GateError::validation(message)),
    }
}
