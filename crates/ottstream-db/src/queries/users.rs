//! User account queries.

use chrono::Utc;
use rusqlite::Connection;

use ottstream_common::{Error, Result, UserId};

use crate::models::User;

use super::{parse_timestamp, parse_uuid};

/// Create a new user.
///
/// Fails with `InvalidInput` when the login id is already taken.
pub fn create_user(
    conn: &Connection,
    login_id: &str,
    password_hash: &str,
    display_name: &str,
) -> Result<User> {
    let id = UserId::new();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO users (id, login_id, password_hash, display_name, created_at, updated_at)
         VALUES (:id, :login_id, :password_hash, :display_name, :created_at, :updated_at)",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":login_id": login_id,
            ":password_hash": password_hash,
            ":display_name": display_name,
            ":created_at": now.to_rfc3339(),
            ":updated_at": now.to_rfc3339(),
        },
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            Error::invalid_input(format!("Login '{}' already exists", login_id))
        } else {
            Error::database(e.to_string())
        }
    })?;

    Ok(User {
        id,
        login_id: login_id.to_string(),
        password_hash: password_hash.to_string(),
        display_name: display_name.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Look up a user by login id.
pub fn get_user_by_login(conn: &Connection, login_id: &str) -> Result<Option<User>> {
    let row = conn
        .query_row(
            "SELECT id, login_id, password_hash, display_name, created_at, updated_at
             FROM users WHERE login_id = :login_id",
            rusqlite::named_params! { ":login_id": login_id },
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            e => Err(Error::database(e.to_string())),
        })?;

    row.map(user_from_row).transpose()
}

fn user_from_row(
    (id, login_id, password_hash, display_name, created_at, updated_at): (
        String,
        String,
        String,
        String,
        String,
        String,
    ),
) -> Result<User> {
    Ok(User {
        id: UserId::from(parse_uuid(&id)?),
        login_id,
        password_hash,
        display_name,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
