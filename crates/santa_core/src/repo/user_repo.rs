//! Organizer account persistence.

use super::{map_unique_violation, parse_uuid, RepoError, RepoResult};
use crate::model::user::{User, UserId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    email,
    name,
    password_hash,
    created_at
FROM users";

/// Repository interface for organizer accounts.
pub trait UserRepository {
    /// Inserts a user. Fails with `Duplicate("email")` when taken.
    fn create_user(&self, email: &str, name: &str, password_hash: &str) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Case-insensitive lookup by normalized email.
    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, email: &str, name: &str, password_hash: &str) -> RepoResult<User> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO users (uuid, email, name, password_hash)
                 VALUES (?1, ?2, ?3, ?4);",
                params![id.to_string(), email, name, password_hash],
            )
            .map_err(|err| map_unique_violation(err, "email"))?;

        self.get_user(id)?
            .ok_or_else(|| RepoError::InvalidData(format!("user {id} missing after insert")))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
                [id.to_string()],
                read_user_row,
            )
            .optional()?
            .map(parse_user_row)
            .transpose()
    }

    fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"),
                [email],
                read_user_row,
            )
            .optional()?
            .map(parse_user_row)
            .transpose()
    }
}

struct RawUser {
    uuid: String,
    email: String,
    name: String,
    password_hash: String,
    created_at: i64,
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
        uuid: row.get("uuid")?,
        email: row.get("email")?,
        name: row.get("name")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_user_row(raw: RawUser) -> RepoResult<User> {
    Ok(User {
        id: parse_uuid(&raw.uuid, "users.uuid")?,
        email: raw.email,
        name: raw.name,
        password_hash: raw.password_hash,
        created_at: raw.created_at,
    })
}
