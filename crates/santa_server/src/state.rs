use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use santa_core::{db::open_db, TokenSigner};

use crate::{config::Config, error::ApiError};

pub type SharedState = Arc<State>;

/// Process-wide handles injected into every request.
///
/// SQLite connections are not `Sync`; the mutex serializes access and
/// each request borrows the connection only inside a blocking task.
pub struct State {
    pub config: Config,
    pub signer: TokenSigner,
    db: Mutex<Connection>,
}

impl State {
    pub fn new(config: Config, conn: Connection) -> SharedState {
        let signer = TokenSigner::new(config.secret_key.clone(), config.token_ttl);
        Arc::new(Self {
            config,
            signer,
            db: Mutex::new(conn),
        })
    }

    /// Opens the configured database file and builds the state.
    pub fn open(config: Config) -> Result<SharedState, santa_core::db::DbError> {
        let conn = open_db(&config.db_path)?;
        Ok(Self::new(config, conn))
    }
}

/// Runs `work` against the shared connection on the blocking pool.
pub async fn with_db<T, F>(state: &SharedState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection, &TokenSigner) -> Result<T, ApiError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let mut conn = state
            .db
            .lock()
            .map_err(|_| ApiError::Internal("database mutex poisoned".to_string()))?;
        work(&mut *conn, &state.signer)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}
