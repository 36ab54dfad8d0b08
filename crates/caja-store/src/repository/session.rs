//! # Session Repository
//!
//! The active session (`session.json`) and the login log (`sesiones.json`).

use tracing::{debug, info};

use caja_core::session::{Session, SessionState};

use crate::document::JsonDocument;
use crate::error::StoreResult;
use crate::store::Store;

pub const STATE_FILE_NAME: &str = "session.json";
pub const LOG_FILE_NAME: &str = "sesiones.json";

#[derive(Debug, Clone)]
pub struct SessionRepository {
    state: JsonDocument<SessionState>,
    log: JsonDocument<Vec<Session>>,
}

impl SessionRepository {
    pub fn new(store: &Store) -> Self {
        SessionRepository {
            state: JsonDocument::new(store.file(STATE_FILE_NAME)),
            log: JsonDocument::new(store.file(LOG_FILE_NAME)),
        }
    }

    /// Current session state. A missing file reads as logged out.
    pub async fn current(&self) -> StoreResult<SessionState> {
        self.state.load().await
    }

    /// The active session, if someone is logged in.
    pub async fn active(&self) -> StoreResult<Option<Session>> {
        Ok(self.current().await?.active())
    }

    /// Records a login: writes the active state and appends to the log.
    pub async fn start(&self, session: &Session) -> StoreResult<()> {
        self.state.save(&SessionState::logged_in(session)).await?;

        let mut log = self.log.load().await?;
        log.push(session.clone());
        self.log.save(&log).await?;

        info!(session_id = %session.session_id, cashier = %session.cashier, "Session started");
        Ok(())
    }

    /// Marks the session as ended, remembering the last user.
    pub async fn end(&self, cashier: &str) -> StoreResult<()> {
        self.state.save(&SessionState::logged_out(cashier)).await?;
        debug!(cashier = %cashier, "Session state cleared");
        Ok(())
    }

    /// Every login ever recorded, oldest first.
    pub async fn history(&self) -> StoreResult<Vec<Session>> {
        self.log.load().await
    }
}
