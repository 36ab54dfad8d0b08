//! # Cashier Sessions
//!
//! A session is one cashier's shift: it starts at login, tags every ticket
//! and cash operation, and ends with a closing report at logout.
//!
//! ```text
//!   login  ──► Session { session_id: "20240301-090000", cashier, start_time }
//!                │
//!                ├── tickets.session_id
//!                ├── operations.session_id
//!                ▼
//!   logout ──► ClosingReport (when the session had activity)
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Format of session ids, derived from the login time.
pub const SESSION_ID_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Session id for a login at `at`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use caja_core::session::session_id_for;
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 5, 7).unwrap();
/// assert_eq!(session_id_for(at), "20240301-090507");
/// ```
pub fn session_id_for(at: NaiveDateTime) -> String {
    at.format(SESSION_ID_FORMAT).to_string()
}

/// One login, as appended to the session log (`sesiones.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub cashier: String,
    pub start_time: NaiveDateTime,
}

impl Session {
    pub fn start(cashier: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            session_id: session_id_for(at),
            cashier: cashier.into(),
            start_time: at,
        }
    }
}

/// The active-session document (`session.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub current_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<NaiveDateTime>,
}

impl SessionState {
    pub fn logged_in(session: &Session) -> Self {
        Self {
            logged_in: true,
            current_user: session.cashier.clone(),
            session_id: Some(session.session_id.clone()),
            started_at: Some(session.start_time),
        }
    }

    /// Logged-out state; the last user is remembered.
    pub fn logged_out(last_user: impl Into<String>) -> Self {
        Self {
            logged_in: false,
            current_user: last_user.into(),
            session_id: None,
            started_at: None,
        }
    }

    /// The active session, if someone is logged in.
    pub fn active(&self) -> Option<Session> {
        if !self.logged_in {
            return None;
        }
        let start_time = self.started_at?;
        Some(Session {
            session_id: self
                .session_id
                .clone()
                .unwrap_or_else(|| session_id_for(start_time)),
            cashier: self.current_user.clone(),
            start_time,
        })
    }
}

/// A login entry from `usuarios.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// Checks a username and password against the user list.
pub fn verify_credentials<'a>(
    users: &'a [Credential],
    username: &str,
    password: &str,
) -> CoreResult<&'a Credential> {
    users
        .iter()
        .find(|u| u.username == username.trim() && u.password == password)
        .ok_or(CoreError::InvalidCredentials)
}

// =============================================================================
// Unit Tests
// =============================================================================
