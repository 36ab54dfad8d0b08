//! # Session Service
//!
//! Cashier login/logout and the closing report written at logout.
//!
//! ## Session Close
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  logout(notes)                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  report already stored for session? ──yes──► return it (no write)      │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  tickets or operations tagged with session? ──no──► no report          │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  build_closing_report ──► cajas_rendidas.json                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  session.json ← logged out                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info};

use caja_core::reconciliation::{build_closing_report, session_has_activity, ClosingNotes, ClosingReport};
use caja_core::session::{verify_credentials, Session};
use caja_core::Money;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult, ErrorCode};
use caja_store::Store;

/// What logout did.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutOutcome {
    pub session: Session,
    /// `None` when the session had no tickets or operations.
    pub report: Option<ClosingReport>,
}

pub struct SessionService<'a> {
    store: &'a Store,
    config: &'a AppConfig,
}

impl<'a> SessionService<'a> {
    pub fn new(store: &'a Store, config: &'a AppConfig) -> Self {
        SessionService { store, config }
    }

    /// Starts a session for a valid user.
    ///
    /// ## Errors
    /// * `AUTH_ERROR` - unknown user or wrong password
    /// * `BUSINESS_LOGIC` - someone is already logged in
    pub async fn login(&self, username: &str, password: &str, now: NaiveDateTime) -> AppResult<Session> {
        if let Some(active) = self.store.sessions().active().await? {
            return Err(AppError::new(
                ErrorCode::BusinessLogic,
                format!(
                    "{} is already logged in (session {}); log out first",
                    active.cashier, active.session_id
                ),
            ));
        }

        let users = self.store.users().all().await?;
        let user = verify_credentials(&users, username, password)?;

        let session = Session::start(user.username.clone(), now);
        self.store.sessions().start(&session).await?;
        info!(session_id = %session.session_id, cashier = %session.cashier, "Cashier logged in");
        Ok(session)
    }

    /// The logged-in session, or `NO_ACTIVE_SESSION`.
    pub async fn require_active(&self) -> AppResult<Session> {
        self.store
            .sessions()
            .active()
            .await?
            .ok_or_else(AppError::no_session)
    }

    /// Ends the active session, storing its closing report when it had
    /// activity.
    pub async fn logout(&self, notes: ClosingNotes, now: NaiveDateTime) -> AppResult<LogoutOutcome> {
        let session = self.require_active().await?;
        let report = self.close_session(&session, notes, now).await?;
        self.store.sessions().end(&session.cashier).await?;
        info!(
            session_id = %session.session_id,
            reported = report.is_some(),
            "Cashier logged out"
        );
        Ok(LogoutOutcome { session, report })
    }

    /// Aggregates and stores the closing report for `session`.
    ///
    /// Returns the stored report if one already exists, and `None` when
    /// there is nothing to report.
    pub async fn close_session(
        &self,
        session: &Session,
        notes: ClosingNotes,
        now: NaiveDateTime,
    ) -> AppResult<Option<ClosingReport>> {
        if let Some(existing) = self.store.reports().find(&session.session_id).await? {
            debug!(session_id = %session.session_id, "Session already reported");
            return Ok(Some(existing));
        }

        let tickets = self.store.tickets().for_session(&session.session_id).await?;
        let operations = self.store.operations().for_session(&session.session_id).await?;
        if !session_has_activity(&session.session_id, &tickets, &operations) {
            debug!(session_id = %session.session_id, "No activity, skipping closing report");
            return Ok(None);
        }

        let report = build_closing_report(
            &session.session_id,
            &session.cashier,
            &tickets,
            &operations,
            notes,
            now,
        );
        self.store.reports().append(&report).await?;
        info!(
            session_id = %report.session_id,
            net_total = %report.net_total,
            tickets = report.ticket_count,
            "Session closed"
        );
        Ok(Some(report))
    }

    /// Running totals for the active session, not persisted.
    pub async fn preview(&self, now: NaiveDateTime) -> AppResult<ClosingReport> {
        let session = self.require_active().await?;
        let tickets = self.store.tickets().all_or_empty().await;
        let operations = self.store.operations().all_or_empty().await;
        Ok(build_closing_report(
            &session.session_id,
            &session.cashier,
            &tickets,
            &operations,
            ClosingNotes::new(),
            now,
        ))
    }

    /// A stored report, or the most recent one when `session_id` is `None`.
    pub async fn report(&self, session_id: Option<&str>) -> AppResult<ClosingReport> {
        match session_id {
            Some(id) => self
                .store
                .reports()
                .find(id)
                .await?
                .ok_or_else(|| AppError::not_found("Closing report", id)),
            None => self
                .store
                .reports()
                .all()
                .await?
                .pop()
                .ok_or_else(|| AppError::not_found("Closing report", "latest")),
        }
    }

    /// Builds closing notes from `FIELD=amount` entries.
    ///
    /// Every configured field is present; fields not given (or given
    /// with an empty amount) are `None`.
    pub fn closing_notes(&self, entries: &[String]) -> AppResult<ClosingNotes> {
        let mut notes: ClosingNotes = self
            .config
            .closing_note_fields
            .iter()
            .map(|f| (f.clone(), None))
            .collect();

        for entry in entries {
            let (field, amount) = entry.split_once('=').ok_or_else(|| {
                AppError::validation(format!("Closing note '{}' must be FIELD=amount", entry))
            })?;
            let key = self
                .config
                .closing_note_fields
                .iter()
                .find(|f| f.eq_ignore_ascii_case(field.trim()))
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "Unknown closing note '{}'; expected one of: {}",
                        field.trim(),
                        self.config.closing_note_fields.join(", ")
                    ))
                })?;

            let amount = amount.trim();
            let value = if amount.is_empty() {
                None
            } else {
                Some(Money::parse(amount).ok_or_else(|| {
                    AppError::validation(format!("Closing note {} has invalid amount '{}'", key, amount))
                })?)
            };
            notes.insert(key.clone(), value);
        }
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{at, fixture};
    use caja_core::ledger::{Account, CashOperation, OperationKind};

    #[tokio::test]
    async fn test_login_checks_credentials_and_blocks_second_login() {
        let (store, config) = fixture().await;
        let service = SessionService::new(&store, &config);

        let err = service.login("cajero_1", "mal", at(1, 9)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthError);

        let session = service.login("cajero_1", "1234", at(1, 9)).await.unwrap();
        assert_eq!(session.session_id, "20240301-090000");
        assert_eq!(service.require_active().await.unwrap(), session);
        assert_eq!(store.sessions().history().await.unwrap().len(), 1);

        let err = service.login("cajero_1", "1234", at(1, 10)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
    }

    #[tokio::test]
    async fn test_logout_without_activity_writes_no_report() {
        let (store, config) = fixture().await;
        let service = SessionService::new(&store, &config);
        service.login("cajero_1", "1234", at(1, 9)).await.unwrap();

        let outcome = service.logout(ClosingNotes::new(), at(1, 18)).await.unwrap();
        assert!(outcome.report.is_none());
        assert!(store.reports().all().await.unwrap().is_empty());
        assert_eq!(
            service.require_active().await.unwrap_err().code,
            ErrorCode::NoActiveSession
        );
    }

    #[tokio::test]
    async fn test_close_session_is_written_once() {
        let (store, config) = fixture().await;
        let service = SessionService::new(&store, &config);
        let session = service.login("cajero_1", "1234", at(1, 9)).await.unwrap();

        let op = CashOperation::new(
            &session.session_id,
            OperationKind::Income,
            Account::Cash,
            Money::from_cents(2000),
            "cambio",
            at(1, 10),
        )
        .unwrap();
        store.operations().append(&op).await.unwrap();

        let first = service
            .close_session(&session, ClosingNotes::new(), at(1, 18))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.income_total.cents(), 2000);

        let second = service
            .close_session(&session, ClosingNotes::new(), at(1, 19))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second, first);
        assert_eq!(store.reports().all().await.unwrap().len(), 1);
        assert_eq!(service.report(None).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_closing_notes_parsing() {
        let (store, config) = fixture().await;
        let service = SessionService::new(&store, &config);

        let notes = service
            .closing_notes(&["efectivo=1500,50".to_string(), "BBVA=".to_string()])
            .unwrap();
        assert_eq!(notes.len(), 5);
        assert_eq!(notes["EFECTIVO"], Some(Money::from_cents(150050)));
        assert_eq!(notes["BBVA"], None);
        assert_eq!(notes["SALDO SUBE"], None);

        assert!(service.closing_notes(&["OTRO=1".to_string()]).is_err());
        assert!(service.closing_notes(&["EFECTIVO".to_string()]).is_err());
        assert!(service.closing_notes(&["EFECTIVO=abc".to_string()]).is_err());
    }
}
