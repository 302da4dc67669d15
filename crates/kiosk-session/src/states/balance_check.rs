//! # BalanceCheck
//!
//! One balance round trip. A failed lookup ends the whole session so the
//! customer re-authenticates.

use super::{end_session_with_error, Peripherals, SessionState, Teardown};
use crate::domain::{AccountSession, BankError, ErrorPrompt, View, ViewPayload};
use crate::metrics;
use tracing::{debug, error, warn};

/// Legal successors of [`SessionState::BalanceCheck`].
#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// Balance shown.
    MainMenu(AccountSession),
    /// Lookup failed, card returned.
    AwaitingCustomer,
    /// Lookup failed and the card could not be returned.
    MaintenanceRequired,
}

impl From<Next> for SessionState {
    fn from(next: Next) -> Self {
        match next {
            Next::MainMenu(session) => SessionState::MainMenu(session),
            Next::AwaitingCustomer => SessionState::AwaitingCustomer,
            Next::MaintenanceRequired => SessionState::MaintenanceRequired,
        }
    }
}

/// Fetch and show the balance.
pub async fn process(p: &Peripherals, session: AccountSession) -> Next {
    let balance = match p
        .bank
        .retrieve_account_balance(session.account_number(), session.token())
        .await
    {
        Ok(balance) => balance,
        Err(err) => {
            let prompt = match &err {
                BankError::Network(_) => {
                    warn!(session = %session.session_id(), error = %err, "Bank unreachable for balance");
                    ErrorPrompt::NetworkFailure
                }
                _ => {
                    error!(session = %session.session_id(), error = %err, "Balance lookup failed");
                    ErrorPrompt::UnknownError
                }
            };
            return match end_session_with_error(p, prompt).await {
                Teardown::CardReturned => Next::AwaitingCustomer,
                Teardown::CardStuck => {
                    metrics::record_maintenance("card_stuck");
                    Next::MaintenanceRequired
                }
            };
        }
    };

    debug!(session = %session.session_id(), "Showing balance");
    let payload = ViewPayload::Balance {
        account: session.account_number().clone(),
        balance,
    };
    if let Err(err) = p.display.show_view(View::BalanceCheck, payload).await {
        warn!(session = %session.session_id(), error = %err, "Balance view failed");
    }
    Next::MainMenu(session)
}
