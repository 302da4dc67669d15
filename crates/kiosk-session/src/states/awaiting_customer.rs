//! # AwaitingCustomer
//!
//! Card read, expiry check, PIN entry and authentication.
//!
//! Every attempt starts from nothing: card data, PIN and account data of a
//! failed attempt are dropped before the next one begins.

use super::{end_session_with_error, return_card, Peripherals, SessionState, Teardown};
use crate::domain::{AccountSession, BankError, ErrorPrompt, Fault, FaultClass};
use crate::metrics;
use tracing::{debug, error, info, warn};

/// Legal successors of [`SessionState::AwaitingCustomer`].
#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// Start over with a fresh attempt.
    AwaitingCustomer,
    /// Authenticated.
    MainMenu(AccountSession),
    /// Card reader unusable.
    MaintenanceRequired,
}

impl From<Next> for SessionState {
    fn from(next: Next) -> Self {
        match next {
            Next::AwaitingCustomer => SessionState::AwaitingCustomer,
            Next::MainMenu(session) => SessionState::MainMenu(session),
            Next::MaintenanceRequired => SessionState::MaintenanceRequired,
        }
    }
}

impl From<Teardown> for Next {
    fn from(teardown: Teardown) -> Self {
        match teardown {
            Teardown::CardReturned => Next::AwaitingCustomer,
            Teardown::CardStuck => {
                metrics::record_maintenance("card_stuck");
                Next::MaintenanceRequired
            }
        }
    }
}

/// Run one authentication attempt.
pub async fn process(p: &Peripherals) -> Next {
    let card = match p.card_reader.read_card().await {
        Ok(card) => card,
        Err(err) if err.class() == FaultClass::Hardware => {
            error!(error = %err, "Hardware fault reading card");
            super::announce(p.display.as_ref(), ErrorPrompt::AtmHardwareError).await;
            metrics::record_maintenance("card_read_fault");
            return Next::MaintenanceRequired;
        }
        Err(err) => {
            error!(error = %err, "Unexpected fault reading card");
            super::announce(p.display.as_ref(), ErrorPrompt::UnknownError).await;
            return match p.card_reader.release_card().await {
                Ok(()) => Next::AwaitingCustomer,
                Err(err) => {
                    error!(error = %err, "Card release failed after read fault");
                    metrics::record_maintenance("card_stuck");
                    Next::MaintenanceRequired
                }
            };
        }
    };

    let Some(card) = card else {
        debug!("Card unreadable, releasing");
        return end_session_with_error(p, ErrorPrompt::CardUnreadable)
            .await
            .into();
    };

    if card.is_expired(p.clock.now()) {
        debug!(pan = ?card.pan, "Card expired, releasing");
        return end_session_with_error(p, ErrorPrompt::CardExpired)
            .await
            .into();
    }

    let pin = match p.display.request_pin_entry().await {
        Ok(Some(pin)) => pin,
        Ok(None) => {
            debug!("PIN entry cancelled, releasing card");
            return return_card(p).await.into();
        }
        Err(err) => {
            warn!(error = %err, "PIN entry failed");
            return end_session_with_error(p, ErrorPrompt::UnknownError)
                .await
                .into();
        }
    };

    let profile = match p.bank.retrieve_account_data(&card.pan, &pin).await {
        Ok(profile) => profile,
        Err(BankError::Network(reason)) => {
            warn!(%reason, "Bank unreachable during authentication");
            return end_session_with_error(p, ErrorPrompt::NetworkFailure)
                .await
                .into();
        }
        Err(err) => {
            error!(error = %err, "Authentication failed unexpectedly");
            return end_session_with_error(p, ErrorPrompt::UnknownError)
                .await
                .into();
        }
    };
    drop(pin);

    let Some(profile) = profile else {
        debug!(pan = ?card.pan, "No account for card and PIN");
        return end_session_with_error(p, ErrorPrompt::InvalidPin)
            .await
            .into();
    };

    match AccountSession::try_from(profile) {
        Ok(session) => {
            info!(session = %session.session_id(), "Customer authenticated");
            metrics::record_authenticated();
            Next::MainMenu(session)
        }
        Err(err) => {
            error!(error = %err, "Bank returned an invalid account profile");
            end_session_with_error(p, ErrorPrompt::UnknownError)
                .await
                .into()
        }
    }
}
