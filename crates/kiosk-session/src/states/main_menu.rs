//! # MainMenu
//!
//! Waits for the customer's next operation and dispatches it. No payload is
//! validated here; every target state validates its own input.

use super::{announce, end_session_with_error, Peripherals, SessionState, Teardown};
use crate::domain::{
    AccountNumber, AccountSession, DeviceError, ErrorPrompt, OperationRequest, Prompt,
    PromptHandle,
};
use crate::metrics;
use tracing::{debug, error, warn};

/// Legal successors of [`SessionState::MainMenu`].
#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// Session over, card returned.
    AwaitingCustomer,
    /// Show the balance.
    BalanceCheck(AccountSession),
    /// Take a deposit.
    Deposit(AccountSession),
    /// Pay out cash.
    Withdraw {
        /// Authenticated account
        session: AccountSession,
        /// Requested minor units
        amount: i128,
    },
    /// Move money.
    Transfer {
        /// Authenticated account
        session: AccountSession,
        /// Requested minor units
        amount: i128,
        /// Account to credit
        target_account: AccountNumber,
    },
    /// Card could not be returned.
    MaintenanceRequired,
}

impl From<Next> for SessionState {
    fn from(next: Next) -> Self {
        match next {
            Next::AwaitingCustomer => SessionState::AwaitingCustomer,
            Next::BalanceCheck(session) => SessionState::BalanceCheck(session),
            Next::Deposit(session) => SessionState::Deposit(session),
            Next::Withdraw { session, amount } => SessionState::Withdraw { session, amount },
            Next::Transfer {
                session,
                amount,
                target_account,
            } => SessionState::Transfer {
                session,
                amount,
                target_account,
            },
            Next::MaintenanceRequired => SessionState::MaintenanceRequired,
        }
    }
}

fn after_teardown(teardown: Teardown) -> Next {
    match teardown {
        Teardown::CardReturned => Next::AwaitingCustomer,
        Teardown::CardStuck => {
            metrics::record_maintenance("card_stuck");
            Next::MaintenanceRequired
        }
    }
}

/// Wait for one operation and dispatch it.
pub async fn process(p: &Peripherals, session: AccountSession) -> Next {
    let request = match p.display.await_user_operation().await {
        Ok(request) => request,
        Err(err) => {
            error!(session = %session.session_id(), error = %err, "Display failed to deliver an operation");
            return after_teardown(end_session_with_error(p, ErrorPrompt::UnknownError).await);
        }
    };
    debug!(session = %session.session_id(), ?request, "Operation selected");

    match request {
        OperationRequest::Exit => after_teardown(exit(p).await),
        OperationRequest::BalanceCheck => Next::BalanceCheck(session),
        OperationRequest::Deposit => Next::Deposit(session),
        OperationRequest::Withdrawal { amount } => Next::Withdraw { session, amount },
        OperationRequest::Transfer {
            amount,
            target_account,
        } => Next::Transfer {
            session,
            amount,
            target_account,
        },
    }
}

async fn exit(p: &Peripherals) -> Teardown {
    let (prompt, released) = tokio::join!(
        p.display.show_prompt(Prompt::RetrieveCard),
        p.card_reader.release_card()
    );
    if let Err(err) = released {
        error!(error = %err, "Card release failed on exit");
        close_retrieve_card(prompt).await;
        announce(p.display.as_ref(), ErrorPrompt::AtmHardwareError).await;
        return Teardown::CardStuck;
    }

    let removed = p.card_reader.await_card_removal().await;
    close_retrieve_card(prompt).await;
    if let Err(err) = removed {
        error!(error = %err, "Card removal not detected on exit");
        return Teardown::CardStuck;
    }
    Teardown::CardReturned
}

async fn close_retrieve_card(prompt: Result<PromptHandle, DeviceError>) {
    match prompt {
        Ok(handle) => {
            if let Err(err) = handle.close().await {
                warn!(error = %err, "Failed to close retrieve-card prompt");
            }
        }
        Err(err) => warn!(error = %err, "Failed to show retrieve-card prompt"),
    }
}
