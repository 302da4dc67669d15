//! # Transfer
//!
//! Validation gate, target lookup, confirmation, execution. Every outcome
//! returns to the main menu.

use super::{
    after_spend, announce, balance_covers, bank_prompt, check_requested_amount, Peripherals,
    SessionState,
};
use crate::domain::{
    AccountNumber, AccountSession, BankError, ErrorPrompt, View, ViewPayload, ViewResponse,
};
use tracing::{debug, error, info, warn};

/// Legal successors of [`SessionState::Transfer`].
#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// Transfer done, declined or rejected.
    MainMenu(AccountSession),
}

impl From<Next> for SessionState {
    fn from(next: Next) -> Self {
        match next {
            Next::MainMenu(session) => SessionState::MainMenu(session),
        }
    }
}

async fn reject(p: &Peripherals, session: AccountSession, prompt: ErrorPrompt) -> Next {
    announce(p.display.as_ref(), prompt).await;
    Next::MainMenu(session)
}

/// Validate, confirm and execute a transfer of `requested` minor units.
pub async fn process(
    p: &Peripherals,
    session: AccountSession,
    requested: i128,
    target_account: AccountNumber,
) -> Next {
    let id = session.session_id();

    let amount = match check_requested_amount(&session, requested) {
        Ok(amount) => amount,
        Err(prompt) => {
            debug!(session = %id, requested, ?prompt, "Transfer rejected by gate");
            return reject(p, session, prompt).await;
        }
    };

    let balance = match p
        .bank
        .retrieve_account_balance(session.account_number(), session.token())
        .await
    {
        Ok(balance) => balance,
        Err(err) => {
            warn!(session = %id, error = %err, "Balance lookup failed");
            return reject(p, session, bank_prompt(&err)).await;
        }
    };
    if !balance_covers(balance, amount) {
        debug!(session = %id, %amount, "Transfer exceeds balance");
        return reject(p, session, ErrorPrompt::InsufficientFunds).await;
    }

    let target = match p
        .bank
        .retrieve_public_account_data(&target_account, session.token())
        .await
    {
        Ok(Some(target)) => target,
        Ok(None) => {
            debug!(session = %id, target = %target_account, "Transfer target not found");
            return reject(p, session, ErrorPrompt::TargetAccountNotFound).await;
        }
        Err(err) => {
            warn!(session = %id, error = %err, "Target lookup failed");
            return reject(p, session, bank_prompt(&err)).await;
        }
    };

    let confirmation = p
        .display
        .show_view(
            View::TransferConfirmation,
            ViewPayload::TransferConfirmation {
                source_account: session.account_number().clone(),
                amount,
                target_account: target_account.clone(),
                target_nickname: target.account_nickname,
            },
        )
        .await;
    let confirmed = match confirmation {
        Ok(ViewResponse::TransferConfirmation { confirmed }) => confirmed,
        Ok(other) => {
            error!(session = %id, response = ?other, "Unexpected transfer confirmation response");
            return reject(p, session, ErrorPrompt::InvalidDisplayPayload).await;
        }
        Err(err) => {
            error!(session = %id, error = %err, "Transfer confirmation failed");
            return reject(p, session, ErrorPrompt::InvalidDisplayPayload).await;
        }
    };

    if !confirmed {
        debug!(session = %id, "Transfer declined");
        if let Err(err) = p
            .display
            .show_view(View::ActionCancelled, ViewPayload::DisplayOnly)
            .await
        {
            warn!(session = %id, error = %err, "Cancelled view failed");
        }
        return Next::MainMenu(session);
    }

    match p
        .bank
        .execute_transfer(
            session.account_number(),
            &target_account,
            amount,
            session.token(),
        )
        .await
    {
        Ok(()) => {}
        Err(err @ (BankError::Network(_) | BankError::TransactionConflict(_))) => {
            warn!(session = %id, error = %err, "Transfer not executed");
            return reject(p, session, bank_prompt(&err)).await;
        }
        Err(err) => {
            error!(session = %id, error = %err, %amount, "Transfer failed unexpectedly");
            return reject(p, session, ErrorPrompt::UnknownError).await;
        }
    }
    info!(session = %id, %amount, target = %target_account, "Transfer executed");

    if let Err(err) = p
        .display
        .show_view(View::TransferSuccess, ViewPayload::DisplayOnly)
        .await
    {
        warn!(session = %id, error = %err, "Transfer success view failed");
    }
    Next::MainMenu(after_spend(session, amount))
}
