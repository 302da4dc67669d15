//! # Withdraw
//!
//! Validation gate, debit, dispense.
//!
//! | Step | Failure | Outcome |
//! |------|---------|---------|
//! | amount > 0 | InvalidAmount | MainMenu |
//! | amount <= limit remaining | ExceedsAccountLimit | MainMenu |
//! | balance > amount | InsufficientFunds | MainMenu |
//! | dispenser has funds | ExceedsAtmAvailableFunds | MainMenu |
//! | debit | AccountChanged / NetworkFailure / UnknownError | MainMenu |
//! | dispense | AtmHardwareError + one compensating credit | MaintenanceRequired |
//! | cash taken | MaintenanceRequired | MaintenanceRequired |
//!
//! Nothing after the gate is retried.

use super::{
    after_spend, announce, balance_covers, bank_prompt, check_requested_amount, Peripherals,
    SessionState,
};
use crate::domain::{AccountSession, ErrorPrompt, Money, Prompt};
use crate::metrics;
use tracing::{debug, error, info, warn};

/// Audit notation attached to the credit issued after a dispense fault.
pub const DISPENSE_FAULT_CREDIT_NOTATION: &str = "Withdrawal credit: mechanical dispense failure";

/// Legal successors of [`SessionState::Withdraw`].
#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// Cash taken, or nothing moved.
    MainMenu(AccountSession),
    /// Dispenser state unknown.
    MaintenanceRequired,
}

impl From<Next> for SessionState {
    fn from(next: Next) -> Self {
        match next {
            Next::MainMenu(session) => SessionState::MainMenu(session),
            Next::MaintenanceRequired => SessionState::MaintenanceRequired,
        }
    }
}

async fn reject(p: &Peripherals, session: AccountSession, prompt: ErrorPrompt) -> Next {
    announce(p.display.as_ref(), prompt).await;
    Next::MainMenu(session)
}

/// Validate, debit and pay out `requested` minor units.
pub async fn process(p: &Peripherals, session: AccountSession, requested: i128) -> Next {
    let id = session.session_id();

    let amount = match check_requested_amount(&session, requested) {
        Ok(amount) => amount,
        Err(prompt) => {
            debug!(session = %id, requested, ?prompt, "Withdrawal rejected by gate");
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
        debug!(session = %id, %amount, "Withdrawal exceeds balance");
        return reject(p, session, ErrorPrompt::InsufficientFunds).await;
    }

    match p.dispenser.funds_available(amount).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(session = %id, %amount, "Dispenser cannot pay out amount");
            return reject(p, session, ErrorPrompt::ExceedsAtmAvailableFunds).await;
        }
        Err(err) => {
            error!(session = %id, error = %err, "Dispenser funds check failed");
            announce(p.display.as_ref(), ErrorPrompt::AtmHardwareError).await;
            metrics::record_maintenance("funds_check_fault");
            return Next::MaintenanceRequired;
        }
    }

    if let Err(err) = p
        .bank
        .process_withdrawal(session.account_number(), amount, session.token())
        .await
    {
        warn!(session = %id, error = %err, "Debit failed, nothing dispensed");
        return reject(p, session, bank_prompt(&err)).await;
    }

    if let Err(err) = p.dispenser.dispense(amount).await {
        error!(session = %id, error = %err, %amount, "Dispense failed after debit");
        announce(p.display.as_ref(), ErrorPrompt::AtmHardwareError).await;
        compensate(p, &session, amount).await;
        metrics::record_maintenance("dispense_fault");
        return Next::MaintenanceRequired;
    }
    info!(session = %id, %amount, "Cash dispensed");
    metrics::record_withdrawal_dispensed();

    let (prompt, emptied) = tokio::join!(
        p.display.show_prompt(Prompt::RetrieveDispensedFunds),
        p.dispenser.await_dispenser_emptied()
    );
    match prompt {
        Ok(handle) => {
            if let Err(err) = handle.close().await {
                warn!(session = %id, error = %err, "Failed to close retrieve-cash prompt");
            }
        }
        Err(err) => warn!(session = %id, error = %err, "Failed to show retrieve-cash prompt"),
    }
    if let Err(err) = emptied {
        error!(session = %id, error = %err, "Dispenser fault awaiting cash removal");
        announce(p.display.as_ref(), ErrorPrompt::MaintenanceRequired).await;
        metrics::record_maintenance("dispenser_not_emptied");
        return Next::MaintenanceRequired;
    }

    Next::MainMenu(after_spend(session, amount))
}

/// Credit back a debit whose cash never left the machine. Issued exactly once.
async fn compensate(p: &Peripherals, session: &AccountSession, amount: Money) {
    let result = p
        .bank
        .credit_account(
            session.account_number(),
            amount,
            session.token(),
            DISPENSE_FAULT_CREDIT_NOTATION,
        )
        .await;
    metrics::record_compensating_credit(result.is_ok());
    match result {
        Ok(()) => info!(session = %session.session_id(), %amount, "Compensating credit issued"),
        Err(err) => error!(
            session = %session.session_id(),
            account = %session.account_number(),
            %amount,
            error = %err,
            "Compensating credit failed; reconcile manually"
        ),
    }
}
