//! # Session States
//!
//! One module per state. Each state's `process` returns its own `Next` enum
//! naming the only successors it may produce; the driver converts `Next` into
//! [`SessionState`].
//!
//! ```text
//!                ┌───────────────────── exit / card returned ─────────────────┐
//!                v                                                            │
//! AwaitingCustomer ──auth──> MainMenu ──> BalanceCheck | Deposit | Withdraw | Transfer
//!        │                      ^                         │          │          │
//!        │                      └─────────────────────────┴──────────┴──────────┘
//!        └────────── hardware fault ──────> MaintenanceRequired <── mechanical fault
//! ```
//!
//! No fault escapes a state: every collaborator error becomes a prompt plus
//! a transition.

pub mod awaiting_customer;
pub mod balance_check;
pub mod deposit;
pub mod main_menu;
pub mod maintenance;
pub mod transfer;
pub mod withdraw;

use crate::adapters::BankGateway;
use crate::domain::{
    AccountNumber, AccountSession, BankError, ErrorPrompt, Fault, FaultClass, Money,
};
use crate::ports::{CardReader, CashDispenser, TimeSource, TouchDisplay};
use std::sync::Arc;
use tracing::{error, warn};

/// Current position of the session state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Idle, waiting for a card.
    AwaitingCustomer,
    /// Authenticated, waiting for an operation.
    MainMenu(AccountSession),
    /// Showing the balance.
    BalanceCheck(AccountSession),
    /// Accepting a cash deposit.
    Deposit(AccountSession),
    /// Paying out cash.
    Withdraw {
        /// Authenticated account
        session: AccountSession,
        /// Requested minor units, unvalidated
        amount: i128,
    },
    /// Moving money to another account.
    Transfer {
        /// Authenticated account
        session: AccountSession,
        /// Requested minor units, unvalidated
        amount: i128,
        /// Account to credit
        target_account: AccountNumber,
    },
    /// Out of service until manual intervention.
    MaintenanceRequired,
}

impl SessionState {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::AwaitingCustomer => "awaiting_customer",
            SessionState::MainMenu(_) => "main_menu",
            SessionState::BalanceCheck(_) => "balance_check",
            SessionState::Deposit(_) => "deposit",
            SessionState::Withdraw { .. } => "withdraw",
            SessionState::Transfer { .. } => "transfer",
            SessionState::MaintenanceRequired => "maintenance_required",
        }
    }

    /// Account context carried by the state, if any.
    pub fn session(&self) -> Option<&AccountSession> {
        match self {
            SessionState::MainMenu(session)
            | SessionState::BalanceCheck(session)
            | SessionState::Deposit(session)
            | SessionState::Withdraw { session, .. }
            | SessionState::Transfer { session, .. } => Some(session),
            SessionState::AwaitingCustomer | SessionState::MaintenanceRequired => None,
        }
    }
}

/// Collaborators shared by every state. Injected once into the driver.
#[derive(Clone)]
pub struct Peripherals {
    /// Card reader.
    pub card_reader: Arc<dyn CardReader>,
    /// Cash dispenser and acceptor.
    pub dispenser: Arc<dyn CashDispenser>,
    /// Touch display.
    pub display: Arc<dyn TouchDisplay>,
    /// Bank backend behind an optional deadline.
    pub bank: BankGateway,
    /// Clock for the card expiry check.
    pub clock: Arc<dyn TimeSource>,
}

impl Peripherals {
    /// Bundle the collaborators. The bank starts without a deadline.
    pub fn new(
        card_reader: Arc<dyn CardReader>,
        dispenser: Arc<dyn CashDispenser>,
        display: Arc<dyn TouchDisplay>,
        bank: Arc<dyn crate::ports::BankApi>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            card_reader,
            dispenser,
            display,
            bank: BankGateway::new(bank),
            clock,
        }
    }
}

// =============================================================================
// Shared steps
// =============================================================================

/// Outcome of handing the card back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Teardown {
    /// Card released and taken.
    CardReturned,
    /// Release or removal failed; the reader needs a technician.
    CardStuck,
}

/// Show an error prompt. A display failure is logged and otherwise ignored.
pub(crate) async fn announce(display: &dyn TouchDisplay, prompt: ErrorPrompt) {
    if let Err(err) = display.show_error_prompt(prompt).await {
        warn!(?prompt, error = %err, "Failed to show error prompt");
    }
}

/// Show `prompt` while releasing the card, then wait for removal.
pub(crate) async fn end_session_with_error(p: &Peripherals, prompt: ErrorPrompt) -> Teardown {
    let (_, released) = tokio::join!(
        announce(p.display.as_ref(), prompt),
        p.card_reader.release_card()
    );
    if let Err(err) = released {
        error!(error = %err, "Card release failed");
        return Teardown::CardStuck;
    }
    await_removal(p).await
}

/// Release the card without a prompt, then wait for removal.
pub(crate) async fn return_card(p: &Peripherals) -> Teardown {
    if let Err(err) = p.card_reader.release_card().await {
        error!(error = %err, "Card release failed");
        return Teardown::CardStuck;
    }
    await_removal(p).await
}

async fn await_removal(p: &Peripherals) -> Teardown {
    match p.card_reader.await_card_removal().await {
        Ok(()) => Teardown::CardReturned,
        Err(err) => {
            error!(error = %err, "Card removal not detected");
            Teardown::CardStuck
        }
    }
}

/// First two steps of the withdraw/transfer gate: positive, within limit.
pub(crate) fn check_requested_amount(
    session: &AccountSession,
    requested: i128,
) -> Result<Money, ErrorPrompt> {
    let amount = Money::from_requested(requested).map_err(|_| ErrorPrompt::InvalidAmount)?;
    if amount > session.limit_remaining() {
        return Err(ErrorPrompt::ExceedsAccountLimit);
    }
    Ok(amount)
}

/// A balance covers an amount only if it stays above zero afterwards.
pub(crate) fn balance_covers(balance: Money, amount: Money) -> bool {
    balance > amount
}

/// Prompt matching a bank fault.
pub(crate) fn bank_prompt(err: &BankError) -> ErrorPrompt {
    match err.class() {
        FaultClass::Network => ErrorPrompt::NetworkFailure,
        FaultClass::TransactionConflict => ErrorPrompt::AccountChanged,
        FaultClass::Hardware | FaultClass::Unclassified => ErrorPrompt::UnknownError,
    }
}

/// Context for the next menu after `amount` left the account.
///
/// Falls back to the unchanged context if the reduction cannot be applied;
/// the gate has already checked `amount <= limit_remaining`.
pub(crate) fn after_spend(session: AccountSession, amount: Money) -> AccountSession {
    match session.with_limit_consumed(amount) {
        Ok(reduced) => reduced,
        Err(err) => {
            warn!(session = %session.session_id(), error = %err, "Remaining limit not reduced");
            session
        }
    }
}
