//! # Display Vocabulary
//!
//! Closed set of codes exchanged with the touch display. The controller
//! never sends free text; rendering is the display's concern.

use super::account::AccountNumber;
use super::errors::DeviceError;
use super::money::Money;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error prompts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorPrompt {
    /// Account state moved under a mutating call.
    AccountChanged,
    /// Card reader or dispenser fault.
    AtmHardwareError,
    /// Card past its expiration instant.
    CardExpired,
    /// Card read produced no data.
    CardUnreadable,
    /// Amount above the remaining period limit.
    ExceedsAccountLimit,
    /// Dispenser cannot pay out the amount.
    ExceedsAtmAvailableFunds,
    /// Balance does not cover the amount.
    InsufficientFunds,
    /// Zero or negative amount.
    InvalidAmount,
    /// Display answered with the wrong response shape.
    InvalidDisplayPayload,
    /// Bank found no account for the card and PIN.
    InvalidPin,
    /// Machine is out of service.
    MaintenanceRequired,
    /// Bank unreachable.
    NetworkFailure,
    /// Transfer target did not resolve.
    TargetAccountNotFound,
    /// Anything else.
    UnknownError,
}

/// Prompts that stay up until closed through their [`PromptHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prompt {
    /// Take the card from the reader.
    RetrieveCard,
    /// Take the cash from the dispenser tray.
    RetrieveDispensedFunds,
}

/// Full-screen views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    /// Waiting for cash in the acceptor.
    InsertCashToDeposit,
    /// Confirm the counted amount.
    DepositConfirmation,
    /// Deposit credited.
    DepositSummary,
    /// Current balance.
    BalanceCheck,
    /// Confirm the transfer target and amount.
    TransferConfirmation,
    /// Transfer executed.
    TransferSuccess,
    /// Operation abandoned.
    ActionCancelled,
}

/// Data rendered by a view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewPayload {
    /// Nothing beyond the view itself.
    DisplayOnly,
    /// Current account balance.
    Balance {
        /// Account shown
        account: AccountNumber,
        /// Balance in minor units
        balance: Money,
    },
    /// Transfer about to be executed.
    TransferConfirmation {
        /// Account to debit
        source_account: AccountNumber,
        /// Amount to move
        amount: Money,
        /// Account to credit
        target_account: AccountNumber,
        /// Public nickname of the target
        target_nickname: String,
    },
    /// Cash counted by the acceptor.
    DepositConfirmation {
        /// Account to credit
        target_account: AccountNumber,
        /// Counted amount
        amount: Money,
    },
    /// Deposit credited by the bank.
    DepositSummary {
        /// Credited account
        account: AccountNumber,
        /// Balance before the deposit
        previous_balance: Money,
        /// Balance reported by the bank after it
        new_balance: Money,
        /// Deposited amount
        amount: Money,
    },
}

/// What a view reports back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewResponse {
    /// Answer to the transfer confirmation view.
    TransferConfirmation {
        /// Customer accepted
        confirmed: bool,
    },
    /// Customer cancelled the insert-cash view.
    DepositCancelledFromDisplay,
    /// Insert-cash view completed after cash was detected.
    DepositResolvedNormally,
    /// Answer to the deposit confirmation view.
    DepositConfirmation {
        /// Customer accepted
        confirmed: bool,
    },
    /// Informational view dismissed.
    Acknowledged,
}

/// Operation chosen from the main menu.
///
/// Amounts are signed because the display is not trusted. The state that
/// handles the request validates them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationRequest {
    /// Show the balance.
    BalanceCheck,
    /// Deposit cash.
    Deposit,
    /// Withdraw cash.
    Withdrawal {
        /// Requested minor units
        amount: i128,
    },
    /// Move money to another account.
    Transfer {
        /// Requested minor units
        amount: i128,
        /// Account to credit
        target_account: AccountNumber,
    },
    /// End the session.
    Exit,
}

type CloseFn = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), DeviceError>> + Send>;

/// Closer returned by the display for an open prompt.
///
/// Consuming [`PromptHandle::close`] clears the prompt and resolves once the
/// display has cleared it.
pub struct PromptHandle {
    close: CloseFn,
}

impl PromptHandle {
    /// Wrap the display's close operation.
    pub fn new<F>(close: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), DeviceError>> + Send + 'static,
    {
        Self {
            close: Box::new(close),
        }
    }

    /// A handle whose close does nothing.
    pub fn noop() -> Self {
        Self::new(|| Box::pin(async { Ok(()) }))
    }

    /// Clear the prompt.
    pub async fn close(self) -> Result<(), DeviceError> {
        (self.close)().await
    }
}

impl fmt::Debug for PromptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PromptHandle")
    }
}
