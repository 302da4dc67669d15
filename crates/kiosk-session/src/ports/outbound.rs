//! # Outbound Ports
//!
//! Traits for the kiosk's collaborators: card reader, cash dispenser, touch
//! display, bank backend and clock.
//!
//! ## Suspension
//!
//! Every call may suspend for a real-world duration. Calls marked
//! **unbounded** wait on a human or a mechanism and are never given a
//! deadline by the controller; timeout policy for those belongs to the device
//! layer. Read-only bank calls may be given a deadline by
//! [`BankGateway`](crate::adapters::BankGateway); calls that move money never
//! are.

use crate::domain::{
    AccountNumber, AccountProfile, BankError, CardData, DeviceError, ErrorPrompt, Money,
    OperationRequest, Pan, Pin, Prompt, PromptHandle, PublicAccount, SessionToken, View,
    ViewPayload, ViewResponse,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Card reader - outbound port.
#[async_trait]
pub trait CardReader: Send + Sync {
    /// Read an inserted card. **Unbounded**: idles until a card arrives.
    ///
    /// `Ok(None)` means a card is present but unreadable.
    async fn read_card(&self) -> Result<Option<CardData>, DeviceError>;

    /// Mechanically release the card.
    async fn release_card(&self) -> Result<(), DeviceError>;

    /// Resolve once the card has been physically removed. **Unbounded.**
    ///
    /// Safe to call after [`release_card`](Self::release_card) has been
    /// initiated; release and removal are separate mechanical phases.
    async fn await_card_removal(&self) -> Result<(), DeviceError>;
}

/// Cash dispenser and acceptor - outbound port.
#[async_trait]
pub trait CashDispenser: Send + Sync {
    /// Whether `amount` can be paid out mechanically.
    async fn funds_available(&self, amount: Money) -> Result<bool, DeviceError>;

    /// Open the acceptor for a deposit.
    async fn allow_deposit(&self) -> Result<(), DeviceError>;

    /// Resolve when cash is detected (`true`) or the deposit was cancelled
    /// before anything was inserted (`false`). **Unbounded.**
    ///
    /// May be outstanding at the same time as the insert-cash view; both
    /// must settle regardless of which settles first.
    async fn await_cash_insertion(&self) -> Result<bool, DeviceError>;

    /// Cancel an open deposit. Returns whether cash had been inserted and is
    /// being handed back.
    async fn cancel_deposit(&self) -> Result<bool, DeviceError>;

    /// Move accepted cash into secure storage.
    async fn accept_deposit(&self) -> Result<(), DeviceError>;

    /// Tally the inserted cash.
    async fn count_deposit(&self) -> Result<Money, DeviceError>;

    /// Resolve once the customer has taken the cash. **Unbounded.**
    async fn await_dispenser_emptied(&self) -> Result<(), DeviceError>;

    /// Pay out `amount`.
    async fn dispense(&self, amount: Money) -> Result<(), DeviceError>;
}

/// Touch display - outbound port.
///
/// ## Contract
///
/// The insert-cash view never resolves with
/// [`ViewResponse::DepositResolvedNormally`] before the cash-insertion signal
/// has been relayed to the display. A display settlement ahead of the sensor
/// is therefore always a cancellation. The controller relies on this and
/// cannot check it.
#[async_trait]
pub trait TouchDisplay: Send + Sync {
    /// Wait for the customer's next menu choice. **Unbounded**: the idle
    /// point of an authenticated session.
    async fn await_user_operation(&self) -> Result<OperationRequest, DeviceError>;

    /// Ask for the PIN. `Ok(None)` means the customer cancelled. **Unbounded.**
    async fn request_pin_entry(&self) -> Result<Option<Pin>, DeviceError>;

    /// Show an error prompt.
    async fn show_error_prompt(&self, prompt: ErrorPrompt) -> Result<(), DeviceError>;

    /// Show a prompt that stays up until the returned handle is closed.
    async fn show_prompt(&self, prompt: Prompt) -> Result<PromptHandle, DeviceError>;

    /// Show a view and wait for its response. **Unbounded** for views that
    /// ask the customer something.
    async fn show_view(
        &self,
        view: View,
        payload: ViewPayload,
    ) -> Result<ViewResponse, DeviceError>;
}

/// Bank backend - outbound port.
///
/// All calls made on behalf of a session carry its token.
#[async_trait]
pub trait BankApi: Send + Sync {
    /// Authenticate a card and PIN. `Ok(None)` means no matching account.
    async fn retrieve_account_data(
        &self,
        pan: &Pan,
        pin: &Pin,
    ) -> Result<Option<AccountProfile>, BankError>;

    /// Current balance.
    async fn retrieve_account_balance(
        &self,
        account: &AccountNumber,
        token: &SessionToken,
    ) -> Result<Money, BankError>;

    /// Public data of another account. `Ok(None)` if it does not exist.
    async fn retrieve_public_account_data(
        &self,
        target: &AccountNumber,
        token: &SessionToken,
    ) -> Result<Option<PublicAccount>, BankError>;

    /// Move `amount` from `source` to `target`.
    async fn execute_transfer(
        &self,
        source: &AccountNumber,
        target: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<(), BankError>;

    /// Debit `amount` ahead of a dispense.
    async fn process_withdrawal(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<(), BankError>;

    /// Credit a deposit. Returns the new balance.
    async fn process_deposit(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<Money, BankError>;

    /// Credit `amount` with an audit notation.
    async fn credit_account(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
        notation: &str,
    ) -> Result<(), BankError>;
}

/// Wall clock used for card expiry.
pub trait TimeSource: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// [`TimeSource`] backed by the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
