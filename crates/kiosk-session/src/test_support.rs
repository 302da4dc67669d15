//! Recording mocks for state tests.
//!
//! Every mock appends the name of each call to one shared log so tests can
//! assert on call order across devices. Results are scripted through
//! `parking_lot` mutexes; the deposit race is ordered with oneshot channels.

use crate::adapters::BankGateway;
use crate::domain::{
    AccountNumber, AccountProfile, AccountSession, BankError, CardData, DeviceError, ErrorPrompt,
    Money, OperationRequest, Pan, Pin, Prompt, PromptHandle, PublicAccount, SessionToken, View,
    ViewPayload, ViewResponse,
};
use crate::ports::{BankApi, CardReader, CashDispenser, TimeSource, TouchDisplay};
use crate::states::Peripherals;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::oneshot;

pub(crate) const TEST_PAN: &str = "1111222233334444";
pub(crate) const TEST_PIN: &str = "1234";
pub(crate) const TEST_ACCOUNT: &str = "test-acc-number";
pub(crate) const TEST_LIMIT: u64 = 100_000_000;

/// Shared, ordered record of calls across all mocks.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub(crate) fn push(&self, call: impl Into<String>) {
        self.0.lock().push(call.into());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.0.lock().iter().filter(|c| c.as_str() == call).count()
    }

    pub(crate) fn contains(&self, call: &str) -> bool {
        self.count(call) > 0
    }

    pub(crate) fn position(&self, call: &str) -> Option<usize> {
        self.0.lock().iter().position(|c| c.as_str() == call)
    }
}

fn hw(device: crate::domain::Device) -> DeviceError {
    DeviceError::hardware(device, "mock hardware fault")
}

pub(crate) fn reader_fault() -> DeviceError {
    hw(crate::domain::Device::CardReader)
}

pub(crate) fn dispenser_fault() -> DeviceError {
    hw(crate::domain::Device::Dispenser)
}

pub(crate) fn display_fault() -> DeviceError {
    DeviceError::unexpected(crate::domain::Device::Display, "mock display fault")
}

// =============================================================================
// Card reader
// =============================================================================

pub(crate) struct MockCardReader {
    log: CallLog,
    pub(crate) read: Mutex<Result<Option<CardData>, DeviceError>>,
    pub(crate) release: Mutex<Result<(), DeviceError>>,
    pub(crate) removal: Mutex<Result<(), DeviceError>>,
}

impl MockCardReader {
    fn new(log: CallLog, now: DateTime<Utc>) -> Self {
        Self {
            log,
            read: Mutex::new(Ok(Some(CardData::new(
                Pan::new(TEST_PAN),
                now + Duration::days(365),
            )))),
            release: Mutex::new(Ok(())),
            removal: Mutex::new(Ok(())),
        }
    }
}

#[async_trait]
impl CardReader for MockCardReader {
    async fn read_card(&self) -> Result<Option<CardData>, DeviceError> {
        self.log.push("read_card");
        self.read.lock().clone()
    }

    async fn release_card(&self) -> Result<(), DeviceError> {
        self.log.push("release_card");
        self.release.lock().clone()
    }

    async fn await_card_removal(&self) -> Result<(), DeviceError> {
        self.log.push("await_card_removal");
        self.removal.lock().clone()
    }
}

// =============================================================================
// Dispenser
// =============================================================================

pub(crate) struct MockDispenser {
    log: CallLog,
    pub(crate) funds_available: Mutex<Result<bool, DeviceError>>,
    pub(crate) allow_deposit: Mutex<Result<(), DeviceError>>,
    /// When set, the sensor settles only once the sender fires.
    pub(crate) insertion_gate: Mutex<Option<oneshot::Receiver<Result<bool, DeviceError>>>>,
    pub(crate) insertion: Mutex<Result<bool, DeviceError>>,
    /// Signal forwarded to the display once cash is detected.
    pub(crate) relay: Mutex<Option<(oneshot::Sender<ViewResponse>, ViewResponse)>>,
    pub(crate) cancel: Mutex<Result<bool, DeviceError>>,
    pub(crate) accept: Mutex<Result<(), DeviceError>>,
    pub(crate) count: Mutex<Result<Money, DeviceError>>,
    pub(crate) emptied: Mutex<Result<(), DeviceError>>,
    pub(crate) dispense: Mutex<Result<(), DeviceError>>,
}

impl MockDispenser {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            funds_available: Mutex::new(Ok(true)),
            allow_deposit: Mutex::new(Ok(())),
            insertion_gate: Mutex::new(None),
            insertion: Mutex::new(Ok(true)),
            relay: Mutex::new(None),
            cancel: Mutex::new(Ok(false)),
            accept: Mutex::new(Ok(())),
            count: Mutex::new(Ok(Money::from(2_000u64))),
            emptied: Mutex::new(Ok(())),
            dispense: Mutex::new(Ok(())),
        }
    }

    /// Hold the sensor until the returned sender fires.
    pub(crate) fn gate_insertion(&self) -> oneshot::Sender<Result<bool, DeviceError>> {
        let (tx, rx) = oneshot::channel();
        *self.insertion_gate.lock() = Some(rx);
        tx
    }
}

#[async_trait]
impl CashDispenser for MockDispenser {
    async fn funds_available(&self, _amount: Money) -> Result<bool, DeviceError> {
        self.log.push("funds_available");
        self.funds_available.lock().clone()
    }

    async fn allow_deposit(&self) -> Result<(), DeviceError> {
        self.log.push("allow_deposit");
        self.allow_deposit.lock().clone()
    }

    async fn await_cash_insertion(&self) -> Result<bool, DeviceError> {
        self.log.push("await_cash_insertion");
        let gate = self.insertion_gate.lock().take();
        if let Some(rx) = gate {
            return match rx.await {
                Ok(result) => result,
                Err(_) => std::future::pending().await,
            };
        }
        let result = self.insertion.lock().clone();
        let relay = self.relay.lock().take();
        if let Some((tx, response)) = relay {
            let _ = tx.send(response);
        }
        result
    }

    async fn cancel_deposit(&self) -> Result<bool, DeviceError> {
        self.log.push("cancel_deposit");
        self.cancel.lock().clone()
    }

    async fn accept_deposit(&self) -> Result<(), DeviceError> {
        self.log.push("accept_deposit");
        self.accept.lock().clone()
    }

    async fn count_deposit(&self) -> Result<Money, DeviceError> {
        self.log.push("count_deposit");
        self.count.lock().clone()
    }

    async fn await_dispenser_emptied(&self) -> Result<(), DeviceError> {
        self.log.push("await_dispenser_emptied");
        self.emptied.lock().clone()
    }

    async fn dispense(&self, _amount: Money) -> Result<(), DeviceError> {
        self.log.push("dispense");
        self.dispense.lock().clone()
    }
}

// =============================================================================
// Display
// =============================================================================

pub(crate) struct MockDisplay {
    log: CallLog,
    pub(crate) operations: Mutex<VecDeque<Result<OperationRequest, DeviceError>>>,
    pub(crate) pin: Mutex<Result<Option<Pin>, DeviceError>>,
    /// When set, the insert-cash view settles only once the sender fires.
    pub(crate) insert_cash_gate: Mutex<Option<oneshot::Receiver<ViewResponse>>>,
    pub(crate) insert_cash: Mutex<Result<ViewResponse, DeviceError>>,
    /// Responses for every other view, in order. Empty means acknowledged.
    pub(crate) view_responses: Mutex<VecDeque<Result<ViewResponse, DeviceError>>>,
    pub(crate) errors_shown: Mutex<Vec<ErrorPrompt>>,
    pub(crate) prompts_shown: Mutex<Vec<Prompt>>,
    pub(crate) views_shown: Mutex<Vec<(View, ViewPayload)>>,
}

impl MockDisplay {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            operations: Mutex::new(VecDeque::new()),
            pin: Mutex::new(Ok(Some(Pin::new(TEST_PIN)))),
            insert_cash_gate: Mutex::new(None),
            insert_cash: Mutex::new(Ok(ViewResponse::DepositResolvedNormally)),
            view_responses: Mutex::new(VecDeque::new()),
            errors_shown: Mutex::new(Vec::new()),
            prompts_shown: Mutex::new(Vec::new()),
            views_shown: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn queue_operation(&self, operation: OperationRequest) {
        self.operations.lock().push_back(Ok(operation));
    }

    pub(crate) fn queue_view_response(&self, response: ViewResponse) {
        self.view_responses.lock().push_back(Ok(response));
    }

    /// Hold the insert-cash view until the returned sender fires.
    pub(crate) fn gate_insert_cash(&self) -> oneshot::Sender<ViewResponse> {
        let (tx, rx) = oneshot::channel();
        *self.insert_cash_gate.lock() = Some(rx);
        tx
    }

    pub(crate) fn errors(&self) -> Vec<ErrorPrompt> {
        self.errors_shown.lock().clone()
    }

    pub(crate) fn views(&self) -> Vec<View> {
        self.views_shown.lock().iter().map(|(view, _)| *view).collect()
    }

    pub(crate) fn payload_of(&self, view: View) -> Option<ViewPayload> {
        self.views_shown
            .lock()
            .iter()
            .find(|(shown, _)| *shown == view)
            .map(|(_, payload)| payload.clone())
    }
}

#[async_trait]
impl TouchDisplay for MockDisplay {
    async fn await_user_operation(&self) -> Result<OperationRequest, DeviceError> {
        self.log.push("await_user_operation");
        let next = self.operations.lock().pop_front();
        match next {
            Some(operation) => operation,
            None => std::future::pending().await,
        }
    }

    async fn request_pin_entry(&self) -> Result<Option<Pin>, DeviceError> {
        self.log.push("request_pin_entry");
        self.pin.lock().clone()
    }

    async fn show_error_prompt(&self, prompt: ErrorPrompt) -> Result<(), DeviceError> {
        self.log.push(format!("error:{:?}", prompt));
        self.errors_shown.lock().push(prompt);
        Ok(())
    }

    async fn show_prompt(&self, prompt: Prompt) -> Result<PromptHandle, DeviceError> {
        self.log.push(format!("prompt:{:?}", prompt));
        self.prompts_shown.lock().push(prompt);
        let log = self.log.clone();
        Ok(PromptHandle::new(move || {
            Box::pin(async move {
                log.push(format!("close:{:?}", prompt));
                Ok(())
            })
        }))
    }

    async fn show_view(
        &self,
        view: View,
        payload: ViewPayload,
    ) -> Result<ViewResponse, DeviceError> {
        self.log.push(format!("view:{:?}", view));
        self.views_shown.lock().push((view, payload));
        if view == View::InsertCashToDeposit {
            let gate = self.insert_cash_gate.lock().take();
            if let Some(rx) = gate {
                return match rx.await {
                    Ok(response) => Ok(response),
                    Err(_) => std::future::pending().await,
                };
            }
            return self.insert_cash.lock().clone();
        }
        let next = self.view_responses.lock().pop_front();
        next.unwrap_or(Ok(ViewResponse::Acknowledged))
    }
}

// =============================================================================
// Bank
// =============================================================================

pub(crate) struct MockBank {
    log: CallLog,
    pub(crate) account_data: Mutex<Result<Option<AccountProfile>, BankError>>,
    pub(crate) balance: Mutex<Result<Money, BankError>>,
    pub(crate) public_account: Mutex<Result<Option<PublicAccount>, BankError>>,
    pub(crate) transfer: Mutex<Result<(), BankError>>,
    pub(crate) withdrawal: Mutex<Result<(), BankError>>,
    pub(crate) deposit: Mutex<Result<Money, BankError>>,
    pub(crate) credit: Mutex<Result<(), BankError>>,
    pub(crate) credits: Mutex<Vec<(Money, String)>>,
    /// Time a money movement takes to report back after it has applied.
    pub(crate) commit_latency: Mutex<std::time::Duration>,
}

impl MockBank {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            account_data: Mutex::new(Ok(Some(test_profile()))),
            balance: Mutex::new(Ok(Money::from(TEST_LIMIT))),
            public_account: Mutex::new(Ok(Some(PublicAccount {
                account_number: AccountNumber::new("target-acc-number"),
                account_nickname: "target-nickname".to_string(),
            }))),
            transfer: Mutex::new(Ok(())),
            withdrawal: Mutex::new(Ok(())),
            deposit: Mutex::new(Ok(Money::from(TEST_LIMIT + 2_000))),
            credit: Mutex::new(Ok(())),
            credits: Mutex::new(Vec::new()),
            commit_latency: Mutex::new(std::time::Duration::ZERO),
        }
    }
}

#[async_trait]
impl BankApi for MockBank {
    async fn retrieve_account_data(
        &self,
        _pan: &Pan,
        _pin: &Pin,
    ) -> Result<Option<AccountProfile>, BankError> {
        self.log.push("retrieve_account_data");
        self.account_data.lock().clone()
    }

    async fn retrieve_account_balance(
        &self,
        _account: &AccountNumber,
        _token: &SessionToken,
    ) -> Result<Money, BankError> {
        self.log.push("retrieve_account_balance");
        self.balance.lock().clone()
    }

    async fn retrieve_public_account_data(
        &self,
        _target: &AccountNumber,
        _token: &SessionToken,
    ) -> Result<Option<PublicAccount>, BankError> {
        self.log.push("retrieve_public_account_data");
        self.public_account.lock().clone()
    }

    async fn execute_transfer(
        &self,
        _source: &AccountNumber,
        _target: &AccountNumber,
        _amount: Money,
        _token: &SessionToken,
    ) -> Result<(), BankError> {
        self.log.push("execute_transfer");
        self.transfer.lock().clone()
    }

    async fn process_withdrawal(
        &self,
        _account: &AccountNumber,
        _amount: Money,
        _token: &SessionToken,
    ) -> Result<(), BankError> {
        self.log.push("process_withdrawal");
        let result = self.withdrawal.lock().clone();
        let latency = *self.commit_latency.lock();
        tokio::time::sleep(latency).await;
        result
    }

    async fn process_deposit(
        &self,
        _account: &AccountNumber,
        _amount: Money,
        _token: &SessionToken,
    ) -> Result<Money, BankError> {
        self.log.push("process_deposit");
        let result = self.deposit.lock().clone();
        let latency = *self.commit_latency.lock();
        tokio::time::sleep(latency).await;
        result
    }

    async fn credit_account(
        &self,
        _account: &AccountNumber,
        amount: Money,
        _token: &SessionToken,
        notation: &str,
    ) -> Result<(), BankError> {
        self.log.push("credit_account");
        self.credits.lock().push((amount, notation.to_string()));
        self.credit.lock().clone()
    }
}

// =============================================================================
// Clock and rig
// =============================================================================

pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(crate) fn test_profile() -> AccountProfile {
    AccountProfile {
        account_number: AccountNumber::new(TEST_ACCOUNT),
        account_nickname: "test-acc-nickname".to_string(),
        session_token: SessionToken::new("test-session-token"),
        withdrawal_limit: Money::from(TEST_LIMIT),
        withdrawal_limit_remaining: Money::from(TEST_LIMIT),
    }
}

pub(crate) fn test_session() -> AccountSession {
    match AccountSession::try_from(test_profile()) {
        Ok(session) => session,
        Err(err) => panic!("test profile is valid: {}", err),
    }
}

/// One set of mocks sharing a call log.
pub(crate) struct Rig {
    pub(crate) log: CallLog,
    pub(crate) now: DateTime<Utc>,
    pub(crate) reader: Arc<MockCardReader>,
    pub(crate) dispenser: Arc<MockDispenser>,
    pub(crate) display: Arc<MockDisplay>,
    pub(crate) bank: Arc<MockBank>,
}

impl Rig {
    pub(crate) fn new() -> Self {
        let log = CallLog::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Self {
            reader: Arc::new(MockCardReader::new(log.clone(), now)),
            dispenser: Arc::new(MockDispenser::new(log.clone())),
            display: Arc::new(MockDisplay::new(log.clone())),
            bank: Arc::new(MockBank::new(log.clone())),
            log,
            now,
        }
    }

    pub(crate) fn peripherals(&self) -> Peripherals {
        Peripherals {
            card_reader: self.reader.clone(),
            dispenser: self.dispenser.clone(),
            display: self.display.clone(),
            bank: BankGateway::new(self.bank.clone()),
            clock: Arc::new(FixedClock(self.now)),
        }
    }

    /// Peripherals whose bank gateway applies `deadline`.
    pub(crate) fn peripherals_with_deadline(&self, deadline: std::time::Duration) -> Peripherals {
        let mut p = self.peripherals();
        p.bank = p.bank.with_deadline(Some(deadline));
        p
    }

    /// Hold the insert-cash view until the sensor fires, then resolve it
    /// with `response`.
    pub(crate) fn relay_insertion(&self, response: ViewResponse) {
        let tx = self.display.gate_insert_cash();
        *self.dispenser.relay.lock() = Some((tx, response));
    }

    /// Whether any bank call was made.
    pub(crate) fn bank_touched(&self) -> bool {
        [
            "retrieve_account_data",
            "retrieve_account_balance",
            "retrieve_public_account_data",
            "execute_transfer",
            "process_withdrawal",
            "process_deposit",
            "credit_account",
        ]
        .iter()
        .any(|call| self.log.contains(call))
    }
}
