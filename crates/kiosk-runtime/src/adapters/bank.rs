//! # In-Memory Bank
//!
//! Implements `BankApi` over a ledger held in memory: accounts, issued cards,
//! live session tokens and an audit trail of every money movement.
//!
//! Faults can be injected per account (one-shot transaction conflict) or for
//! the whole bank (offline, every call fails with a network error).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiosk_session::{
    AccountNumber, AccountProfile, BankApi, BankError, Money, MoneyError, Pan, Pin, PublicAccount,
    SessionToken,
};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Account held by the bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRecord {
    /// Account identifier.
    pub number: AccountNumber,
    /// Name shown to customers.
    pub nickname: String,
    /// Current balance.
    pub balance: Money,
    /// Per-period withdrawal/transfer limit.
    pub limit: Money,
    /// Limit left in the current period.
    pub limit_remaining: Money,
}

/// Kind of ledger movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuditKind {
    /// Customer deposit.
    Deposit,
    /// Debit ahead of a payout.
    Withdrawal,
    /// Transfer debit.
    TransferOut {
        /// Receiving account
        to: AccountNumber,
    },
    /// Transfer credit.
    TransferIn {
        /// Sending account
        from: AccountNumber,
    },
    /// Out-of-band credit.
    Credit {
        /// Reason recorded by the caller
        notation: String,
    },
}

/// One ledger movement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
    /// When the movement was applied.
    pub recorded_at: DateTime<Utc>,
    /// Account moved.
    pub account: AccountNumber,
    /// Movement kind.
    pub kind: AuditKind,
    /// Amount moved.
    pub amount: Money,
    /// Balance after the movement.
    pub balance_after: Money,
}

#[derive(Clone, Debug)]
struct CardRecord {
    pin: String,
    account: AccountNumber,
}

#[derive(Default)]
struct Ledger {
    accounts: HashMap<AccountNumber, AccountRecord>,
    cards: HashMap<String, CardRecord>,
    sessions: HashMap<String, AccountNumber>,
    pending_conflicts: HashSet<AccountNumber>,
    audit: Vec<AuditEntry>,
}

impl Ledger {
    fn authorize(&self, account: &AccountNumber, token: &SessionToken) -> Result<(), BankError> {
        match self.sessions.get(token.expose()) {
            Some(owner) if owner == account => Ok(()),
            Some(_) => Err(BankError::Other(
                "session token does not own this account".to_string(),
            )),
            None => Err(BankError::Other("unknown session token".to_string())),
        }
    }

    fn take_conflict(&mut self, account: &AccountNumber) -> Result<(), BankError> {
        if self.pending_conflicts.remove(account) {
            return Err(BankError::TransactionConflict(format!(
                "account {account} changed since it was read"
            )));
        }
        Ok(())
    }

    fn account_mut(&mut self, account: &AccountNumber) -> Result<&mut AccountRecord, BankError> {
        self.accounts
            .get_mut(account)
            .ok_or_else(|| BankError::Other(format!("account {account} not found")))
    }

    /// Check that `amount` can leave `account` as a limited spend.
    fn check_spend(&self, account: &AccountNumber, amount: Money) -> Result<(), BankError> {
        let record = self
            .accounts
            .get(account)
            .ok_or_else(|| BankError::Other(format!("account {account} not found")))?;
        if record.balance < amount {
            return Err(BankError::Other("insufficient funds".to_string()));
        }
        if record.limit_remaining < amount {
            return Err(BankError::Other("withdrawal limit exceeded".to_string()));
        }
        Ok(())
    }

    fn record(&mut self, account: &AccountNumber, kind: AuditKind, amount: Money, balance: Money) {
        self.audit.push(AuditEntry {
            recorded_at: Utc::now(),
            account: account.clone(),
            kind,
            amount,
            balance_after: balance,
        });
    }
}

fn ledger_error(err: MoneyError) -> BankError {
    BankError::Other(err.to_string())
}

/// Bank backend held entirely in memory.
pub struct InMemoryBank {
    delay: Duration,
    online: AtomicBool,
    ledger: RwLock<Ledger>,
}

impl InMemoryBank {
    /// Bank whose calls each take `delay`.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            online: AtomicBool::new(true),
            ledger: RwLock::new(Ledger::default()),
        }
    }

    /// Open an account with its full limit available.
    pub fn open_account(
        &self,
        number: AccountNumber,
        nickname: impl Into<String>,
        balance: Money,
        limit: Money,
    ) {
        let record = AccountRecord {
            number: number.clone(),
            nickname: nickname.into(),
            balance,
            limit,
            limit_remaining: limit,
        };
        self.ledger.write().accounts.insert(number, record);
    }

    /// Issue a card for `account`.
    pub fn issue_card(&self, pan: &Pan, pin: &str, account: AccountNumber) {
        self.ledger.write().cards.insert(
            pan.as_str().to_string(),
            CardRecord {
                pin: pin.to_string(),
                account,
            },
        );
    }

    /// Fail the next money movement on `account` with a transaction conflict.
    pub fn inject_conflict(&self, account: &AccountNumber) {
        self.ledger.write().pending_conflicts.insert(account.clone());
    }

    /// Take the bank off the network, or bring it back.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Account as currently held.
    pub fn account(&self, number: &AccountNumber) -> Option<AccountRecord> {
        self.ledger.read().accounts.get(number).cloned()
    }

    /// Current balance of `number`.
    pub fn balance_of(&self, number: &AccountNumber) -> Option<Money> {
        self.ledger.read().accounts.get(number).map(|a| a.balance)
    }

    /// Every movement applied so far, oldest first.
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.ledger.read().audit.clone()
    }

    async fn round_trip(&self) -> Result<(), BankError> {
        tokio::time::sleep(self.delay).await;
        if !self.online.load(Ordering::SeqCst) {
            return Err(BankError::Network("bank host unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BankApi for InMemoryBank {
    async fn retrieve_account_data(
        &self,
        pan: &Pan,
        pin: &Pin,
    ) -> Result<Option<AccountProfile>, BankError> {
        self.round_trip().await?;
        let mut ledger = self.ledger.write();

        let Some(card) = ledger.cards.get(pan.as_str()).cloned() else {
            debug!(?pan, "Unknown card");
            return Ok(None);
        };
        if card.pin != pin.expose() {
            debug!(?pan, "PIN mismatch");
            return Ok(None);
        }
        let Some(record) = ledger.accounts.get(&card.account).cloned() else {
            warn!(account = %card.account, "Card issued for a missing account");
            return Ok(None);
        };

        let token = Uuid::new_v4().to_string();
        ledger.sessions.insert(token.clone(), record.number.clone());
        info!(account = %record.number, "Session opened");

        Ok(Some(AccountProfile {
            account_number: record.number,
            account_nickname: record.nickname,
            session_token: SessionToken::new(token),
            withdrawal_limit: record.limit,
            withdrawal_limit_remaining: record.limit_remaining,
        }))
    }

    async fn retrieve_account_balance(
        &self,
        account: &AccountNumber,
        token: &SessionToken,
    ) -> Result<Money, BankError> {
        self.round_trip().await?;
        let ledger = self.ledger.read();
        ledger.authorize(account, token)?;
        ledger
            .accounts
            .get(account)
            .map(|record| record.balance)
            .ok_or_else(|| BankError::Other(format!("account {account} not found")))
    }

    async fn retrieve_public_account_data(
        &self,
        target: &AccountNumber,
        token: &SessionToken,
    ) -> Result<Option<PublicAccount>, BankError> {
        self.round_trip().await?;
        let ledger = self.ledger.read();
        if !ledger.sessions.contains_key(token.expose()) {
            return Err(BankError::Other("unknown session token".to_string()));
        }
        Ok(ledger.accounts.get(target).map(|record| PublicAccount {
            account_number: record.number.clone(),
            account_nickname: record.nickname.clone(),
        }))
    }

    async fn execute_transfer(
        &self,
        source: &AccountNumber,
        target: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<(), BankError> {
        self.round_trip().await?;
        let mut ledger = self.ledger.write();
        ledger.authorize(source, token)?;
        if source == target {
            return Err(BankError::Other(
                "source and target accounts are the same".to_string(),
            ));
        }
        if !ledger.accounts.contains_key(target) {
            return Err(BankError::Other(format!("account {target} not found")));
        }
        ledger.take_conflict(source)?;
        ledger.check_spend(source, amount)?;

        let debited = {
            let record = ledger.account_mut(source)?;
            record.balance = record.balance.checked_sub(amount).map_err(ledger_error)?;
            record.limit_remaining = record
                .limit_remaining
                .checked_sub(amount)
                .map_err(ledger_error)?;
            record.balance
        };
        let credited = {
            let record = ledger.account_mut(target)?;
            record.balance = record.balance.checked_add(amount).map_err(ledger_error)?;
            record.balance
        };
        ledger.record(
            source,
            AuditKind::TransferOut { to: target.clone() },
            amount,
            debited,
        );
        ledger.record(
            target,
            AuditKind::TransferIn {
                from: source.clone(),
            },
            amount,
            credited,
        );
        info!(%source, %target, %amount, "Transfer applied");
        Ok(())
    }

    async fn process_withdrawal(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<(), BankError> {
        self.round_trip().await?;
        let mut ledger = self.ledger.write();
        ledger.authorize(account, token)?;
        ledger.take_conflict(account)?;
        ledger.check_spend(account, amount)?;

        let balance = {
            let record = ledger.account_mut(account)?;
            record.balance = record.balance.checked_sub(amount).map_err(ledger_error)?;
            record.limit_remaining = record
                .limit_remaining
                .checked_sub(amount)
                .map_err(ledger_error)?;
            record.balance
        };
        ledger.record(account, AuditKind::Withdrawal, amount, balance);
        info!(%account, %amount, "Withdrawal debited");
        Ok(())
    }

    async fn process_deposit(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<Money, BankError> {
        self.round_trip().await?;
        let mut ledger = self.ledger.write();
        ledger.authorize(account, token)?;
        ledger.take_conflict(account)?;

        let balance = {
            let record = ledger.account_mut(account)?;
            record.balance = record.balance.checked_add(amount).map_err(ledger_error)?;
            record.balance
        };
        ledger.record(account, AuditKind::Deposit, amount, balance);
        info!(%account, %amount, "Deposit credited");
        Ok(balance)
    }

    async fn credit_account(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
        notation: &str,
    ) -> Result<(), BankError> {
        self.round_trip().await?;
        let mut ledger = self.ledger.write();
        ledger.authorize(account, token)?;

        let balance = {
            let record = ledger.account_mut(account)?;
            record.balance = record.balance.checked_add(amount).map_err(ledger_error)?;
            record.balance
        };
        ledger.record(
            account,
            AuditKind::Credit {
                notation: notation.to_string(),
            },
            amount,
            balance,
        );
        warn!(%account, %amount, notation, "Out-of-band credit applied");
        Ok(())
    }
}
