//! # Bank Gateway
//!
//! Wraps a [`BankApi`] with an optional deadline on the read-only calls. An
//! elapsed deadline is reported as [`BankError::Network`].
//!
//! Calls that move money are never bounded: a dropped call may still have
//! committed at the bank, and the controller would then act as if it had not.

use crate::domain::{
    AccountNumber, AccountProfile, BankError, Money, Pan, Pin, PublicAccount, SessionToken,
};
use crate::ports::BankApi;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Deadline-aware handle to the bank backend.
#[derive(Clone)]
pub struct BankGateway {
    inner: Arc<dyn BankApi>,
    deadline: Option<Duration>,
}

impl BankGateway {
    /// Gateway without a deadline.
    pub fn new(inner: Arc<dyn BankApi>) -> Self {
        Self {
            inner,
            deadline: None,
        }
    }

    /// Set or clear the per-call deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Configured deadline.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    async fn bounded<T, F>(&self, call: &'static str, fut: F) -> Result<T, BankError>
    where
        F: Future<Output = Result<T, BankError>>,
    {
        match self.deadline {
            None => fut.await,
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(call, deadline_ms = limit.as_millis() as u64, "Bank call timed out");
                    Err(BankError::Network(format!(
                        "{} exceeded {}ms deadline",
                        call,
                        limit.as_millis()
                    )))
                }
            },
        }
    }

    /// See [`BankApi::retrieve_account_data`].
    pub async fn retrieve_account_data(
        &self,
        pan: &Pan,
        pin: &Pin,
    ) -> Result<Option<AccountProfile>, BankError> {
        self.bounded(
            "retrieve_account_data",
            self.inner.retrieve_account_data(pan, pin),
        )
        .await
    }

    /// See [`BankApi::retrieve_account_balance`].
    pub async fn retrieve_account_balance(
        &self,
        account: &AccountNumber,
        token: &SessionToken,
    ) -> Result<Money, BankError> {
        self.bounded(
            "retrieve_account_balance",
            self.inner.retrieve_account_balance(account, token),
        )
        .await
    }

    /// See [`BankApi::retrieve_public_account_data`].
    pub async fn retrieve_public_account_data(
        &self,
        target: &AccountNumber,
        token: &SessionToken,
    ) -> Result<Option<PublicAccount>, BankError> {
        self.bounded(
            "retrieve_public_account_data",
            self.inner.retrieve_public_account_data(target, token),
        )
        .await
    }

    /// See [`BankApi::execute_transfer`]. Never bounded by the deadline.
    pub async fn execute_transfer(
        &self,
        source: &AccountNumber,
        target: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<(), BankError> {
        self.inner
            .execute_transfer(source, target, amount, token)
            .await
    }

    /// See [`BankApi::process_withdrawal`]. Never bounded by the deadline.
    pub async fn process_withdrawal(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<(), BankError> {
        self.inner.process_withdrawal(account, amount, token).await
    }

    /// See [`BankApi::process_deposit`]. Never bounded by the deadline.
    pub async fn process_deposit(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
    ) -> Result<Money, BankError> {
        self.inner.process_deposit(account, amount, token).await
    }

    /// See [`BankApi::credit_account`]. Never bounded by the deadline.
    pub async fn credit_account(
        &self,
        account: &AccountNumber,
        amount: Money,
        token: &SessionToken,
        notation: &str,
    ) -> Result<(), BankError> {
        self.inner.credit_account(account, amount, token, notation).await
    }
}
