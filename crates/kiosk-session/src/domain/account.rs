//! # Account Data
//!
//! The session account context and the bank records it is built from.

use super::errors::{MoneyError, SessionError};
use super::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Bank account identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Wrap an account identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountNumber {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque bank-issued session token.
///
/// Attached to every bank call made on behalf of a session. `Debug` output is
/// redacted so the token never reaches the logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw token for the bank adapter.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Account record returned by the bank on successful authentication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Account identifier.
    pub account_number: AccountNumber,
    /// Name shown to the customer.
    pub account_nickname: String,
    /// Token for subsequent calls.
    pub session_token: SessionToken,
    /// Per-period withdrawal/transfer limit.
    pub withdrawal_limit: Money,
    /// Limit left in the current period.
    pub withdrawal_limit_remaining: Money,
}

/// Publicly visible data of a transfer target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAccount {
    /// Account identifier.
    pub account_number: AccountNumber,
    /// Name shown in the confirmation view.
    pub account_nickname: String,
}

/// Authenticated account context carried through one customer session.
///
/// Immutable: a change to the remaining limit yields a new value.
///
/// INVARIANT: `limit_remaining <= limit`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountSession {
    session_id: Uuid,
    account_number: AccountNumber,
    nickname: String,
    token: SessionToken,
    limit: Money,
    limit_remaining: Money,
}

impl AccountSession {
    /// Build a context, checking the limit invariant.
    pub fn new(
        account_number: AccountNumber,
        nickname: impl Into<String>,
        token: SessionToken,
        limit: Money,
        limit_remaining: Money,
    ) -> Result<Self, SessionError> {
        if account_number.as_str().is_empty() {
            return Err(SessionError::EmptyAccountNumber);
        }
        if limit_remaining > limit {
            return Err(SessionError::LimitInvariant {
                limit: limit.to_string(),
                remaining: limit_remaining.to_string(),
            });
        }
        Ok(Self {
            session_id: Uuid::new_v4(),
            account_number,
            nickname: nickname.into(),
            token,
            limit,
            limit_remaining,
        })
    }

    /// Correlation id for logs. Never sent to the bank.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Account identifier.
    pub fn account_number(&self) -> &AccountNumber {
        &self.account_number
    }

    /// Display nickname.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Bank session token.
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Per-period limit.
    pub fn limit(&self) -> Money {
        self.limit
    }

    /// Limit left in the current period.
    pub fn limit_remaining(&self) -> Money {
        self.limit_remaining
    }

    /// A new context with `amount` taken off the remaining limit.
    ///
    /// Callers validate `amount <= limit_remaining` first.
    pub fn with_limit_consumed(&self, amount: Money) -> Result<Self, MoneyError> {
        let limit_remaining = self.limit_remaining.checked_sub(amount)?;
        Ok(Self {
            limit_remaining,
            ..self.clone()
        })
    }
}

impl TryFrom<AccountProfile> for AccountSession {
    type Error = SessionError;

    fn try_from(profile: AccountProfile) -> Result<Self, Self::Error> {
        AccountSession::new(
            profile.account_number,
            profile.account_nickname,
            profile.session_token,
            profile.withdrawal_limit,
            profile.withdrawal_limit_remaining,
        )
    }
}
