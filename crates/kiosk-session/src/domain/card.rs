//! # Card Data
//!
//! Values read from the card and typed by the customer. Consumed only while
//! authenticating and never retained in the session context.

use chrono::{DateTime, Utc};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Primary account number read from the card.
#[derive(Clone, PartialEq, Eq)]
pub struct Pan(String);

impl Pan {
    /// Wrap a PAN.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw PAN for the bank adapter.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Only the last four digits ever reach a log line.
impl fmt::Debug for Pan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible = self
            .0
            .char_indices()
            .rev()
            .nth(3)
            .map(|(idx, _)| &self.0[idx..])
            .unwrap_or("");
        write!(f, "Pan(****{})", visible)
    }
}

/// Data produced by a successful card read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardData {
    /// Primary account number.
    pub pan: Pan,
    /// Expiration instant.
    pub expires_at: DateTime<Utc>,
}

impl CardData {
    /// Build card data.
    pub fn new(pan: Pan, expires_at: DateTime<Utc>) -> Self {
        Self { pan, expires_at }
    }

    /// A card is expired once its expiration instant is strictly in the past.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// PIN typed on the display. Wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Pin(String);

impl Pin {
    /// Wrap a PIN.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Raw PIN for the bank adapter.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(<redacted>)")
    }
}
