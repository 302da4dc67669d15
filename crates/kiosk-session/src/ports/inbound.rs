//! # Inbound Ports
//!
//! API trait defining what the session controller can do.

use crate::states::SessionState;
use async_trait::async_trait;

/// Session controller API - inbound port.
#[async_trait]
pub trait SessionControllerApi: Send + Sync {
    /// Run one state to completion and return its successor.
    ///
    /// `None` ends the loop. Faults never escape; they become prompts and
    /// transitions.
    async fn process(&self, state: SessionState) -> Option<SessionState>;

    /// Drive sessions from [`SessionState::AwaitingCustomer`] until shutdown.
    async fn run(&self);
}
