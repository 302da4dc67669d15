//! # Domain Module
//!
//! Core value types for the kiosk session: money, account context, card
//! data, display vocabulary and the fault taxonomy.

pub mod account;
pub mod card;
pub mod display;
pub mod errors;
pub mod money;

pub use account::{AccountNumber, AccountProfile, AccountSession, PublicAccount, SessionToken};
pub use card::{CardData, Pan, Pin};
pub use display::{
    ErrorPrompt, OperationRequest, Prompt, PromptHandle, View, ViewPayload, ViewResponse,
};
pub use errors::*;
pub use money::Money;
