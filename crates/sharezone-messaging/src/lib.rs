//! Direct messaging between members of a sharezone.
//!
//! The [`validator`] decides whether a send is allowed and sanitizes the
//! body, the [`conversation`] assembler groups stored messages for the inbox
//! and the admin history, and [`service::Messenger`] ties both to the store
//! as the operations a web layer calls.

pub mod conversation;
pub mod error;
pub mod membership;
pub mod notifier;
pub mod sanitize;
pub mod service;
pub mod validator;

pub use error::{MessagingError, ValidationError};
pub use membership::Membership;
pub use service::Messenger;
