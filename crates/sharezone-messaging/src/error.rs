use thiserror::Error;
use tracing::error;

use sharezone_db::StoreError;
use sharezone_types::models::MAX_BODY_CHARS;

/// A send the user can fix by editing the form. The `Display` text is shown
/// next to the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("User does not exist. Please try again.")]
    RecipientNotFound,

    #[error("You cannot send a message to yourself.")]
    SelfMessage,

    #[error("Please enter a User in the same Sharezone.")]
    CrossSharezone,

    #[error("You must join a Sharezone before sending messages.")]
    NoSharezone,

    #[error("This field is required.")]
    EmptyBody,

    #[error("Ensure this value has at most {max} characters (it has {actual}).", max = MAX_BODY_CHARS)]
    BodyTooLong { actual: usize },
}

impl ValidationError {
    /// The form field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::RecipientNotFound
            | ValidationError::SelfMessage
            | ValidationError::CrossSharezone
            | ValidationError::NoSharezone => "to_username",
            ValidationError::EmptyBody | ValidationError::BodyTooLong { .. } => "message",
        }
    }
}

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Stale or foreign message id.
    #[error("This message is no longer available.")]
    NotFound,

    #[error("Message history is only available to sharezone admins.")]
    NotAdmin,

    /// A write reached the store that should have been rejected earlier.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("store failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for MessagingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => MessagingError::NotFound,
            StoreError::ConstraintViolation(reason) => {
                error!("Store rejected write: {}", reason);
                MessagingError::ConstraintViolation(reason)
            }
            other => MessagingError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, MessagingError>;
