use tracing::debug;
use uuid::Uuid;

use sharezone_types::models::{MAX_BODY_CHARS, Sharer, SharerKind};

use crate::error::{Result, ValidationError};
use crate::membership::Membership;
use crate::sanitize::escape_html;

/// A send that passed every check, ready to be handed to the store.
#[derive(Debug, Clone)]
pub struct ValidatedSend {
    pub sender: Sharer,
    pub recipient: Sharer,
    pub sharezone: Uuid,
    pub body: String,
}

/// Decide whether `sender` may message `recipient_username` with `body`.
///
/// Checks run in a fixed order and the first failure is returned as
/// [`MessagingError::Validation`](crate::MessagingError::Validation); any other error is a membership lookup
/// failure. Nothing is written.
pub fn validate_send<M: Membership + ?Sized>(
    membership: &M,
    sender: &Sharer,
    recipient_username: &str,
    body: &str,
) -> Result<ValidatedSend> {
    let recipient = match membership.resolve_user_by_username(recipient_username.trim())? {
        Some(r) if r.kind == SharerKind::Member => r,
        _ => return Err(ValidationError::RecipientNotFound.into()),
    };

    if recipient.username == sender.username {
        return Err(ValidationError::SelfMessage.into());
    }

    let Some(sharezone) = membership.current_sharezone_of(sender)? else {
        return Err(ValidationError::NoSharezone.into());
    };
    if recipient.sharezone != Some(sharezone) {
        debug!(
            "Cross-sharezone send from {} to {} rejected",
            sender.username, recipient.username
        );
        return Err(ValidationError::CrossSharezone.into());
    }

    let body = clean_body(body)?;

    Ok(ValidatedSend {
        sender: sender.clone(),
        recipient,
        sharezone,
        body,
    })
}

/// Trim, require content, escape, and bound the escaped length.
pub fn clean_body(body: &str) -> std::result::Result<String, ValidationError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyBody);
    }

    let escaped = escape_html(trimmed);
    let actual = escaped.chars().count();
    if actual > MAX_BODY_CHARS {
        return Err(ValidationError::BodyTooLong { actual });
    }

    Ok(escaped)
}
