use tracing::{error, info};

use sharezone_db::Database;
use sharezone_types::models::{Message, Transaction};

use crate::error::{MessagingError, Result};
use crate::membership::Membership;
use crate::sanitize::escape_html;

pub const CONFIRM_PATH: &str = "/transaction/confirm/";

/// Text of the notice asking the receiver to confirm a hand-off. Names come
/// from user input and are escaped; the confirm link is the only markup.
pub fn confirmation_body(transaction: &Transaction) -> String {
    format!(
        "Please confirm that you received a {} from {}\n<a href='{}{}'>Confirm</a>",
        escape_html(&transaction.tool),
        escape_html(&transaction.from_user.name),
        CONFIRM_PATH,
        transaction.id,
    )
}

/// Sends the confirmation notice from the transaction's sharezone shed
/// sender. The validator is bypassed; the store still enforces that the shed
/// sender, the receiver and the transaction share one sharezone.
pub fn send_confirmation(db: &Database, transaction: &Transaction) -> Result<Message> {
    let Some(shed) = Membership::shed_sender_of(db, transaction.sharezone)? else {
        error!("Sharezone {} has no shed sender", transaction.sharezone);
        return Err(MessagingError::ConstraintViolation(format!(
            "no shed sender for sharezone {}",
            transaction.sharezone
        )));
    };

    let message = db.insert_message(
        shed.id,
        transaction.to_user.id,
        transaction.sharezone,
        &confirmation_body(transaction),
    )?;

    info!(
        "Sent confirmation for transaction {} to {}",
        transaction.id, transaction.to_user.username
    );
    Ok(message)
}
