use tracing::{debug, info, warn};
use uuid::Uuid;

use sharezone_db::{Database, MessageFilter, MessageOrder};
use sharezone_types::models::{
    Conversation, HistoryBucket, Message, SelectableUser, Sharer, Transaction,
};

use crate::conversation::{HistoryQuery, HistoryScope, assemble_history, assemble_inbox};
use crate::error::{MessagingError, Result};
use crate::membership::Membership;
use crate::notifier;
use crate::validator::validate_send;

/// Admin history plus the usernames the filter controls may offer.
#[derive(Debug, Clone)]
pub struct History {
    pub buckets: Vec<HistoryBucket>,
    pub users: Vec<SelectableUser>,
}

/// The messaging operations a web layer calls. Every method takes the
/// session user explicitly and is a single unit of work against the store.
pub struct Messenger<'a> {
    db: &'a Database,
}

impl<'a> Messenger<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Loads the sharer behind an authenticated session.
    pub fn session_user(&self, id: Uuid) -> Result<Sharer> {
        self.db.get_sharer_by_id(id)?.ok_or(MessagingError::NotFound)
    }

    /// Members the session user may address: same sharezone, not themselves.
    pub fn list_recipients(&self, session: &Sharer) -> Result<Vec<SelectableUser>> {
        let Some(sharezone) = self.db.current_sharezone_of(session)? else {
            return Ok(vec![]);
        };
        Ok(self
            .db
            .members(Some(sharezone))?
            .iter()
            .filter(|s| !s.is(session))
            .map(SelectableUser::from)
            .collect())
    }

    pub fn send_message(&self, session: &Sharer, recipient_username: &str, body: &str) -> Result<Message> {
        let send = validate_send(self.db, session, recipient_username, body).inspect_err(|e| {
            if let MessagingError::Validation(reason) = e {
                warn!("{} could not message '{}': {}", session.username, recipient_username, reason);
            }
        })?;

        let message = self
            .db
            .insert_message(send.sender.id, send.recipient.id, send.sharezone, &send.body)?;
        debug!("{} sent message {} to {}", session.username, message.id, send.recipient.username);
        Ok(message)
    }

    /// The session user's received messages grouped by sender, marking each
    /// unread one as read on the way through.
    pub fn list_inbox(&self, session: &Sharer) -> Result<Vec<Conversation>> {
        let filter = MessageFilter {
            to_user: Some(session.id),
            ..Default::default()
        };
        let messages = self.db.list_messages(&filter, MessageOrder::SenderThenNewest)?;

        assemble_inbox(session, messages, |message| -> Result<()> {
            self.db.mark_read(message.id)?;
            Ok(())
        })
    }

    pub fn unread_count(&self, session: &Sharer) -> Result<u64> {
        Ok(self.db.count_unread(session.id)?)
    }

    /// Answers a received message. The reply goes to the original sender and
    /// is validated as a fresh send to them.
    pub fn reply_to(&self, session: &Sharer, original_id: Uuid, body: &str) -> Result<Message> {
        let original = self.received_message(session, original_id)?;
        self.send_message(session, &original.from_user.username, body)
    }

    /// The message a delete would remove, for the confirmation step.
    pub fn preview_delete(&self, session: &Sharer, message_id: Uuid) -> Result<Message> {
        self.received_message(session, message_id)
    }

    /// Removes the message for good and returns a copy of what was removed.
    pub fn confirm_delete(&self, session: &Sharer, message_id: Uuid) -> Result<Message> {
        self.received_message(session, message_id)?;
        let removed = self.db.delete_message(message_id)?;
        info!("{} deleted message {}", session.username, message_id);
        Ok(removed)
    }

    pub fn cancel_delete(&self, session: &Sharer, message_id: Uuid) {
        debug!("{} kept message {}", session.username, message_id);
    }

    pub fn list_history(&self, session: &Sharer, query: &HistoryQuery) -> Result<History> {
        let scope = self.history_scope(session)?;

        let filter = MessageFilter {
            sharezone: scope.sharezone(),
            ..Default::default()
        };
        let messages = self.db.list_messages(&filter, MessageOrder::SenderThenNewest)?;
        let users = self
            .db
            .members(scope.sharezone())?
            .iter()
            .map(SelectableUser::from)
            .collect();

        debug!("{} viewed history {:?} with {:?}", session.username, scope, query);
        Ok(History {
            buckets: assemble_history(messages, query),
            users,
        })
    }

    pub fn send_confirmation(&self, transaction: &Transaction) -> Result<Message> {
        notifier::send_confirmation(self.db, transaction)
    }

    /// Global admins see everything; an admin of their own sharezone sees
    /// that sharezone. Everyone else is refused.
    fn history_scope(&self, session: &Sharer) -> Result<HistoryScope> {
        if session.global_admin {
            return Ok(HistoryScope::Global);
        }
        if let Some(sharezone) = self.db.current_sharezone_of(session)? {
            if Membership::is_admin_of(self.db, session, sharezone)? {
                return Ok(HistoryScope::Sharezone(sharezone));
            }
        }
        warn!("{} requested message history without admin rights", session.username);
        Err(MessagingError::NotAdmin)
    }

    /// Fetches a message the session user received. Messages addressed to
    /// someone else are reported as missing.
    fn received_message(&self, session: &Sharer, id: Uuid) -> Result<Message> {
        let message = self.db.get_message(id)?;
        if !message.to_user.is(session) {
            debug!("{} asked for message {} addressed to someone else", session.username, id);
            return Err(MessagingError::NotFound);
        }
        Ok(message)
    }
}
