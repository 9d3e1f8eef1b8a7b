use std::collections::HashMap;

use uuid::Uuid;

use sharezone_types::models::{Conversation, HistoryBucket, Message, Sharer, UserFilter};

/// Groups `messages` by sender for `viewer`'s inbox.
///
/// Messages not addressed to the viewer are skipped. Each unread message is
/// passed to `mark_read` before it is grouped; already-read ones are not, so
/// the callback only fires for real transitions. Groups appear in the order
/// their first message was seen and keep the input order within a group.
pub fn assemble_inbox<E>(
    viewer: &Sharer,
    messages: Vec<Message>,
    mut mark_read: impl FnMut(&Message) -> Result<(), E>,
) -> Result<Vec<Conversation>, E> {
    let mut conversations: Vec<Conversation> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for mut message in messages {
        if !message.to_user.is(viewer) {
            continue;
        }

        if !message.read {
            mark_read(&message)?;
            message.read = true;
        }

        let correspondent = message.from_user.name.clone();
        match index.get(&correspondent) {
            Some(&i) => conversations[i].messages.push(message),
            None => {
                index.insert(correspondent.clone(), conversations.len());
                conversations.push(Conversation {
                    correspondent,
                    messages: vec![message],
                });
            }
        }
    }

    Ok(conversations)
}

/// Which history an admin may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScope {
    Sharezone(Uuid),
    Global,
}

impl HistoryScope {
    pub fn sharezone(self) -> Option<Uuid> {
        match self {
            HistoryScope::Sharezone(id) => Some(id),
            HistoryScope::Global => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub from: UserFilter,
    pub to: UserFilter,
}

impl HistoryQuery {
    pub fn any() -> Self {
        Self {
            from: UserFilter::Any,
            to: UserFilter::Any,
        }
    }
}

/// Buckets `messages` by (sender name, recipient name), keeping only those
/// that pass both sides of `query`. Buckets appear in the order their first
/// message was seen; a pair with no matching message gets no bucket.
pub fn assemble_history(messages: Vec<Message>, query: &HistoryQuery) -> Vec<HistoryBucket> {
    let mut buckets: Vec<HistoryBucket> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for message in messages {
        if !query.from.matches(&message.from_user) || !query.to.matches(&message.to_user) {
            continue;
        }

        let key = (message.from_user.name.clone(), message.to_user.name.clone());
        match index.get(&key) {
            Some(&i) => buckets[i].messages.push(message),
            None => {
                index.insert(key.clone(), buckets.len());
                let (from, to) = key;
                buckets.push(HistoryBucket {
                    from,
                    to,
                    messages: vec![message],
                });
            }
        }
    }

    buckets
}
