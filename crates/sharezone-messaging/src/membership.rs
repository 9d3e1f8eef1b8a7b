use uuid::Uuid;

use sharezone_db::Database;
use sharezone_types::models::Sharer;

use crate::error::Result;

/// Who exists, where they belong, and who administers what. Backed by the
/// store in production; the validator only ever sees this trait.
pub trait Membership {
    fn resolve_user_by_username(&self, username: &str) -> Result<Option<Sharer>>;

    /// The sharer's affiliation as of now, which may differ from the
    /// snapshot the caller is holding.
    fn current_sharezone_of(&self, sharer: &Sharer) -> Result<Option<Uuid>>;

    fn is_admin_of(&self, sharer: &Sharer, sharezone: Uuid) -> Result<bool>;

    fn shed_sender_of(&self, sharezone: Uuid) -> Result<Option<Sharer>>;

    /// Ordinary members, restricted to one sharezone when given.
    fn members(&self, sharezone: Option<Uuid>) -> Result<Vec<Sharer>>;
}

impl Membership for Database {
    fn resolve_user_by_username(&self, username: &str) -> Result<Option<Sharer>> {
        Ok(self.get_sharer_by_username(username)?)
    }

    fn current_sharezone_of(&self, sharer: &Sharer) -> Result<Option<Uuid>> {
        Ok(self.get_sharer_by_id(sharer.id)?.and_then(|s| s.sharezone))
    }

    fn is_admin_of(&self, sharer: &Sharer, sharezone: Uuid) -> Result<bool> {
        Ok(Database::is_admin_of(self, sharer.id, sharezone)?)
    }

    fn shed_sender_of(&self, sharezone: Uuid) -> Result<Option<Sharer>> {
        Ok(Database::shed_sender_of(self, sharezone)?)
    }

    fn members(&self, sharezone: Option<Uuid>) -> Result<Vec<Sharer>> {
        Ok(self.list_members(sharezone)?)
    }
}
