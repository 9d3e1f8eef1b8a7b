use std::sync::Arc;

use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::error;
use uuid::Uuid;

use sharezone_db::Database;
use sharezone_messaging::{MessagingError, Messenger};
use sharezone_types::api::Claims;
use sharezone_types::models::Sharer;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

/// Issues a bearer token for `sharer`. Login itself lives outside this
/// service; this is what it calls once a user has authenticated.
pub fn issue_token(secret: &str, sharer: &Sharer) -> anyhow::Result<String> {
    let claims = Claims {
        sub: sharer.id,
        username: sharer.username.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Runs `f` off the async runtime with the session user loaded from the
/// token subject. A subject that no longer exists is unauthorized.
pub(crate) async fn with_session<T, F>(state: &AppState, user_id: Uuid, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Messenger<'_>, &Sharer) -> Result<T, MessagingError> + Send + 'static,
{
    let state = state.clone();

    tokio::task::spawn_blocking(move || {
        let messenger = Messenger::new(&state.db);
        let session = match messenger.session_user(user_id) {
            Ok(session) => session,
            Err(MessagingError::NotFound) => return Err(ApiError::Unauthorized),
            Err(e) => return Err(e.into()),
        };
        f(&messenger, &session).map_err(ApiError::from)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}
