use axum::{Extension, Json, extract::State, response::IntoResponse};

use sharezone_messaging::conversation::HistoryQuery;
use sharezone_types::api::{Claims, HistoryRequest, HistoryResponse};
use sharezone_types::models::UserFilter;

use crate::auth::{AppState, with_session};
use crate::error::ApiError;

pub async fn full_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    history(state, claims, HistoryRequest::default()).await
}

/// `from` / `to` may be a username, `"Any"`, or absent.
pub async fn filtered_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<HistoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    history(state, claims, req).await
}

async fn history(
    state: AppState,
    claims: Claims,
    req: HistoryRequest,
) -> Result<Json<HistoryResponse>, ApiError> {
    let query = HistoryQuery {
        from: UserFilter::parse(req.from.as_deref()),
        to: UserFilter::parse(req.to.as_deref()),
    };
    let selected_from = selected(&query.from);
    let selected_to = selected(&query.to);

    let history = with_session(&state, claims.sub, move |m, session| m.list_history(session, &query)).await?;

    Ok(Json(HistoryResponse {
        history: history.buckets,
        users: history.users,
        selected_from,
        selected_to,
    }))
}

fn selected(filter: &UserFilter) -> Option<String> {
    match filter {
        UserFilter::Any => None,
        UserFilter::Username(name) => Some(name.clone()),
    }
}
