use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use sharezone_types::api::{
    Claims, DeleteResponse, InboxResponse, RecipientsResponse, ReplyRequest, SendMessageRequest,
    SendMessageResponse, UnreadResponse,
};

use crate::auth::{AppState, with_session};
use crate::error::ApiError;

pub async fn list_recipients(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let users = with_session(&state, claims.sub, |m, session| m.list_recipients(session)).await?;
    Ok(Json(RecipientsResponse { users }))
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = with_session(&state, claims.sub, move |m, session| {
        m.send_message(session, &req.to_username, &req.message)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(SendMessageResponse { ok: true, message })))
}

pub async fn list_inbox(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let conversations = with_session(&state, claims.sub, |m, session| m.list_inbox(session)).await?;
    Ok(Json(InboxResponse { conversations }))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let unread = with_session(&state, claims.sub, |m, session| m.unread_count(session)).await?;
    Ok(Json(UnreadResponse { unread }))
}

pub async fn reply(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReplyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = with_session(&state, claims.sub, move |m, session| {
        m.reply_to(session, message_id, &req.message)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(SendMessageResponse { ok: true, message })))
}

pub async fn preview_delete(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let message =
        with_session(&state, claims.sub, move |m, session| m.preview_delete(session, message_id)).await?;
    Ok(Json(DeleteResponse { confirm: true, message }))
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let message =
        with_session(&state, claims.sub, move |m, session| m.confirm_delete(session, message_id)).await?;
    Ok(Json(DeleteResponse { confirm: false, message }))
}

pub async fn cancel_delete(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    with_session(&state, claims.sub, move |m, session| {
        m.cancel_delete(session, message_id);
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
