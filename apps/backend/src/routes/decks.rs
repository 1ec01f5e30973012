//! Deck endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::ApiJson;
use crate::AppState;

/// POST /api/decks
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiJson(payload): ApiJson<NewDeck>,
) -> Result<(StatusCode, Json<Deck>)> {
    let deck = state.study.create_deck(auth.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(deck)))
}

/// GET /api/decks
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DeckListResponse>> {
    let decks = state.study.list_decks(auth.user_id).await?;
    Ok(Json(DeckListResponse { decks }))
}

/// GET /api/decks/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<DeckSummary>> {
    let deck = state.study.get_deck(auth.user_id, deck_id).await?;
    Ok(Json(deck))
}

/// DELETE /api/decks/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<DeleteDeckResponse>> {
    let deleted_cards = state.study.delete_deck(auth.user_id, deck_id).await?;
    Ok(Json(DeleteDeckResponse { deleted_cards }))
}

/// GET /api/decks/:id/cards
pub async fn cards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<CardListResponse>> {
    let cards = state.study.list_cards(auth.user_id, deck_id).await?;
    Ok(Json(CardListResponse { cards }))
}
