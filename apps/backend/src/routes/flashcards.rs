//! Flashcard and review endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::routes::{ApiJson, ApiQuery};
use crate::AppState;

/// POST /api/flashcards
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiJson(payload): ApiJson<CreateCardRequest>,
) -> Result<(StatusCode, Json<Flashcard>)> {
    let card = state
        .study
        .create_card(auth.user_id, payload.deck_id, payload.card)
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// POST /api/flashcards/generate
pub async fn generate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiJson(payload): ApiJson<GenerateCardsRequest>,
) -> Result<(StatusCode, Json<GenerateCardsResponse>)> {
    let cards = state
        .study
        .bulk_generate_cards(auth.user_id, payload.deck_id, &payload.text, payload.count)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GenerateCardsResponse {
            count: cards.len(),
            cards,
        }),
    ))
}

/// GET /api/flashcards/due
pub async fn due(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<DueCardsQuery>,
) -> Result<Json<CardListResponse>> {
    let cards = state
        .study
        .due_cards(auth.user_id, query.deck_id, query.limit)
        .await?;
    Ok(Json(CardListResponse { cards }))
}

/// POST /api/flashcards/:id/review
pub async fn review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<Uuid>,
    ApiJson(payload): ApiJson<ReviewRequest>,
) -> Result<Json<Flashcard>> {
    let card = state
        .study
        .review_card(auth.user_id, card_id, payload.quality)
        .await?;
    Ok(Json(card))
}

/// DELETE /api/flashcards/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(card_id): Path<Uuid>,
) -> Result<StatusCode> {
    state.study.delete_card(auth.user_id, card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
