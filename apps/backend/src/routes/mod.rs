pub mod auth;
pub mod decks;
pub mod flashcards;
pub mod users;

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON body whose rejections come back as `invalid_input`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections come back as `invalid_input`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
