pub mod characters;
pub mod stories;

pub use characters::*;
pub use stories::*;

use crate::error::ApiError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::Synced;

/// Set on mutation responses whose change could not be written to durable storage.
pub const SYNC_ERROR_HEADER: &str = "x-store-sync-error";

/// `Json` extractor whose rejections use the API's JSON error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` extractor whose rejections use the API's JSON error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

fn synced_json<T: Serialize>(synced: Synced<T>) -> Response {
    let mut response = Json(synced.value).into_response();
    if let Some(e) = synced.sync_error {
        response
            .headers_mut()
            .insert(SYNC_ERROR_HEADER, header_text(&e.to_string()));
    }
    response
}

/// Header-safe rendering of a message: anything outside visible ASCII becomes a space.
fn header_text(message: &str) -> HeaderValue {
    let text: String = message
        .chars()
        .map(|c| if c.is_ascii_graphic() { c } else { ' ' })
        .collect();
    HeaderValue::from_str(text.trim()).unwrap_or(HeaderValue::from_static("sync failed"))
}
