//! Request extractors.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON body extractor whose rejections use the `ApiError` response body
/// instead of axum's plain-text one.
#[derive(Debug, Clone, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
