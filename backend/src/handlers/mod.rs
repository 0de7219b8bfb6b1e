pub mod products;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::{error::AppError, models::ProductId};

/// Liveness probe.
pub async fn root() -> &'static str {
    "Products Server is Running"
}

/// `:id` path segment that has already passed the store's id-format check.
///
/// Rejects with [`AppError::InvalidId`], so a malformed id never reaches a handler body.
#[derive(Debug, Clone, Copy)]
pub struct ProductIdPath(pub ProductId);

#[async_trait]
impl<S> FromRequestParts<S> for ProductIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::InvalidId)?;
        ProductId::parse(&raw).map(Self).ok_or(AppError::InvalidId)
    }
}
