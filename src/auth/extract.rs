use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use tracing::debug;

use crate::{error::AppError, users::validation::ValidationError};

/// `Json<T>` whose rejections go through [`AppError`], so a malformed or
/// mistyped body still gets the `{success:false, message}` envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(e) => {
                debug!(status = %e.status(), "request body rejected");
                Err(ValidationError::single("body", e.body_text()).into())
            }
        }
    }
}
