use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::csrf;
use crate::error::ApiError;

/// Refuses unsafe requests (POST/PUT/PATCH/DELETE) whose `X-CSRFToken`
/// header does not match the `csrftoken` cookie. Runs before the session is
/// resolved and before any body is read.
pub async fn verify_csrf(request: Request, next: Next) -> Response {
    if csrf::requires_check(request.method()) {
        if let Err(rejection) = csrf::check(request.headers()) {
            tracing::warn!(
                "Anti-forgery check failed for {} {}: {}",
                request.method(),
                request.uri().path(),
                rejection.message()
            );
            return ApiError::forbidden(rejection.message()).into_response();
        }
    }

    next.run(request).await
}
