use crate::database::manager::DatabaseError;
use crate::error::ApiError;

/// Turn a store refusal into the route's own wording. `missing` is used for
/// `NotFound`, `denied` for `PermissionDenied`; anything else keeps its
/// generic mapping.
pub fn describe_refusal(err: DatabaseError, missing: impl Into<String>, denied: impl Into<String>) -> ApiError {
    match err {
        DatabaseError::NotFound(_) => ApiError::not_found(missing),
        DatabaseError::PermissionDenied(_) => {
            let message = denied.into();
            tracing::warn!("{}", message);
            ApiError::forbidden(message)
        }
        other => other.into(),
    }
}

pub const ARTICLE_MISSING: &str = "Article with such id does not exist";
pub const COMMENT_MISSING: &str = "Comment with such id does not exist";
