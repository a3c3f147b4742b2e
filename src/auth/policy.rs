//! Write authorization for authored resources.
//!
//! Reads need only a session. Updates and deletes of an article or a comment
//! are allowed for its author alone.

use crate::types::UserId;

/// True iff `requester_id` may update or delete a resource owned by `resource_owner_id`
pub fn can_write(requester_id: UserId, resource_owner_id: UserId) -> bool {
    requester_id == resource_owner_id
}
