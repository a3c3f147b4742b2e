pub mod auth;
pub mod csrf;

pub use auth::{load_session, login_required};
pub use csrf::verify_csrf;
