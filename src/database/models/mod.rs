pub mod article;
pub mod comment;
pub mod user;

pub use article::Article;
pub use comment::Comment;
pub use user::User;
