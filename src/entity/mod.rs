pub mod blog;
pub mod blog_tag;
pub mod comment;
pub mod contact_info;
pub mod contact_message;
pub mod profile;
pub mod tag;
pub mod user;
