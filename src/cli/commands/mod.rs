pub mod route;
pub mod slug;
pub mod token;
