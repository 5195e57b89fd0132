pub mod departments;
pub mod sessions;
pub mod users;
