pub mod extract;
pub mod keys;
pub mod time;
pub mod upload;
