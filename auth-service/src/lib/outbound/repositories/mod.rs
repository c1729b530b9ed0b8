pub mod memory;
pub mod token;
pub mod user;
