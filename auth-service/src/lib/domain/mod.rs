pub mod authentication;
pub mod email;
pub mod health;
pub mod token;
pub mod user;
