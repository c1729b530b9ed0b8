pub mod email;
pub mod health;
pub mod password;
pub mod repositories;
