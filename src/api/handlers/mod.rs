pub mod health;
pub mod login;
pub mod users;
