pub mod access;
pub mod auth;
pub mod health;
pub mod profiles;
pub mod time_sheet;
