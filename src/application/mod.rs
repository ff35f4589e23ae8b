pub mod app_error;
pub mod cache;
pub mod password;
pub mod ports;
pub mod token;
pub mod use_cases;
pub mod validators;
