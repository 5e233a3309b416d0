pub mod constants;
pub mod credential;
pub mod settings;
