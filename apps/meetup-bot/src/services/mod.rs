pub mod input;
pub mod notify;
