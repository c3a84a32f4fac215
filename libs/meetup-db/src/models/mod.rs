pub mod donation;
pub mod event;
pub mod guest;
pub mod question;
pub mod schedule;
