pub mod activity;
pub mod attendance;
pub mod base;
pub mod user;
