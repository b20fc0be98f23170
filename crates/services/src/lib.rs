pub mod activity;
pub mod auth;
pub mod dao;

pub use activity::ActivityService;
pub use auth::AuthService;
pub use dao::*;
