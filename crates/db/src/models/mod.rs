pub mod activity;
pub mod attendance;
pub mod user;

pub use activity::*;
pub use attendance::*;
pub use user::*;
