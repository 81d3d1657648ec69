pub mod creation;
pub mod user;

pub use creation::*;
pub use user::*;
