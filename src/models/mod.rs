pub mod spin;
pub mod user;

pub use spin::*;
pub use user::*;
