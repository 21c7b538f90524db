pub mod case;
pub mod filters;
pub mod user;

pub use case::*;
pub use filters::*;
pub use user::*;
