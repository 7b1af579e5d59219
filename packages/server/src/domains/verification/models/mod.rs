pub mod identity;
pub mod phone;

pub use identity::*;
pub use phone::*;
