pub mod enums;
pub mod review;

pub use enums::*;
pub use review::*;
