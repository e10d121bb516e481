pub mod clock;
pub mod engine;
pub mod rules;

pub use clock::*;
pub use engine::*;
pub use rules::*;
