mod macros;
mod errors;
mod clock;
pub mod decay;
pub mod primitives;
pub mod objects;

pub use errors::*;
pub use clock::*;
pub use decay::Intervals;
pub use primitives::*;
pub use objects::*;
