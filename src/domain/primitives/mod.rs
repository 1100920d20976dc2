mod id;
mod dimension;

pub use id::*;
pub use dimension::*;
