mod user;
mod aquarium;
mod fish;
mod friendship;

pub use user::*;
pub use aquarium::*;
pub use fish::*;
pub use friendship::*;
