pub mod data;
pub mod enums;

pub use data::*;
pub use enums::*;
