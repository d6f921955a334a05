pub mod conductor;
pub mod listing;
pub mod model;
pub mod phases;
pub mod program;

pub use conductor::{assemble, parse, Error};
pub use phases::types::ErrorKind;
pub use program::Program;
