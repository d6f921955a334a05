pub mod types;

pub mod generate;
pub mod parse;
pub mod resolve;
pub mod tokenize;

pub use resolve::layout;
pub use tokenize::tokenize;
