pub mod assets;
pub(crate) mod common;

pub mod hw;

pub mod assembler;

pub mod cli;
