//! IngrediCheck scan client host: bootstrap and command line interface.

pub mod bootstrap;
pub mod cli;
