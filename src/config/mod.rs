//! Configuration for the alumni directory service.

mod settings;

pub use settings::*;
