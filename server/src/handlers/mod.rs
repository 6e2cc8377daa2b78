//! Request handlers for snapshot operations.

mod export;
mod import;

pub use export::*;
pub use import::*;
