#![forbid(unsafe_code)]

mod document;
mod engine;
mod error;
mod path;
mod store;

pub use document::*;
pub use engine::*;
pub use error::*;
pub use path::*;
pub use store::*;
