mod error;
mod id;
mod ingredient;

pub use error::*;
pub use id::*;
pub use ingredient::*;
