pub mod error;
pub mod types;

pub use error::SchemError;
pub use types::{Dimensions, Result};
