pub mod catalog;
pub mod description;
pub mod impact_factor;

mod error;

pub use catalog::ReferenceProduct;
pub use error::{Error, Result};
