pub mod alert_id;
pub mod ancestry;
pub mod fields;
pub mod hit;
pub mod ignore;
pub mod merge;
pub mod rule;

mod error;

pub use error::{Error, Result};
