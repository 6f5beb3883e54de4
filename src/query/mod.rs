pub mod executor;
pub mod table;

pub use executor::{execute, Query};
pub use table::{Table, Value};
