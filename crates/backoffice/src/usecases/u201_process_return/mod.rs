pub mod executor;

pub use executor::{ProcessError, ProcessReturnExecutor};
