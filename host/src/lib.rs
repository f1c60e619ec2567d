pub mod batch;
pub mod config;
pub mod error;
pub mod runner;
pub mod script;
pub mod tape;
pub mod verify;

pub use error::TapeError;
