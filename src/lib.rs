//! Command-line front end for glyph comparison and classification.

pub mod cli;
pub mod decode;
pub mod error;
pub mod request;
pub mod run;
pub mod settings;
pub mod telemetry;

pub use error::AppError;
