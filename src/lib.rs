pub mod config;
pub mod domain;
pub mod infra;

pub use domain::{convert, convert_document, ConversionService};
