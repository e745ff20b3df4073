//! Boundary with presentation layers: request payloads and output formats

pub mod formatter;
pub mod payload;

pub use formatter::{
    CsvFormatter, FormatterFactory, JsonFormatter, OutputFormat, ResultFormatter, TableFormatter,
    default_file_name,
};
pub use payload::{SuggestionPayload, error_response, parse_request};
