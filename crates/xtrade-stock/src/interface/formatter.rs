//! Result formatting for terminals and files

use crate::domain::{MetricField, Metrics, Outcome, SuggestionResult, SymbolRecord};
use crate::error::{Result, StockError};
use crate::market::Market;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use std::fmt;
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    /// File extension for saved output
    pub fn extension(self) -> &'static str {
        match self {
            Self::Table => "txt",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

pub trait ResultFormatter: Send + Sync {
    fn format(&self) -> OutputFormat;
    fn render(&self, result: &SuggestionResult) -> Result<String>;
    fn render_error(&self, error: &str) -> String;
}

/// Human readable table showing the columns that matter for the mode
pub struct TableFormatter;

impl ResultFormatter for TableFormatter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Table
    }

    fn render(&self, result: &SuggestionResult) -> Result<String> {
        if result.is_empty() {
            let supported: Vec<&str> = Market::ALL.iter().map(|m| m.name()).collect();
            return Ok(format!(
                "No suggestions for market '{}'. Supported markets: {}",
                result.market,
                supported.join(", ")
            ));
        }

        let fields = result.analysis_mode.fields();

        let mut header = vec![Cell::new("#"), Cell::new("Symbol")];
        header.extend(fields.iter().map(|f| Cell::new(f.header())));
        header.push(Cell::new("Source"));

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(header);

        for (index, record) in result.records.iter().enumerate() {
            let mut row = vec![Cell::new(index + 1), Cell::new(record.symbol())];
            match record.outcome() {
                Outcome::Metrics(metrics) => {
                    row.extend(fields.iter().map(|&f| {
                        Cell::new(format_value(metrics, f)).set_alignment(CellAlignment::Right)
                    }));
                    row.push(Cell::new(metrics.origin()));
                }
                Outcome::Error(error) => {
                    row.extend(fields.iter().map(|_| Cell::new("-")));
                    row.push(Cell::new(format!("error: {error}")));
                }
            }
            table.add_row(row);
        }

        let mut output = format!(
            "Top {} {} picks for {} ({}) - ranked by {}\n{table}",
            result.len(),
            result.analysis_mode,
            result.market,
            result.exchange.unwrap_or("-"),
            result.ranked_by.as_str(),
        );

        if result
            .records
            .iter()
            .filter_map(SymbolRecord::metrics)
            .any(|m| !m.origin().is_live())
        {
            output.push_str("\nNote: synthetic values are placeholders, not market data.");
        }
        Ok(output)
    }

    fn render_error(&self, error: &str) -> String {
        format!("❌ Error: {error}")
    }
}

/// Pretty-printed response payload
pub struct JsonFormatter;

impl ResultFormatter for JsonFormatter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn render(&self, result: &SuggestionResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }

    fn render_error(&self, error: &str) -> String {
        serde_json::json!({ "error": error, "stocks": [] }).to_string()
    }
}

/// One row per record with every metric column
pub struct CsvFormatter;

const CSV_HEADERS: [&str; 9] = [
    "Symbol", "Exchange", "Price", "Volume", "PE Ratio", "50DMA", "200DMA", "Source", "Error",
];

impl ResultFormatter for CsvFormatter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn render(&self, result: &SuggestionResult) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADERS)?;

        let exchange = result.exchange.unwrap_or_default();
        for record in &result.records {
            let mut row = vec![record.symbol().to_string(), exchange.to_string()];
            match record.outcome() {
                Outcome::Metrics(metrics) => {
                    row.extend(MetricField::ALL.iter().map(|&f| format_value(metrics, f)));
                    row.push(metrics.origin().to_string());
                    row.push(String::new());
                }
                Outcome::Error(error) => {
                    row.extend(std::iter::repeat_n(String::new(), MetricField::ALL.len() + 1));
                    row.push(error.clone());
                }
            }
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| StockError::Other(format!("CSV error: {e}")))?;
        String::from_utf8(bytes).map_err(|e| StockError::Other(format!("CSV error: {e}")))
    }

    fn render_error(&self, error: &str) -> String {
        format!("Error\n\"{}\"\n", error.replace('"', "\"\""))
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(format: OutputFormat) -> Box<dyn ResultFormatter> {
        match format {
            OutputFormat::Table => Box::new(TableFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Csv => Box::new(CsvFormatter),
        }
    }
}

/// Default file name when saving results for a market
pub fn default_file_name(market: &str, format: OutputFormat) -> String {
    let slug: String = market
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("suggested_stocks_{slug}.{}", format.extension())
}

fn format_value(metrics: &Metrics, field: MetricField) -> String {
    match field {
        MetricField::Volume => metrics.volume().to_string(),
        other => format!("{:.2}", metrics.value(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisMode, MetricOrigin, RankedBy, SuggestionRequest};
    use chrono::Utc;
    use uuid::Uuid;

    fn result(mode: AnalysisMode, origin: MetricOrigin) -> SuggestionResult {
        SuggestionResult {
            request_id: Uuid::new_v4(),
            market: "India".to_string(),
            exchange: Some("NSE"),
            analysis_mode: mode,
            ranked_by: RankedBy::Registry,
            generated_at: Utc::now(),
            records: vec![
                SymbolRecord::with_metrics(
                    "RELIANCE",
                    Metrics::new(2901.456, 5_200_000, 27.1, 2850.0, 2700.25, origin).unwrap(),
                ),
                SymbolRecord::with_error("TCS", "yahoo error: HTTP 503"),
            ],
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_table_columns_follow_mode() {
        let table = TableFormatter
            .render(&result(AnalysisMode::Fundamental, MetricOrigin::Yahoo))
            .unwrap();
        assert!(table.contains("PE Ratio"));
        assert!(!table.contains("50DMA"));
        assert!(table.contains("2901.46"));
        assert!(table.contains("error: yahoo error: HTTP 503"));
        assert!(!table.contains("synthetic values"));

        let table = TableFormatter
            .render(&result(AnalysisMode::Technical, MetricOrigin::Synthetic))
            .unwrap();
        assert!(table.contains("200DMA"));
        assert!(!table.contains("PE Ratio"));
        assert!(table.contains("synthetic values are placeholders"));
    }

    #[test]
    fn test_table_empty_result() {
        let empty = SuggestionResult::empty(&SuggestionRequest::new("Mars", AnalysisMode::Both, 5));
        let text = TableFormatter.render(&empty).unwrap();
        assert!(text.contains("No suggestions for market 'Mars'"));
        assert!(text.contains("India, USA, Australia"));
    }

    #[test]
    fn test_csv_rows() {
        let csv = CsvFormatter
            .render(&result(AnalysisMode::Technical, MetricOrigin::Yahoo))
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Symbol,Exchange,Price,Volume,PE Ratio,50DMA,200DMA,Source,Error"
        );
        assert_eq!(
            lines[1],
            "RELIANCE,NSE,2901.46,5200000,27.10,2850.00,2700.25,Yahoo Finance,"
        );
        assert_eq!(lines[2], "TCS,NSE,,,,,,,yahoo error: HTTP 503");
    }

    #[test]
    fn test_csv_exchange_blank_without_market() {
        let mut result = result(AnalysisMode::Both, MetricOrigin::Yahoo);
        result.exchange = None;
        let csv = CsvFormatter.render(&result).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("RELIANCE,,2901.46,"));
    }

    #[test]
    fn test_json_shape() {
        let text = JsonFormatter
            .render(&result(AnalysisMode::Both, MetricOrigin::Yahoo))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["stocks"][0]["Symbol"], "RELIANCE");
        assert!(value["stocks"][1]["Price"].is_null());
        assert_eq!(value["exchange"], "NSE");
    }

    #[test]
    fn test_factory_and_file_names() {
        assert_eq!(FormatterFactory::create(OutputFormat::Csv).format(), OutputFormat::Csv);
        assert_eq!(
            default_file_name("India", OutputFormat::Csv),
            "suggested_stocks_india.csv"
        );
        assert_eq!(
            default_file_name("New Zealand", OutputFormat::Json),
            "suggested_stocks_new_zealand.json"
        );
    }

    #[test]
    fn test_render_error() {
        assert_eq!(TableFormatter.render_error("boom"), "❌ Error: boom");
        assert!(JsonFormatter.render_error("boom").contains("\"error\":\"boom\""));
    }
}
