mod csv;
mod json;
mod text;

use crate::batch::GroupResult;

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::TextFormatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Json,
}

pub trait Formatter: Send {
    /// Lines for one group, without a trailing newline
    fn format(&self, group: &GroupResult) -> String;

    fn header(&self) -> Option<String> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Csv => Box::new(CsvFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Render a full report: header, then one block per group
pub fn render(formatter: &dyn Formatter, groups: &[GroupResult]) -> String {
    let mut out = String::new();
    if let Some(header) = formatter.header() {
        out.push_str(&header);
        out.push('\n');
    }
    for group in groups {
        out.push_str(&formatter.format(group));
        out.push('\n');
    }
    out
}

fn fmt_opt(value: Option<f64>, precision: usize, missing: &str) -> String {
    value.map_or_else(|| missing.to_string(), |v| format!("{:.*}", precision, v))
}
