use super::Formatter;
use crate::batch::GroupResult;

/// One JSON object per line
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, group: &GroupResult) -> String {
        serde_json::to_string(group).unwrap_or_else(|e| {
            log::error!("Failed to serialize group {}: {}", group.label, e);
            String::from("null")
        })
    }
}
