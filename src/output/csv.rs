use super::{Formatter, fmt_opt};
use crate::batch::GroupResult;

/// One row per group, or one row per file when verbose
pub struct CsvFormatter {
    per_file: bool,
}

impl CsvFormatter {
    pub fn new(per_file: bool) -> Self {
        Self { per_file }
    }
}

impl Formatter for CsvFormatter {
    fn format(&self, group: &GroupResult) -> String {
        let reference = fmt_opt(group.reference_deg, 2, "");

        if self.per_file {
            return group
                .files
                .iter()
                .map(|file| {
                    let (d21, d31, d32) = file
                        .delays
                        .map(|d| {
                            (
                                format!("{:.2}", d.d21),
                                format!("{:.2}", d.d31),
                                format!("{:.2}", d.d32),
                            )
                        })
                        .unwrap_or_default();
                    format!(
                        "{},{},{},{},{},{},{},{}",
                        group.label,
                        reference,
                        file.path.display(),
                        fmt_opt(file.angle_deg, 2, ""),
                        d21,
                        d31,
                        d32,
                        file.error.as_deref().unwrap_or("").replace(',', ";")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
        }

        let stats = group.statistics.as_ref();
        format!(
            "{},{},{},{},{},{},{},{},{}",
            group.label,
            reference,
            stats.map_or(0, |s| s.count),
            group.failures(),
            fmt_opt(stats.map(|s| s.mean_deg), 2, ""),
            fmt_opt(stats.map(|s| s.std_dev_deg), 3, ""),
            fmt_opt(stats.map(|s| s.min_deg), 2, ""),
            fmt_opt(stats.map(|s| s.max_deg), 2, ""),
            fmt_opt(stats.and_then(|s| s.mean_error_deg), 2, "")
        )
    }

    fn header(&self) -> Option<String> {
        Some(if self.per_file {
            "label,reference_deg,file,angle_deg,d21,d31,d32,error".to_string()
        } else {
            "label,reference_deg,count,failed,mean_deg,std_dev_deg,min_deg,max_deg,mean_error_deg"
                .to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_group_row() {
        let row = CsvFormatter::new(false).format(&fixtures::group());
        assert_eq!(row, "120deg,120.00,2,1,120.00,1.414,119.00,121.00,0.00");
    }

    #[test]
    fn test_file_rows() {
        let rows = CsvFormatter::new(true).format(&fixtures::group());
        let rows: Vec<&str> = rows.lines().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], "120deg,120.00,data/120_1.bin,119.00,80.00,160.00,80.00,");
        assert!(rows[2].ends_with(",,,,malformed recording: 3 bytes"));
    }

    #[test]
    fn test_header_matches_columns() {
        let f = CsvFormatter::new(false);
        let header = f.header().unwrap();
        let row = f.format(&fixtures::group());
        assert_eq!(header.split(',').count(), row.split(',').count());
    }
}
