use super::{Formatter, fmt_opt};
use crate::batch::GroupResult;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, group: &GroupResult) -> String {
        let mut lines = Vec::new();

        let reference = fmt_opt(group.reference_deg, 1, "-");
        match &group.statistics {
            Some(stats) => lines.push(format!(
                "{:<16} ref: {:>6}°  mean: {:>6.1}°  std: {:>5.2}°  range: {:>6.1}°..{:<6.1}°  err: {:>6}°  n: {} ({} failed)",
                group.label,
                reference,
                stats.mean_deg,
                stats.std_dev_deg,
                stats.min_deg,
                stats.max_deg,
                fmt_opt(stats.mean_error_deg, 1, "-"),
                stats.count,
                group.failures()
            )),
            None => lines.push(format!(
                "{:<16} ref: {:>6}°  no estimates ({} failed)",
                group.label,
                reference,
                group.failures()
            )),
        }

        if self.verbose {
            for file in &group.files {
                if let Some(ref err) = file.error {
                    lines.push(format!("  {:<40} ERROR: {}", file.filename(), err));
                    continue;
                }
                let delays = file
                    .delays
                    .map(|d| format!("[d21 {:>7.1}, d31 {:>7.1}, d32 {:>7.1}]", d.d21, d.d31, d.d32))
                    .unwrap_or_default();
                lines.push(format!(
                    "  {:<40} {:>6}° {}",
                    file.filename(),
                    fmt_opt(file.angle_deg, 1, "-"),
                    delays
                ));
            }
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_summary_line() {
        let text = TextFormatter::new(false).format(&fixtures::group());
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("120deg"));
        assert!(text.contains("mean:  120.0°"));
        assert!(text.contains("(1 failed)"));
    }

    #[test]
    fn test_verbose_lists_files() {
        let text = TextFormatter::new(true).format(&fixtures::group());
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("120_2.bin"));
        assert!(text.contains("ERROR: malformed recording"));
    }
}
