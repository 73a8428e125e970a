//! Box-drawing console table for window reports, shown in debug mode.

use super::report::WindowReport;
use std::fmt::Write;
use std::time::Duration;

const INNER_WIDTH: usize = 57;
const VALUE_WIDTH: usize = 39;

/// Render a report as a fixed-width table.
///
/// Values are listed in the report's own order (sorted) and truncated with
/// an ellipsis when they would overflow their column.
pub fn render_table(report: &WindowReport) -> String {
    let border = "═".repeat(INNER_WIDTH + 2);
    let mut out = String::new();

    let _ = writeln!(out, "╔{}╗", border);
    let _ = writeln!(out, "║ {:^INNER_WIDTH$} ║", "Log Attribute Counts Report");
    let _ = writeln!(out, "╠{}╣", border);
    let _ = writeln!(out, "║ {:<INNER_WIDTH$} ║", format!("Window #{}", report.sequence));
    let _ = writeln!(
        out,
        "║ {:<INNER_WIDTH$} ║",
        format!("Time Range: {}", report.time_range())
    );
    let _ = writeln!(
        out,
        "║ {:<INNER_WIDTH$} ║",
        format!("Duration: {:?}", round_to_millis(report.duration()))
    );
    let _ = writeln!(
        out,
        "║ {:<INNER_WIDTH$} ║",
        format!("Total Entries: {}", report.total_entries)
    );
    let _ = writeln!(
        out,
        "║ {:<INNER_WIDTH$} ║",
        format!("Distinct Values: {}", report.distinct_values())
    );
    let _ = writeln!(out, "╠{}╣", border);
    let _ = writeln!(out, "║ {:<INNER_WIDTH$} ║", "Attribute Value Counts:");
    let _ = writeln!(out, "╠{}╣", border);

    for (value, value_count) in &report.counts {
        let row = format!(
            "{:<VALUE_WIDTH$} {:>8} ({:>5.1}%)",
            truncate_value(value, VALUE_WIDTH),
            value_count.count,
            value_count.percentage
        );
        let _ = writeln!(out, "║ {:<INNER_WIDTH$} ║", row);
    }

    let _ = write!(out, "╚{}╝", border);
    out
}

fn round_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis() as u64)
}

/// Shorten to at most `max` characters, ellipsis included.
fn truncate_value(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::clock::WindowTimestamp;

    fn sample_report() -> WindowReport {
        WindowReport::from_counts(
            3,
            WindowTimestamp::from_millis(10_000),
            WindowTimestamp::from_millis(20_000),
            vec![
                ("checkout".to_string(), 75u64),
                ("payments".to_string(), 25u64),
            ],
        )
    }

    #[test]
    fn test_rows_have_uniform_width() {
        let table = render_table(&sample_report());
        let widths: Vec<usize> = table.lines().map(|l| l.chars().count()).collect();
        assert!(!widths.is_empty());
        assert!(
            widths.iter().all(|w| *w == widths[0]),
            "all rows should be {} chars, got {:?}",
            widths[0],
            widths
        );
    }

    #[test]
    fn test_contains_header_and_counts() {
        let table = render_table(&sample_report());
        assert!(table.contains("Log Attribute Counts Report"));
        assert!(table.contains("Window #3"));
        assert!(table.contains("Time Range: 00:00:10 - 00:00:20"));
        assert!(table.contains("Total Entries: 100"));
        assert!(table.contains("Distinct Values: 2"));
        assert!(table.contains("checkout"));
        assert!(table.contains("75.0%"));
    }

    #[test]
    fn test_values_listed_in_sorted_order() {
        let table = render_table(&sample_report());
        let checkout = table.find("checkout").unwrap();
        let payments = table.find("payments").unwrap();
        assert!(checkout < payments);
    }

    #[test]
    fn test_long_value_truncated() {
        let long = "v".repeat(80);
        let report = WindowReport::from_counts(
            1,
            WindowTimestamp::from_millis(0),
            WindowTimestamp::from_millis(1000),
            vec![(long, 1u64)],
        );
        let table = render_table(&report);
        assert!(table.contains(&format!("{}...", "v".repeat(36))));
        assert!(!table.contains(&"v".repeat(40)));
    }

    #[test]
    fn test_truncate_value() {
        assert_eq!(truncate_value("short", 10), "short");
        assert_eq!(truncate_value("exactly-10", 10), "exactly-10");
        assert_eq!(truncate_value("longer-than-ten", 10), "longer-...");
    }
}
