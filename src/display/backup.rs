//! Backup report formatting

use crate::backup::BackupReport;

/// Format documents written per collection and the skipped collections
pub fn format_backup_report(report: &BackupReport) -> String {
    let width = report
        .collections
        .iter()
        .map(|c| c.collection.as_str().len())
        .max()
        .unwrap_or(11)
        .max(11);

    let mut output = String::new();
    output.push_str(&format!("{:<width$}  {:>9}\n", "Policy Type", "Documents", width = width));
    output.push_str(&format!("{:-<width$}  {:->9}\n", "", "", width = width));
    for entry in &report.collections {
        output.push_str(&format!(
            "{:<width$}  {:>9}\n",
            entry.collection.as_str(),
            entry.written,
            width = width
        ));
    }
    output.push_str(&format!("{:-<width$}  {:->9}\n", "", "", width = width));
    output.push_str(&format!(
        "{:<width$}  {:>9}\n",
        "Total",
        report.total_written(),
        width = width
    ));

    if !report.skipped.is_empty() {
        let skipped: Vec<&str> = report.skipped.iter().map(|c| c.as_str()).collect();
        output.push('\n');
        output.push_str(&format!(
            "Not available on source (skipped): {}\n",
            skipped.join(", ")
        ));
    }

    output
}
