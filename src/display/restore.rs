//! Restore report formatting
//!
//! Renders a [`RestoreReport`] as a table with one row per source.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::restore::{EntryStatus, RestoreEntry, RestoreReport};

#[derive(Tabled)]
struct RestoreRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Policy Type")]
    collection: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
}

impl From<&RestoreEntry> for RestoreRow {
    fn from(entry: &RestoreEntry) -> Self {
        Self {
            source: entry.source.clone(),
            collection: entry
                .collection
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".into()),
            name: entry.name.clone().unwrap_or_else(|| "-".into()),
            outcome: format_status(&entry.status),
        }
    }
}

/// Short text for an entry status
pub fn format_status(status: &EntryStatus) -> String {
    match status {
        EntryStatus::Created {
            placeholder_password: true,
        } => "Created (placeholder password)".into(),
        EntryStatus::Created { .. } => "Created".into(),
        EntryStatus::Updated => "Updated".into(),
        EntryStatus::Skipped(reason) => format!("Skipped: {}", reason),
        EntryStatus::Failed(message) => format!("Failed: {}", message),
    }
}

/// Format the per-source table followed by the totals line
pub fn format_restore_report(report: &RestoreReport) -> String {
    if report.entries.is_empty() {
        return "No policies were found to restore.".to_string();
    }

    let rows: Vec<RestoreRow> = report.entries.iter().map(RestoreRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());

    format!("{}\n\n{}", table, report.summary())
}

/// Reminder listing credentials that still carry the placeholder password
pub fn format_password_reminder(report: &RestoreReport) -> Option<String> {
    let credentials = report.credentials_needing_password();
    if credentials.is_empty() {
        return None;
    }

    let mut output = String::from(
        "The following credentials were created with a placeholder password.\n\
         Update their passwords on the target before using them:\n",
    );
    for entry in credentials {
        output.push_str(&format!(
            "  - {}\n",
            entry.name.as_deref().unwrap_or(&entry.source)
        ));
    }
    Some(output)
}
