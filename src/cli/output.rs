//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{FieldKind, Record};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of records (Id, Name, Login, Modified).
pub fn print_records_table(records: &[&Record]) {
    if records.is_empty() {
        info("No records to show.");
        tip("Run `pwm add login Name=...` to add your first record.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Login", "Modified"]);

    for r in records {
        table.add_row(vec![
            r.id().to_string(),
            r.name().to_string(),
            r.get("Login").unwrap_or_default().to_string(),
            r.modified_at().format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print one record as a key/value table, masking secret fields unless
/// `reveal` is set.
pub fn print_record(record: &Record, reveal: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    let rows: Vec<(&str, &str)> = if reveal {
        record
            .ordered_keys()
            .into_iter()
            .map(|k| (k, record.get(k).unwrap_or_default()))
            .collect()
    } else {
        record.redacted_fields()
    };

    for (key, value) in rows {
        let key_cell = match record.field_kind(key) {
            FieldKind::Secret => style(key).yellow().to_string(),
            FieldKind::Plain => key.to_string(),
        };
        table.add_row(vec![key_cell, value.to_string()]);
    }

    println!("{table}");
    for attachment in record.attachments() {
        tip(&format!("attachment: {attachment}"));
    }
}
