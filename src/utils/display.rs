use colored::Colorize;
use prettytable::{Table, Row, Cell, format};
use std::time::Duration;

use crate::models::cache::Verdict;

pub struct DisplayFormatter;

impl DisplayFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_header(&self, text: &str) -> String {
        format!("\n=== {} ===", text.bright_white().bold())
    }

    pub fn format_verdict(&self, id: &str, verdict: Verdict) -> String {
        match verdict {
            Verdict::Flagged => format!("{} is {}", id, "FLAGGED".red().bold()),
            Verdict::Clear => format!("{} is {}", id, "clear".green()),
            Verdict::Unknown => {
                format!("{} is {} (denylist not loaded yet)", id, "unknown".yellow())
            }
        }
    }

    pub fn format_flagged_table(&self, ids: &[String]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);

        table.add_row(Row::new(vec![Cell::new("Identifier").style_spec("b")]));
        for id in ids {
            table.add_row(Row::new(vec![Cell::new(id)]));
        }

        table.to_string()
    }

    pub fn format_age(&self, age: Duration) -> String {
        let secs = age.as_secs();
        if secs >= 60 {
            format!("refreshed {}m {}s ago", secs / 60, secs % 60)
        } else {
            format!("refreshed {}s ago", secs)
        }
    }
}
