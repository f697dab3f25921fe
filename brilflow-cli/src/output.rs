//! Side-channel output for `--summary`.
//!
//! Stdout carries only the analysis report, so that it can be piped into another tool or
//! diffed against a golden file. Everything here writes to stderr.

use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Writes the summary rows to stderr: pretty JSON under `--json`, otherwise whatever
/// `render` prints.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    render: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if opts.json {
        eprintln!("{}", serde_json::to_string_pretty(data)?);
    } else {
        render(data);
    }
    Ok(())
}

#[derive(Clone, Copy)]
pub enum Align {
    Left,
    Right,
}

/// The per-function summary table: no borders, numbers right-aligned, one space between
/// columns and none at the edges.
pub struct TabWriter {
    table: Table,
}

impl TabWriter {
    pub fn new(columns: &[(&str, Align)]) -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(columns.iter().map(|(name, _)| *name));

        let last = columns.len().saturating_sub(1);
        for (i, (_, align)) in columns.iter().enumerate() {
            let Some(column) = table.column_mut(i) else {
                continue;
            };
            column.set_cell_alignment(match align {
                Align::Left => CellAlignment::Left,
                Align::Right => CellAlignment::Right,
            });
            column.set_padding((u16::from(i != 0), u16::from(i != last)));
        }

        Self { table }
    }

    pub fn row(&mut self, values: Vec<String>) {
        self.table.add_row(values);
    }

    /// Prints the table to stderr with trailing whitespace stripped from every line.
    pub fn print(&self) {
        for line in self.table.to_string().lines() {
            eprintln!("{}", line.trim_end());
        }
    }

    #[cfg(test)]
    fn render(&self) -> Vec<String> {
        self.table
            .to_string()
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }
}
