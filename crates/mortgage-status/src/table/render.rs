use super::Table;
use std::fmt;

const MAX_CELL_WIDTH: usize = 32;

/// Fixed-width grid with a header row and a `shape` footer.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<String> = self.schema().names().map(truncate).collect();
        let cells: Vec<Vec<String>> = self
            .rows()
            .iter()
            .map(|row| row.iter().map(|value| truncate(&value.to_string())).collect())
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(f, &headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        write_line(f, &rule, &widths)?;
        for row in &cells {
            write_line(f, row, &widths)?;
        }
        write!(f, "shape: ({}, {})", self.len(), self.schema().len())
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    writeln!(f, "| {} |", padded.join(" | "))
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        text.to_string()
    } else {
        let mut shortened: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        shortened.push('…');
        shortened
    }
}
