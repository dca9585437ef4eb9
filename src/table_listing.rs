/// Table Listing Module
///
/// In-memory snapshot of a query result (column titles plus rows of nullable
/// text) and its rendering as a bordered, fixed-width text table.

use crate::core::{MiniQueryError, Result};
use crate::text::{self, char_len};
use serde::Deserialize;
use std::fmt;

/// Horizontal alignment of a column's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Right,
}

/// Rendering options shared by every column of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingStyle {
    /// Wrap threshold in characters; 0 disables wrapping
    pub wrap_width: usize,
    /// Hard-break words longer than the threshold
    pub wrap_long_words: bool,
    /// Placeholder printed for SQL NULL
    pub null_marker: String,
    /// Draw a separator line between logical rows
    pub row_separators: bool,
}

impl Default for ListingStyle {
    fn default() -> Self {
        ListingStyle {
            wrap_width: 0,
            wrap_long_words: true,
            null_marker: "NULL".to_string(),
            row_separators: false,
        }
    }
}

/// A column of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub title: String,
    pub justification: Justification,
    /// Whether values of this column may be wrapped
    pub wrap: bool,
}

/// Builder for a `TableListing`.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    columns: Vec<Column>,
    style: ListingStyle,
}

impl Builder {
    /// Adds a left-justified, wrappable column.
    pub fn add_field(self, title: impl Into<String>) -> Self {
        self.add_field_with(title, Justification::Left, true)
    }

    pub fn add_field_with(
        mut self,
        title: impl Into<String>,
        justification: Justification,
        wrap: bool,
    ) -> Self {
        self.columns.push(Column {
            title: title.into(),
            justification,
            wrap,
        });
        self
    }

    pub fn style(mut self, style: ListingStyle) -> Self {
        self.style = style;
        self
    }

    pub fn wrap_width(mut self, width: usize) -> Self {
        self.style.wrap_width = width;
        self
    }

    pub fn wrap_long_words(mut self, enabled: bool) -> Self {
        self.style.wrap_long_words = enabled;
        self
    }

    pub fn null_marker(mut self, marker: impl Into<String>) -> Self {
        self.style.null_marker = marker.into();
        self
    }

    pub fn row_separators(mut self, enabled: bool) -> Self {
        self.style.row_separators = enabled;
        self
    }

    pub fn build(self) -> TableListing {
        TableListing {
            columns: self.columns,
            rows: Vec::new(),
            style: self.style,
        }
    }
}

/// Rows and columns of a query result, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableListing {
    columns: Vec<Column>,
    rows: Vec<Vec<Option<String>>>,
    style: ListingStyle,
}

impl TableListing {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Appends a row. The row must have exactly one value per column.
    pub fn add_row(&mut self, values: Vec<Option<String>>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(MiniQueryError::RowArity {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Renders the listing as a bordered text table, without a trailing newline.
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return "(no columns)".to_string();
        }

        let cells: Vec<Vec<Vec<String>>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.columns)
                    .map(|(value, column)| self.cell_lines(value.as_deref(), column))
                    .collect()
            })
            .collect();
        let titles: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|column| self.shape(&column.title, column))
            .collect();
        let widths = self.column_widths(&titles, &cells);

        let border = border_line(&widths);
        let mut lines = Vec::with_capacity(cells.len() + 4);
        lines.push(border.clone());
        self.push_block(&mut lines, &titles, &widths);
        lines.push(border.clone());

        for (index, row) in cells.iter().enumerate() {
            if index > 0 && self.style.row_separators {
                lines.push(border.clone());
            }
            self.push_block(&mut lines, row, &widths);
        }
        lines.push(border);

        lines.join("\n")
    }

    /// Splits a value into the physical lines it occupies in its column.
    fn cell_lines(&self, value: Option<&str>, column: &Column) -> Vec<String> {
        self.shape(value.unwrap_or(self.style.null_marker.as_str()), column)
    }

    /// Wraps `raw` at the threshold when the column allows it. Titles go
    /// through here too, so a wrapped column never grows past the threshold
    /// unless an unbreakable word is kept whole.
    fn shape(&self, raw: &str, column: &Column) -> Vec<String> {
        let threshold = self.style.wrap_width;
        let shaped = if column.wrap && threshold > 0 && char_len(raw) > threshold {
            text::wrap(raw, threshold, Some("\n"), self.style.wrap_long_words)
        } else {
            raw.to_string()
        };
        shaped.split('\n').map(str::to_string).collect()
    }

    /// Widest physical line of the title and every value, per column.
    fn column_widths(&self, titles: &[Vec<String>], cells: &[Vec<Vec<String>>]) -> Vec<usize> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                title
                    .iter()
                    .chain(cells.iter().flat_map(|row| row[i].iter()))
                    .map(|line| char_len(line))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Emits one logical row, as tall as its tallest cell.
    fn push_block(&self, lines: &mut Vec<String>, block: &[Vec<String>], widths: &[usize]) {
        let height = block.iter().map(Vec::len).max().unwrap_or(1);
        for line in 0..height {
            let parts: Vec<&str> = block
                .iter()
                .map(|cell| cell.get(line).map(String::as_str).unwrap_or(""))
                .collect();
            lines.push(self.physical_line(&parts, widths));
        }
    }

    fn physical_line(&self, parts: &[&str], widths: &[usize]) -> String {
        let mut line = String::from("|");
        for ((part, width), column) in parts.iter().zip(widths).zip(&self.columns) {
            let padded = match column.justification {
                Justification::Left => text::right_pad(part, *width),
                Justification::Right => text::left_pad(part, *width),
            };
            line.push(' ');
            line.push_str(&padded);
            line.push_str(" |");
        }
        line
    }
}

impl fmt::Display for TableListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn border_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&text::repeat("-", *width as i64 + 2));
        line.push('+');
    }
    line
}
