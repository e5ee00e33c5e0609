//! Column-aligned text tables.
//!
//! A [`Table`] is the rendered form of a report: one header row plus data
//! rows, each a list of cells. [`Table::render`] pads every column but the
//! last to its widest cell and joins the columns with a separator.

/// Separator used between process listing columns.
pub const PROCESS_SEPARATOR: &str = " | ";
/// Separator used between container listing columns.
pub const CONTAINER_SEPARATOR: &str = "   ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Formats the table, header first, one row per line.
    ///
    /// Rows are never truncated; the output grows to fit the widest cell.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fleetps::render::Table;
    /// let mut table = Table::new(["NODE", "PID"]);
    /// table.push_row(vec!["node-1".to_owned(), "1".to_owned()]);
    /// assert_eq!(table.render(" | "), "NODE   | PID\nnode-1 | 1");
    /// ```
    pub fn render(&self, separator: &str) -> String {
        let widths = self.column_widths();
        let mut out = String::new();

        for (i, row) in std::iter::once(&self.header).chain(&self.rows).enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let last = row.len().saturating_sub(1);
            for (column, cell) in row.iter().enumerate() {
                if column > 0 {
                    out.push_str(separator);
                }
                if column == last {
                    out.push_str(cell);
                } else {
                    let width = widths[column];
                    out.push_str(&format!("{cell:<width$}"));
                }
            }
        }

        out
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::with_capacity(self.header.len());
        for row in std::iter::once(&self.header).chain(&self.rows) {
            for (column, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(column) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}
