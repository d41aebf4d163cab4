use crate::error::ParseError;
use crate::models::{Column, TableNode, TableStyle};
use crate::parsing::DraftParser;
use crate::parsing::lines::{Line, Paragraph};

use super::classify::is_border_row;

/// Derives column offsets from a border row.
///
/// With `+` corners each column is the run between two corners; otherwise
/// each run of border characters is one column.
pub fn columns_from_border(border: &str) -> Vec<Column> {
    let chars: Vec<char> = border.trim_end().chars().collect();
    let mut columns = vec![];
    if chars.contains(&'+') {
        let corners: Vec<usize> = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == '+')
            .map(|(i, _)| i)
            .collect();
        for w in corners.windows(2) {
            if w[1] > w[0] + 1 {
                columns.push(Column {
                    start: w[0] + 1,
                    width: w[1] - w[0] - 1,
                });
            }
        }
    } else {
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == ' ' {
                i += 1;
                continue;
            }
            let start = i;
            while i < chars.len() && chars[i] != ' ' {
                i += 1;
            }
            columns.push(Column {
                start,
                width: i - start,
            });
        }
    }
    columns
}

/// Cuts a row into trimmed cells at the column offsets.
pub fn slice_cells(row: &str, columns: &[Column]) -> Vec<String> {
    let chars: Vec<char> = row.chars().map(|c| if c == '|' { ' ' } else { c }).collect();
    columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let end = columns.get(i + 1).map_or(chars.len(), |next| next.start);
            let start = col.start.min(chars.len());
            let end = end.clamp(start, chars.len());
            chars[start..end].iter().collect::<String>().trim().to_string()
        })
        .collect()
}

/// Joins several physical rows column by column.
fn join_rows(rows: &[&Line], columns: &[Column]) -> Vec<String> {
    let mut cells = vec![String::new(); columns.len()];
    for row in rows {
        for (cell, piece) in cells.iter_mut().zip(slice_cells(&row.text, columns)) {
            if piece.is_empty() {
                continue;
            }
            if !cell.is_empty() {
                cell.push(' ');
            }
            cell.push_str(&piece);
        }
    }
    cells
}

/// Builds a table from a paragraph whose first line is a border row.
pub fn build_table(para: &Paragraph) -> Result<TableNode, ParseError> {
    let lines = para.lines();
    let top = para.first();
    if !is_border_row(&top.text) {
        return Err(ParseError::MissingTableBorder {
            line: top.line_no(),
        });
    }
    let style = if top.trimmed().starts_with('-') {
        TableStyle::Headers
    } else {
        TableStyle::Full
    };
    let columns = columns_from_border(&top.text);

    let second_border = lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, l)| is_border_row(&l.text))
        .map(|(i, _)| i);
    let (header_cells, body) = match second_border {
        Some(end) if end > 1 => {
            let header: Vec<&Line> = lines[1..end].iter().collect();
            (join_rows(&header, &columns), &lines[end + 1..])
        }
        _ => (vec![], &lines[1..]),
    };

    let interior = body
        .iter()
        .enumerate()
        .any(|(i, l)| is_border_row(&l.text) && i + 1 < body.len());
    let rows = if interior {
        body.split(|l| is_border_row(&l.text))
            .filter(|group| !group.is_empty())
            .map(|group| join_rows(&group.iter().collect::<Vec<_>>(), &columns))
            .collect()
    } else {
        body.iter()
            .filter(|l| !is_border_row(&l.text))
            .map(|l| slice_cells(&l.text, &columns))
            .collect()
    };

    Ok(TableNode {
        style,
        columns,
        header_cells,
        rows,
        caption: None,
        anchor: None,
    })
}

impl DraftParser<'_> {
    /// Consumes a table paragraph and its `Table N:` caption, if any.
    pub(crate) fn collect_table(&mut self) -> Result<TableNode, ParseError> {
        let para = self
            .stream
            .collect_paragraph()
            .ok_or(ParseError::UnexpectedEof("table"))?;
        let mut table = build_table(&para)?;
        if let Some((anchor, caption)) = self.take_caption("Table") {
            table.anchor = Some(anchor);
            table.caption = caption;
        }
        Ok(table)
    }
}
