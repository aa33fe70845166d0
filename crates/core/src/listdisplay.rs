//! Laying out a list of items for display.

use itertools::Itertools;

use crate::error::Result;
use crate::strformat::{fmt, Args};
use crate::text::real_len;

/// How the items of a list flow onto the screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Flow {
    /// One item per line.
    #[default]
    Rows,
    /// A single sentence, e.g. `a, b, or c`.
    Inline { first_sep: String, final_sep: String },
    /// Columns filled top to bottom. `None` fits as many columns as the width allows.
    ColumnsDown(Option<usize>),
    /// Columns filled left to right.
    ColumnsAcross(Option<usize>),
}

impl Flow {
    /// Inline with the default `", "` and `" or "` separators.
    pub fn inline() -> Self {
        Flow::Inline {
            first_sep: ", ".to_string(),
            final_sep: " or ".to_string(),
        }
    }
}

/// Joins items into a sentence, using an Oxford comma when there are more than two.
///
/// ```
/// use promptline_core::listdisplay::inline_simple;
///
/// assert_eq!(inline_simple(&["a", "b", "c"], ", ", " or "), "a, b, or c");
/// assert_eq!(inline_simple(&["a", "b"], ", ", " or "), "a or b");
/// ```
pub fn inline_simple<S: AsRef<str>>(items: &[S], first_sep: &str, final_sep: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{}{final_sep}{}", first.as_ref(), second.as_ref()),
        [init @ .., last] => format!(
            "{}{}{final_sep}{}",
            init.iter().map(AsRef::<str>::as_ref).join(first_sep),
            first_sep.trim(),
            last.as_ref()
        ),
    }
}

/// Lays out `items` according to `flow`, fitting columns into `wrap_at` columns.
pub fn layout<S: AsRef<str>>(items: &[S], flow: &Flow, wrap_at: usize) -> Result<String> {
    if items.is_empty() {
        return Ok(String::new());
    }

    Ok(match flow {
        Flow::Rows => items.iter().map(AsRef::<str>::as_ref).join("\n"),
        Flow::Inline {
            first_sep,
            final_sep,
        } => inline_simple(items, first_sep, final_sep),
        Flow::ColumnsDown(columns) => {
            let (cells, rows, _) = pad_cells(items, *columns, wrap_at)?;
            (0..rows)
                .map(|row| cells.iter().skip(row).step_by(rows).join("  "))
                .join("\n")
        }
        Flow::ColumnsAcross(columns) => {
            let (cells, _, columns) = pad_cells(items, *columns, wrap_at)?;
            cells
                .chunks(columns)
                .map(|line| line.join("  "))
                .join("\n")
        }
    })
}

/// Pads every item to the width of the longest, returning the cells and the grid shape.
fn pad_cells<S: AsRef<str>>(
    items: &[S],
    columns: Option<usize>,
    wrap_at: usize,
) -> Result<(Vec<String>, usize, usize)> {
    let longest = items
        .iter()
        .map(|item| real_len(item.as_ref()))
        .max()
        .unwrap_or(0);
    let columns = columns
        .unwrap_or((wrap_at + 2) / (longest + 2))
        .max(1);

    let cells = items
        .iter()
        .map(|item| {
            let item = item.as_ref();
            let width = item.chars().count() + longest - real_len(item);
            fmt("{1:<{0}}", &Args::new().arg(width).arg(item))
        })
        .collect::<Result<Vec<_>>>()?;

    let rows = cells.len().div_ceil(columns);
    Ok((cells, rows, columns))
}
