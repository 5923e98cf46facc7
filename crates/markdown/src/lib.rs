//! Markdown rendering of dependency policy violation reports.
//!
//! [`render_report`] turns component reports into a headline plus a table
//! whose layout is chosen by [`ReportFormat`]. Rows are rendered through
//! [`format_rows`], which never drops a component: one that cannot be
//! rendered becomes a blank row of the right width.

mod format;
mod report;
mod row;

pub use format::{ReportFormat, UnknownFormat};
pub use report::{
    LINE_SEPARATOR, NO_VIOLATIONS_MESSAGE, build_report, render_report, violation_headline,
};
pub use row::{RowError, RowOutcome, TableRow, format_row, format_rows};
