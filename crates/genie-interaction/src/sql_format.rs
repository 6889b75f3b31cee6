//! SQL pretty-printing for the query panel.

use sqlformat::{FormatOptions, Indent, QueryParams};

/// Reformats SQL with upper-case keywords and two-space indentation.
pub fn format_sql(sql: &str) -> String {
    let options = FormatOptions {
        indent: Indent::Spaces(2),
        uppercase: true,
        lines_between_queries: 1,
    };
    sqlformat::format(sql, &QueryParams::None, options)
}
