//! Splitting of SQL scripts into individually executable statements.
//!
//! The scanner walks the script once, tracking whether it is inside a quoted
//! literal, a quoted identifier, or a comment. Only a `;` seen at top level
//! ends a statement. Malformed input (an unterminated quote or block comment)
//! is never rejected: the remainder of the script simply stays in the current
//! statement.

pub const STATEMENT_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    index: usize,
    sql: String,
}

impl Statement {
    #[must_use]
    pub fn new(index: usize, sql: impl Into<String>) -> Self {
        Self {
            index,
            sql: sql.into(),
        }
    }

    /// 1-based position of the statement in its script.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn into_sql(self) -> String {
        self.sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    TopLevel,
    SingleQuote,
    DoubleQuote,
    LineComment,
    BlockComment,
}

/// Splits `source` into trimmed, non-empty statements in script order.
#[must_use]
pub fn split_statements(source: &str) -> Vec<Statement> {
    split_segments(source)
        .into_iter()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .enumerate()
        .map(|(position, sql)| Statement::new(position + 1, sql))
        .collect()
}

/// Returns the raw spans between top-level separators, untrimmed and including
/// empty spans. Joining the result with `;` reproduces `source` exactly.
#[must_use]
pub fn split_segments(source: &str) -> Vec<&str> {
    // Every byte the scanner reacts to is ASCII, so byte offsets at those
    // positions are always char boundaries.
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut mode = ScanMode::TopLevel;
    let mut segment_start = 0usize;
    let mut index = 0usize;

    while index < bytes.len() {
        let byte = bytes[index];
        let next = bytes.get(index + 1).copied();

        match mode {
            ScanMode::LineComment => {
                if byte == b'\n' {
                    mode = ScanMode::TopLevel;
                }
                index += 1;
            }
            ScanMode::BlockComment => {
                if byte == b'*' && next == Some(b'/') {
                    mode = ScanMode::TopLevel;
                    index += 2;
                } else {
                    index += 1;
                }
            }
            ScanMode::SingleQuote => {
                index += quoted_step(byte, next, b'\'', &mut mode);
            }
            ScanMode::DoubleQuote => {
                index += quoted_step(byte, next, b'"', &mut mode);
            }
            ScanMode::TopLevel => match (byte, next) {
                (b'-', Some(b'-')) => {
                    mode = ScanMode::LineComment;
                    index += 2;
                }
                (b'/', Some(b'*')) => {
                    mode = ScanMode::BlockComment;
                    index += 2;
                }
                (b'\'', _) => {
                    mode = ScanMode::SingleQuote;
                    index += 1;
                }
                (b'"', _) => {
                    mode = ScanMode::DoubleQuote;
                    index += 1;
                }
                (b';', _) => {
                    segments.push(&source[segment_start..index]);
                    index += 1;
                    segment_start = index;
                }
                _ => index += 1,
            },
        }
    }

    segments.push(&source[segment_start..]);
    segments
}

/// Trims a script and drops a single trailing `;` so it can be embedded as a
/// subquery.
#[must_use]
pub fn strip_trailing_terminator(sql: &str) -> &str {
    let trimmed = sql.trim();
    trimmed
        .strip_suffix(STATEMENT_SEPARATOR)
        .map_or(trimmed, str::trim_end)
}

fn quoted_step(byte: u8, next: Option<u8>, quote: u8, mode: &mut ScanMode) -> usize {
    if byte != quote {
        return 1;
    }
    if next == Some(quote) {
        // doubled quote is an escape, stay inside
        return 2;
    }
    *mode = ScanMode::TopLevel;
    1
}

#[cfg(test)]
mod tests {
    use super::{Statement, split_segments, split_statements, strip_trailing_terminator};

    fn sqls(source: &str) -> Vec<String> {
        split_statements(source)
            .into_iter()
            .map(Statement::into_sql)
            .collect()
    }

    #[test]
    fn splits_on_top_level_separators() {
        assert_eq!(sqls("SELECT 1; SELECT 2;"), vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn keeps_separator_inside_single_quotes() {
        assert_eq!(
            sqls("SELECT ';' AS x; SELECT 2;"),
            vec!["SELECT ';' AS x", "SELECT 2"]
        );
    }

    #[test]
    fn keeps_separator_inside_line_comment() {
        assert_eq!(
            sqls("SELECT 1 -- comment; with semicolon\n; SELECT 2;"),
            vec!["SELECT 1 -- comment; with semicolon", "SELECT 2"]
        );
    }

    #[test]
    fn keeps_separator_inside_block_comment() {
        assert_eq!(
            sqls("SELECT 1 /* block ; comment */; SELECT 2;"),
            vec!["SELECT 1 /* block ; comment */", "SELECT 2"]
        );
    }

    #[test]
    fn preserves_empty_string_literal() {
        assert_eq!(sqls("SELECT '' AS x;"), vec!["SELECT '' AS x"]);
    }

    #[test]
    fn drops_empty_spans_between_separators() {
        let statements = split_statements("  ;  ;  SELECT 1;");
        assert_eq!(statements, vec![Statement::new(1, "SELECT 1")]);
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert!(split_statements("").is_empty());
        assert!(split_statements(" \n\t ").is_empty());
    }

    #[test]
    fn source_without_separator_is_one_trimmed_statement() {
        assert_eq!(sqls("\n  SELECT 42\n"), vec!["SELECT 42"]);
    }

    #[test]
    fn indexes_are_one_based_and_contiguous() {
        let statements = split_statements(";SELECT 1;;SELECT 2;\n;SELECT 3");
        let indexes = statements.iter().map(Statement::index).collect::<Vec<_>>();
        assert_eq!(indexes, vec![1, 2, 3]);
    }

    #[test]
    fn escaped_quotes_do_not_close_literals() {
        assert_eq!(
            sqls("SELECT 'it''s; fine'; SELECT \"a\"\"b;c\" FROM t;"),
            vec!["SELECT 'it''s; fine'", "SELECT \"a\"\"b;c\" FROM t"]
        );
    }

    #[test]
    fn double_quote_inside_single_quote_is_literal_text() {
        assert_eq!(
            sqls("SELECT 'say \"hi;' ; SELECT 2"),
            vec!["SELECT 'say \"hi;'", "SELECT 2"]
        );
    }

    #[test]
    fn comment_openers_inside_quotes_are_literal_text() {
        assert_eq!(
            sqls("SELECT '--;' , '/*;'; SELECT 2"),
            vec!["SELECT '--;' , '/*;'", "SELECT 2"]
        );
    }

    #[test]
    fn quotes_inside_comments_do_not_open_literals() {
        assert_eq!(
            sqls("-- don't\nSELECT 1; /* it's */ SELECT 2;"),
            vec!["-- don't\nSELECT 1", "/* it's */ SELECT 2"]
        );
    }

    #[test]
    fn unterminated_constructs_swallow_the_rest_of_the_script() {
        assert_eq!(
            sqls("SELECT 1; SELECT 'open; SELECT 3;"),
            vec!["SELECT 1", "SELECT 'open; SELECT 3;"]
        );
        assert_eq!(
            sqls("SELECT 1; /* open ; SELECT 3;"),
            vec!["SELECT 1", "/* open ; SELECT 3;"]
        );
    }

    #[test]
    fn line_comment_at_end_of_input_is_kept() {
        assert_eq!(sqls("SELECT 1 -- trailing"), vec!["SELECT 1 -- trailing"]);
    }

    #[test]
    fn multibyte_text_is_sliced_on_char_boundaries() {
        assert_eq!(
            sqls("SELECT 'não;é' AS ç; SELECT 'ü'"),
            vec!["SELECT 'não;é' AS ç", "SELECT 'ü'"]
        );
    }

    #[test]
    fn segments_include_empty_spans() {
        assert_eq!(split_segments(" ;;a"), vec![" ", "", "a"]);
        assert_eq!(split_segments(""), vec![""]);
    }

    #[test]
    fn strip_trailing_terminator_removes_one_separator() {
        assert_eq!(strip_trailing_terminator("  SELECT 1 ;\n"), "SELECT 1");
        assert_eq!(strip_trailing_terminator("SELECT 1"), "SELECT 1");
        assert_eq!(strip_trailing_terminator("SELECT 1;;"), "SELECT 1;");
    }
}
