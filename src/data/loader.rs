use std::fs::File;
use std::path::Path;

use log::info;

use super::model::Table;
use crate::error::{PlotError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a whitespace-delimited numeric table.
///
/// Layout, as PIXON writes it:
///
/// ```text
/// # optional comment
/// 4500.0  1.23  0.05
/// 4502.5  1.31  0.05
/// ```
///
/// Fields are separated by any run of spaces or tabs. Everything from a
/// `#` to the end of its line is a comment, and lines left empty are
/// skipped. Every data row must have the same column count.
pub fn load_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| PlotError::from_io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        let line = record.position().map_or(0, |p| p.line());

        let row = data_tokens(&record)
            .into_iter()
            .map(|tok| {
                tok.parse::<f64>().map_err(|_| PlotError::InvalidNumber {
                    path: path.to_path_buf(),
                    line,
                    token: tok.to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if row.is_empty() {
            continue;
        }
        rows.push(row);
    }

    let table = Table::from_rows(path.display().to_string(), rows)?;
    info!(
        "loaded {} ({} rows x {} cols)",
        path.display(),
        table.nrows(),
        table.ncols()
    );
    Ok(table)
}

/// Whitespace-separated tokens of `record` up to the first `#`.
///
/// The reader only skips lines that start with `#`; a trailing or indented
/// comment reaches us as ordinary fields.
fn data_tokens(record: &csv::StringRecord) -> Vec<&str> {
    let mut tokens = Vec::new();
    // Runs of spaces show up as empty fields; tabs stay inside a field.
    for tok in record.iter().flat_map(str::split_whitespace) {
        match tok.split_once('#') {
            Some((head, _)) => {
                if !head.is_empty() {
                    tokens.push(head);
                }
                break;
            }
            None => tokens.push(tok),
        }
    }
    tokens
}

fn csv_error(path: &Path, err: csv::Error) -> PlotError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => PlotError::from_io(path, io),
        _ => PlotError::shape(path.display().to_string(), message),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_space_and_tab_separated_rows() {
        let f = write_temp("# time flux err\n1.0  2.5   0.1\n2.0\t3.5\t0.2\n\n3.0 4.5 0.3\n");
        let t = load_table(f.path()).unwrap();
        assert_eq!(t.nrows(), 3);
        assert_eq!(t.ncols(), 3);
        assert_eq!(t.column(1).unwrap(), vec![2.5, 3.5, 4.5]);
    }

    #[test]
    fn leading_whitespace_and_scientific_notation() {
        let f = write_temp("   -1.5e2   3e-1\n  0  nan\n");
        let t = load_table(f.path()).unwrap();
        assert_eq!(t.first(0).unwrap(), -150.0);
        assert_eq!(t.first(1).unwrap(), 0.3);
        assert!(t.last(1).unwrap().is_nan());
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, PlotError::FileNotFound(_)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let f = write_temp("1 2 3\n4 5\n");
        let err = load_table(f.path()).unwrap_err();
        assert!(matches!(err, PlotError::Shape { .. }));
    }

    #[test]
    fn empty_file_is_a_shape_error() {
        let f = write_temp("# only a comment\n\n");
        let err = load_table(f.path()).unwrap_err();
        assert!(matches!(err, PlotError::Shape { .. }));
    }

    #[test]
    fn trailing_comments_are_cut_off() {
        let f = write_temp("1 2 3 # note\n4 5 6#tight\n");
        let t = load_table(f.path()).unwrap();
        assert_eq!(t.nrows(), 2);
        assert_eq!(t.ncols(), 3);
        assert_eq!(t.last(2).unwrap(), 6.0);
    }

    #[test]
    fn indented_comment_lines_are_skipped() {
        let f = write_temp("  # indented comment\n\t# tabbed\n4 5 6\n");
        let t = load_table(f.path()).unwrap();
        assert_eq!(t.nrows(), 1);
        assert_eq!(t.row(0).unwrap(), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn garbage_token_names_the_line() {
        let f = write_temp("1 2\n3 abc\n");
        match load_table(f.path()).unwrap_err() {
            PlotError::InvalidNumber { line, token, .. } => {
                assert_eq!(line, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
