//! Two-column numeric table loader
//!
//! One sample pair per line, whitespace separated. Blank lines and lines
//! starting with `#` are skipped. Columns after the second are ignored.

use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read sample table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Sample table contains no data rows")]
    Empty,
}

/// Samples of both channels, column order preserved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TwoChannelSamples {
    pub a: Vec<f64>,
    pub b: Vec<f64>,
}

impl TwoChannelSamples {
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

/// Load a sample table from disk
pub fn load_two_channel(path: impl AsRef<Path>) -> Result<TwoChannelSamples, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let samples = parse_two_channel(BufReader::new(file))?;

    debug!("Loaded {} sample pairs from {}", samples.len(), path.display());
    Ok(samples)
}

/// Parse a sample table from any buffered reader
pub fn parse_two_channel(reader: impl BufRead) -> Result<TwoChannelSamples, LoadError> {
    let mut samples = TwoChannelSamples::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_no = index + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut columns = line.split_whitespace();
        let a = parse_column(columns.next(), line_no, 1)?;
        let b = parse_column(columns.next(), line_no, 2)?;

        samples.a.push(a);
        samples.b.push(b);
    }

    if samples.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(samples)
}

fn parse_column(token: Option<&str>, line: usize, column: usize) -> Result<f64, LoadError> {
    let token = token.ok_or_else(|| LoadError::Parse {
        line,
        message: format!("expected 2 columns, found {}", column - 1),
    })?;

    token.parse::<f64>().map_err(|e| LoadError::Parse {
        line,
        message: format!("column {column}: {token:?} is not a number ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_parse_rows() {
        let text = "# a b\n0.5 -1.0\n\n  1e-3\t2\n3 4 5\n";
        let samples = parse_two_channel(Cursor::new(text)).unwrap();

        assert_eq!(samples.a, vec![0.5, 1e-3, 3.0]);
        assert_eq!(samples.b, vec![-1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_missing_column() {
        let text = "1 2\n3\n";
        match parse_two_channel(Cursor::new(text)) {
            Err(LoadError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("expected 2 columns"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_number() {
        let text = "1 2\n3 x4\n";
        assert!(matches!(
            parse_two_channel(Cursor::new(text)),
            Err(LoadError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        assert!(matches!(
            parse_two_channel(Cursor::new("# only a comment\n\n")),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.25 0.5").unwrap();
        writeln!(file, "-0.25 -0.5").unwrap();

        let samples = load_two_channel(file.path()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples.b, vec![0.5, -0.5]);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_two_channel("/nonexistent/specbode/table.txt"),
            Err(LoadError::Io(_))
        ));
    }
}
