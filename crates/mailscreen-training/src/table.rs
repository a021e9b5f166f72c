//! Tabular file reading and column resolution
//!
//! Every supported input format is flattened into the same in-memory shape:
//! a lowercased header row plus string cells. Delimited files sniff their
//! separator from the first line; spreadsheets read the first worksheet.

use calamine::{open_workbook, Reader, Xlsx};
use mailscreen_core::{Error, Result};
use std::path::Path;

/// Header names tried, in order, for the email text column
pub const TEXT_CANDIDATES: &[&str] = &[
    "text", "body", "email", "content", "message", "mail", "raw", "email_body",
];

/// Header names tried, in order, for the label column
pub const LABEL_CANDIDATES: &[&str] = &[
    "label", "class", "target", "is_phishing", "phishing", "spam", "category", "type",
];

/// Header names tried, in order, for the sender column
pub const SENDER_CANDIDATES: &[&str] =
    &["sender", "from", "sender_email", "email_from", "sender_domain"];

/// One tabular file, decoded to strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableData {
    /// Lowercased, trimmed header names
    pub headers: Vec<String>,

    /// Data rows, padded or truncated to the header width
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Explicit column names that override the candidate search
#[derive(Debug, Clone, Default)]
pub struct ColumnOverrides {
    pub text: Option<String>,
    pub label: Option<String>,
}

/// Where the text of each row comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// A single column
    Column(usize),

    /// Subject and body columns, concatenated with a space
    SubjectBody { subject: usize, body: usize },
}

/// Resolved column layout for one table
#[derive(Debug, Clone, Copy)]
pub struct ResolvedColumns {
    pub text: TextSource,
    pub label: usize,
    pub sender: Option<usize>,
}

/// Read any supported tabular file
pub fn read_table(path: impl AsRef<Path>) -> Result<TableData> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" => read_spreadsheet(path),
        _ => read_delimited(path),
    }
}

fn read_delimited(path: &Path) -> Result<TableData> {
    let bytes = std::fs::read(path)?;
    // Non-UTF-8 datasets are common; decode lossily rather than reject
    let content = String::from_utf8_lossy(&bytes);

    let first_line = content.lines().next().unwrap_or("");
    let delimiter = sniff_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| Error::data_quality(format!("unreadable header row: {e}")))?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect(),
        None => {
            return Err(Error::data_quality(format!(
                "{} contains no rows",
                path.display()
            )))
        }
    };

    let mut rows = Vec::new();
    for record in records {
        let record =
            record.map_err(|e| Error::data_quality(format!("unreadable data row: {e}")))?;
        let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(TableData { headers, rows })
}

fn read_spreadsheet(path: &Path) -> Result<TableData> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| Error::data_quality(format!("cannot open {}: {e}", path.display())))?;

    // First worksheet only
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::data_quality(format!("{} has no worksheets", path.display())))?
        .map_err(|e| Error::data_quality(format!("unreadable worksheet: {e}")))?;

    let mut cells = range.rows();
    let headers: Vec<String> = match cells.next() {
        Some(row) => row.iter().map(|c| c.to_string().trim().to_lowercase()).collect(),
        None => {
            return Err(Error::data_quality(format!(
                "{} contains no rows",
                path.display()
            )))
        }
    };

    let rows = cells
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            cells.resize(headers.len(), String::new());
            cells
        })
        .collect();

    Ok(TableData { headers, rows })
}

fn sniff_delimiter(line: &str) -> u8 {
    let counts = [
        (b',', line.matches(',').count()),
        (b';', line.matches(';').count()),
        (b'\t', line.matches('\t').count()),
    ];
    counts
        .iter()
        .max_by_key(|(_, count)| *count)
        .map(|(delimiter, _)| *delimiter)
        .unwrap_or(b',')
}

/// Resolve the text, label, and sender columns of a table.
///
/// Overrides win; otherwise candidates are tried in priority order, then
/// the subject/body fallbacks. An unresolvable text or label column is a
/// configuration error for this table.
pub fn resolve_columns(table: &TableData, overrides: &ColumnOverrides) -> Result<ResolvedColumns> {
    let text = resolve_text(table, overrides.text.as_deref())?;
    let label = resolve_named(table, overrides.label.as_deref(), LABEL_CANDIDATES, "label")?;
    let sender = SENDER_CANDIDATES.iter().find_map(|c| table.position(c));

    Ok(ResolvedColumns {
        text,
        label,
        sender,
    })
}

fn resolve_text(table: &TableData, override_name: Option<&str>) -> Result<TextSource> {
    if let Some(name) = override_name {
        let name = name.to_lowercase();
        return table.position(&name).map(TextSource::Column).ok_or_else(|| {
            Error::config(format!("text column override '{name}' not found in headers"))
        });
    }

    for candidate in TEXT_CANDIDATES {
        if let Some(position) = table.position(candidate) {
            return Ok(TextSource::Column(position));
        }
    }

    // Fallbacks mirror datasets that split subject from body
    let subject = table.position("subject");
    let body = table.position("email_text");
    match (subject, body) {
        (Some(subject), Some(body)) => Ok(TextSource::SubjectBody { subject, body }),
        (None, Some(body)) => Ok(TextSource::Column(body)),
        (Some(subject), None) => Ok(TextSource::Column(subject)),
        (None, None) => Err(Error::config(format!(
            "no text column found among headers {:?}",
            table.headers
        ))),
    }
}

fn resolve_named(
    table: &TableData,
    override_name: Option<&str>,
    candidates: &[&str],
    role: &str,
) -> Result<usize> {
    if let Some(name) = override_name {
        let name = name.to_lowercase();
        return table.position(&name).ok_or_else(|| {
            Error::config(format!("{role} column override '{name}' not found in headers"))
        });
    }
    candidates
        .iter()
        .find_map(|c| table.position(c))
        .ok_or_else(|| {
            Error::config(format!(
                "no {role} column found among headers {:?}",
                table.headers
            ))
        })
}

/// Extract the text of one row according to the resolved source
pub fn row_text(row: &[String], source: TextSource) -> String {
    match source {
        TextSource::Column(index) => row.get(index).cloned().unwrap_or_default(),
        TextSource::SubjectBody { subject, body } => {
            let subject = row.get(subject).map(String::as_str).unwrap_or("");
            let body = row.get(body).map(String::as_str).unwrap_or("");
            format!("{subject} {body}").trim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_comma_csv() {
        let file = write_temp("Text,Label\nhello,0\nurgent offer,1\n", ".csv");
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.headers, vec!["text", "label"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["urgent offer", "1"]);
    }

    #[test]
    fn test_sniffs_semicolon_and_tab() {
        let file = write_temp("text;label\nhello;0\n", ".csv");
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.headers, vec!["text", "label"]);

        let file = write_temp("text\tlabel\nhello\t0\n", ".tsv");
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.headers, vec!["text", "label"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let file = write_temp("text,label,sender\nhello,0\n", ".csv");
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.rows[0], vec!["hello", "0", ""]);
    }

    #[test]
    fn test_resolve_candidate_columns() {
        let table = TableData {
            headers: vec!["id".into(), "body".into(), "class".into(), "from".into()],
            rows: vec![],
        };
        let resolved = resolve_columns(&table, &ColumnOverrides::default()).unwrap();
        assert_eq!(resolved.text, TextSource::Column(1));
        assert_eq!(resolved.label, 2);
        assert_eq!(resolved.sender, Some(3));
    }

    #[test]
    fn test_resolve_subject_body_fallback() {
        let table = TableData {
            headers: vec!["subject".into(), "email_text".into(), "label".into()],
            rows: vec![],
        };
        let resolved = resolve_columns(&table, &ColumnOverrides::default()).unwrap();
        assert_eq!(
            resolved.text,
            TextSource::SubjectBody {
                subject: 0,
                body: 1
            }
        );

        let row = vec!["Invoice due".to_string(), "pay now".to_string(), "1".to_string()];
        assert_eq!(row_text(&row, resolved.text), "Invoice due pay now");
    }

    #[test]
    fn test_override_beats_candidates() {
        let table = TableData {
            headers: vec!["body".into(), "notes".into(), "label".into()],
            rows: vec![],
        };
        let overrides = ColumnOverrides {
            text: Some("Notes".to_string()),
            label: None,
        };
        let resolved = resolve_columns(&table, &overrides).unwrap();
        assert_eq!(resolved.text, TextSource::Column(1));
    }

    #[test]
    fn test_missing_label_column_is_config_error() {
        let table = TableData {
            headers: vec!["body".into()],
            rows: vec![],
        };
        let result = resolve_columns(&table, &ColumnOverrides::default());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
