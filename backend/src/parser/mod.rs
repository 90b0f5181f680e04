//! Delimited-text tokenizer with encoding and delimiter auto-detection.
//!
//! Splits raw export text into records, tokenizes each record into fields and
//! maps the fields onto the validated header (see [`header`]).

pub mod header;

use serde::Serialize;

use crate::error::{FormatError, IngestError, RowShapeError};
use crate::models::WorkoutRow;

pub use header::{Column, HeaderLayout};

/// A data row dropped during parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

impl From<RowShapeError> for SkippedRow {
    fn from(err: RowShapeError) -> Self {
        Self {
            line: err.line,
            reason: err.to_string(),
        }
    }
}

/// Output of [`parse_table`].
#[derive(Debug, Clone)]
pub struct ParsedTable {
    /// Rows that matched the header shape, in input order.
    pub rows: Vec<WorkoutRow>,
    /// Rows rejected for a field-count mismatch.
    pub skipped: Vec<SkippedRow>,
    /// Header cells as written.
    pub headers: Vec<String>,
    /// Header cells that were not used.
    pub ignored_columns: Vec<String>,
    pub delimiter: char,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as is; chardet only guesses for everything else.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to text, dropping a leading byte-order mark.
pub fn decode_content(bytes: &[u8], encoding: &str) -> Result<String, IngestError> {
    let text = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    if text.contains('\u{0}') {
        return Err(IngestError::Encoding(format!(
            "{} input contains NUL bytes (binary file?)",
            encoding
        )));
    }

    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Split text into records on line breaks that are not inside a quoted field.
///
/// A quote only opens a quoted field at the start of a field (after the
/// delimiter and any whitespace); elsewhere it is literal text. Returns
/// `(line_number, record)` pairs; `line_number` is the 1-based line the record
/// starts on. Blank records are dropped.
pub fn split_records(text: &str, delimiter: char) -> Vec<(usize, String)> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut line = 1;
    let mut start_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
            if in_quotes {
                current.push(c);
            } else {
                push_record(&mut records, start_line, &mut current);
                start_line = line;
                field_start = true;
            }
            continue;
        }

        current.push(c);
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
        } else if c == delimiter {
            field_start = true;
        } else if c == '"' && field_start {
            in_quotes = true;
            field_start = false;
        } else if !c.is_whitespace() {
            field_start = false;
        }
    }
    push_record(&mut records, start_line, &mut current);

    records
}

fn push_record(records: &mut Vec<(usize, String)>, line: usize, current: &mut String) {
    let record = std::mem::take(current);
    let record = record.strip_suffix('\r').unwrap_or(&record);
    if !record.trim().is_empty() {
        records.push((line, record.to_string()));
    }
}

/// Tokenize one record.
///
/// The delimiter is ignored inside double quotes and `""` inside quotes is a
/// literal quote. Like [`split_records`], only a quote at the start of a field
/// opens quoting. Fields are trimmed. Unbalanced quotes never fail: the rest of
/// the record simply stays in the current field.
pub fn parse_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == delimiter {
            fields.push(current.trim().to_string());
            current.clear();
            field_start = true;
        } else if c == '"' && field_start {
            in_quotes = true;
            field_start = false;
        } else {
            if !c.is_whitespace() {
                field_start = false;
            }
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Tokenize a whole export and map every data row onto the header.
///
/// Structural problems (empty input, bad header) abort; rows of the wrong
/// width are collected in [`ParsedTable::skipped`].
pub fn parse_table(
    text: &str,
    delimiter: char,
    strict_columns: bool,
) -> Result<ParsedTable, IngestError> {
    if text.trim().is_empty() {
        return Err(FormatError::EmptyInput.into());
    }

    let mut records = split_records(text, delimiter).into_iter();
    let (_, header_line) = records.next().ok_or(FormatError::MissingHeader)?;

    let headers = parse_line(&header_line, delimiter);
    let layout = HeaderLayout::from_headers(&headers, strict_columns)?;

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (line, record) in records {
        match layout.map_row(line, parse_line(&record, delimiter)) {
            Ok(row) => rows.push(row),
            Err(err) => skipped.push(err.into()),
        }
    }

    Ok(ParsedTable {
        rows,
        skipped,
        headers,
        ignored_columns: layout.ignored,
        delimiter,
    })
}
