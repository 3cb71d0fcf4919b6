//! Input loading
//!
//! Dictionaries are maintained as many CSV or Markdown-table files, usually
//! one per object. Inputs may be files or directories; directories are
//! scanned recursively and every file is read in sorted path order so gate
//! results are reproducible.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{GateError, Result};
use crate::row::{RawRecord, Row, COLUMNS, OPTIONAL_COLUMNS};

/// Markdown alignment/separator line, e.g. `| --- | :-- |`
static MD_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|\s*:?-{2,}").expect("separator pattern is valid"));

/// Supported input file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Markdown,
}

impl InputFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn detect(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => Some(InputFormat::Csv),
            Some("md") | Some("markdown") => Some(InputFormat::Markdown),
            _ => None,
        }
    }
}

/// Expand input paths into the sorted list of files to read
///
/// Files pass through as given; directories contribute every supported file
/// beneath them. A missing path or an empty result is an error.
pub fn expand_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(GateError::file_error(format!(
                "Input not found: {}",
                path.display()
            )));
        }

        if path.is_dir() {
            collect_dir(path, &mut files)?;
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            return Err(GateError::invalid_input(format!(
                "Unsupported input path: {}",
                path.display()
            )));
        }
    }

    if files.is_empty() {
        return Err(GateError::invalid_input(
            "No supported input files found (expect .csv/.md/.markdown)",
        ));
    }

    files.sort();
    Ok(files)
}

fn collect_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_dir(&path, files)?;
        } else if path.is_file() && InputFormat::detect(&path).is_some() {
            files.push(path);
        }
    }
    Ok(())
}

/// Load and merge rows from every file, in order
pub fn load_rows<P: AsRef<Path>>(files: &[P]) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for file in files {
        rows.extend(load_file(file.as_ref())?);
    }
    Ok(rows)
}

/// Load rows from a single CSV or Markdown file
pub fn load_file(path: &Path) -> Result<Vec<Row>> {
    let format = InputFormat::detect(path).ok_or_else(|| {
        GateError::invalid_input(format!("Unsupported input format: {}", path.display()))
    })?;

    let content = fs::read_to_string(path).map_err(|e| {
        GateError::file_error(format!("Failed to read '{}': {}", path.display(), e))
    })?;
    let source = path.display().to_string();

    let records = match format {
        InputFormat::Csv => parse_csv(&content, &source)?,
        InputFormat::Markdown => parse_markdown_table(&content, &source)?,
    };

    info!(path = %source, rows = records.len(), "loaded input file");
    Ok(records.iter().map(Row::from_raw).collect())
}

/// Parse CSV text with a header row
///
/// A leading UTF-8 BOM is ignored. Short records simply lack the trailing
/// columns; cells beyond the header are dropped.
pub fn parse_csv(content: &str, source: &str) -> Result<Vec<RawRecord>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| GateError::parse_error(format!("Failed to read CSV headers in {}: {}", source, e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    log_columns(source, &headers);

    let mut records = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            GateError::parse_error(format!("Failed to read CSV record {} in {}: {}", i + 1, source, e))
        })?;
        let raw: RawRecord = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();
        records.push(raw);
    }

    Ok(records)
}

/// Parse the dictionary table out of a Markdown document
///
/// The header is the first `|` line mentioning both `code` and
/// `object_type`; the line after it is its alignment row. The table ends at
/// the first line that does not start with `|`.
pub fn parse_markdown_table(content: &str, source: &str) -> Result<Vec<RawRecord>> {
    let lines: Vec<&str> = content.lines().collect();

    let header_idx = lines
        .iter()
        .position(|line| {
            line.trim().starts_with('|') && line.contains("code") && line.contains("object_type")
        })
        .ok_or_else(|| GateError::parse_error(format!("No markdown table found in: {}", source)))?;

    let headers = split_cells(lines[header_idx]);
    log_columns(source, &headers);

    let mut records = Vec::new();
    for (offset, line) in lines.iter().enumerate().skip(header_idx + 2) {
        let trimmed = line.trim();
        if !trimmed.starts_with('|') {
            break;
        }
        if MD_SEPARATOR_RE.is_match(trimmed) {
            continue;
        }

        let cells = split_cells(line);
        if cells.len() != headers.len() {
            warn!(
                path = %source,
                line = offset + 1,
                expected = headers.len(),
                found = cells.len(),
                "skipping markdown row with mismatched cell count"
            );
            continue;
        }
        records.push(headers.iter().cloned().zip(cells).collect());
    }

    Ok(records)
}

fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|c| c.trim().to_string()).collect()
}

fn log_columns(source: &str, headers: &[String]) {
    let known: BTreeSet<&str> = COLUMNS.iter().copied().collect();
    for header in headers {
        if OPTIONAL_COLUMNS.contains(&header.as_str()) {
            debug!(path = %source, column = %header, "ignoring database column");
        } else if !known.contains(header.as_str()) {
            warn!(path = %source, column = %header, "unknown column ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSV: &str = "\u{feff}tenant_id,version,code,name,object_type,status,source,id\n\
                       t1,1,company,Company,entity,active,manual,42\n\
                       t1,2,company.base\n";

    const MARKDOWN: &str = "# Company\n\
        \n\
        Some prose mentioning code and object_type.\n\
        \n\
        | tenant_id | version | code | name | object_type | status | source |\n\
        | --- | --- | --- | --- | --- | --- | --- |\n\
        | t1 | 1 | company | Company | entity | active | manual |\n\
        |:--|:--|:--|:--|:--|:--|:--|\n\
        | t1 | 1 | company.base | Base | entity | active |\n\
        | t1 | 1 | company.base.name | Name | feature | active | manual |\n\
        \n\
        | tenant_id | code |\n\
        | t1 | ignored |\n";

    #[test]
    fn test_parse_csv_strips_bom_and_allows_short_records() {
        let records = parse_csv(CSV, "test.csv").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("tenant_id").map(String::as_str), Some("t1"));
        assert_eq!(records[0].get("id").map(String::as_str), Some("42"));
        assert_eq!(records[1].get("code").map(String::as_str), Some("company.base"));
        assert!(records[1].get("name").is_none());
    }

    #[test]
    fn test_parse_markdown_table() {
        let records = parse_markdown_table(MARKDOWN, "test.md").unwrap();
        let codes: Vec<&str> = records
            .iter()
            .filter_map(|r| r.get("code").map(String::as_str))
            .collect();
        // Mismatched row skipped, second table never reached
        assert_eq!(codes, vec!["company", "company.base.name"]);
    }

    #[test]
    fn test_markdown_without_table_is_parse_error() {
        let err = parse_markdown_table("# nothing here\n", "empty.md").unwrap_err();
        assert!(matches!(err, GateError::ParseError(_)));
    }

    #[test]
    fn test_expand_inputs_recurses_and_sorts() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("b");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("z.csv"), CSV).unwrap();
        fs::write(nested.join("a.MD"), MARKDOWN).unwrap();
        fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let files = expand_inputs(&[dir.path()]).unwrap();
        assert_eq!(files, vec![nested.join("a.MD"), dir.path().join("z.csv")]);
    }

    #[test]
    fn test_expand_inputs_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            expand_inputs(&[dir.path()]).unwrap_err(),
            GateError::InvalidInput(_)
        ));
        assert!(matches!(
            expand_inputs(&[dir.path().join("missing.csv")]).unwrap_err(),
            GateError::FileError(_)
        ));
    }

    #[test]
    fn test_load_rows_merges_files_in_order() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("a.csv");
        let md = dir.path().join("b.markdown");
        fs::write(&csv, CSV).unwrap();
        fs::write(&md, MARKDOWN).unwrap();

        let rows = load_rows(&[csv, md]).unwrap();
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["company", "company.base", "company", "company.base.name"]);
        assert_eq!(rows[0].version, 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dict.json");
        fs::write(&path, "{}").unwrap();
        assert!(matches!(load_file(&path).unwrap_err(), GateError::InvalidInput(_)));
    }
}
