//! Loading external data sources into tables

use std::{
    collections::HashSet,
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

use log::info;

use super::CliError;
use crate::{
    parse_table,
    table::{Row, Table},
    value::{Datum, Value, make_date, make_number},
};

/// Split a `name=path` command-line argument.
pub fn parse_source_arg(arg: &str) -> Result<(String, PathBuf), CliError> {
    match arg.split_once('=') {
        Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
            Ok((name.trim().to_string(), PathBuf::from(path.trim())))
        }
        _ => Err(CliError::SourceArg(arg.to_string())),
    }
}

/// Load a `.csv` or `.json` file as a table.
pub fn load_source(path: &Path) -> Result<Table, CliError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let file_error = |source| CliError::File {
        path: path.to_path_buf(),
        source,
    };
    let table = match extension.as_deref() {
        Some("csv") => parse_csv_table(File::open(path).map_err(file_error)?)?,
        Some("json") => {
            let text = fs::read_to_string(path).map_err(file_error)?;
            parse_table(&serde_json::from_str(&text)?)?
        }
        _ => return Err(CliError::SourceFormat(path.to_path_buf())),
    };
    info!(
        "loaded {} rows ({} columns) from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Read CSV with a header line, inferring a type per field.
///
/// Empty fields are missing, `true`/`false` are logical, numeric text is a
/// number and ISO-8601 dates or datetimes are datetimes. Anything else stays
/// text.
pub fn parse_csv_table<R: Read>(reader: R) -> Result<Table, CliError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut seen = HashSet::new();
    if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
        return Err(CliError::DuplicateHeader(dup.clone()));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .cloned()
            .zip(record.iter().map(infer_field))
            .collect();
        rows.push(row);
    }
    Ok(Table::from_parts(headers, rows, None))
}

fn infer_field(field: &str) -> Datum {
    let trimmed = field.trim();
    match trimmed {
        "" => None,
        "true" => Some(Value::Logical(true)),
        "false" => Some(Value::Logical(false)),
        _ => {
            let text = Some(Value::Text(field.to_string()));
            make_number(&text)
                .or_else(|| make_date(&text))
                .or(text)
        }
    }
}
