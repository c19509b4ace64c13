//! Header sniffing for schema detection

use super::decode_field;
use crate::{Error, Result};
use encoding_rs::Encoding;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read the first line of a file as a list of column names
///
/// An empty file yields no columns. A trailing `\r\n` or `\n` is stripped
/// before splitting.
pub fn sniff_header(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(path)
        } else {
            Error::io(format!("Failed to open {}", path.display()), e)
        }
    })?;

    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    reader
        .read_until(b'\n', &mut line)
        .map_err(|e| Error::io(format!("Failed to read header of {}", path.display()), e))?;

    Ok(split_header_line(&line, delimiter, encoding))
}

pub(crate) fn split_header_line(line: &[u8], delimiter: u8, encoding: &'static Encoding) -> Vec<String> {
    let line = line
        .strip_suffix(b"\n")
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .unwrap_or(line);

    if line.is_empty() {
        return Vec::new();
    }

    line.split(|b| *b == delimiter)
        .map(|field| decode_field(encoding, field).trim().to_string())
        .collect()
}
