//! Helpers for secrets and values mounted as files.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Read the first line of a file, without its line terminator.
///
/// Typical use is a password mounted by the orchestrator as a file. An empty
/// file yields an empty string.
pub fn read_first_line<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let file = File::open(path.as_ref())?;
    let mut line = String::new();
    BufReader::new(file).read_line(&mut line)?;
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(line)
}
