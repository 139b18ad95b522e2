use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::BlockError;

/// Lookup table from binary position to the address it stands for.
///
/// Positions line up with character indices in the binary string, so the
/// first connection state lives at position 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    entries: BTreeMap<usize, String>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `address` for `position`, returning the address it replaced.
    pub fn insert(&mut self, position: usize, address: impl Into<String>) -> Option<String> {
        self.entries.insert(position, address.into())
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.entries.get(&position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(|(p, a)| (*p, a.as_str()))
    }
}

impl FromIterator<(usize, String)> for PositionMap {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        let mut map = PositionMap::new();
        for (position, address) in iter {
            map.insert(position, address);
        }
        map
    }
}

/// Loads the mapping file at `file_path`.
///
/// The file is opened, read to the end and closed before this returns. A
/// missing or unreadable file is fatal, and so is a position that is not an
/// integer. Lines with the wrong number of tokens are logged and skipped.
pub fn load_mapping(file_path: impl AsRef<Path>) -> Result<PositionMap, BlockError> {
    let path = file_path.as_ref();
    let file = File::open(path).map_err(|source| BlockError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_mapping(BufReader::new(file), path)?;

    debug!(path = %path.display(), entries = map.len(), "loaded position mapping");
    Ok(map)
}

/// Builds a mapping from `<position> <address>` lines read from `reader`.
///
/// `path` only labels I/O errors. Recoverable line errors are reported
/// through `warn!`; fatal ones end the load.
pub fn parse_mapping<R: BufRead>(reader: R, path: &Path) -> Result<PositionMap, BlockError> {
    let mut map = PositionMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| BlockError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        match parse_line(index + 1, &line) {
            Ok((position, address)) => {
                if let Some(previous) = map.insert(position, address) {
                    debug!(position, %previous, "position mapped again, keeping the later address");
                }
            }
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => warn!("{err}. Skipping."),
        }
    }

    Ok(map)
}

/// Parses one mapping line.
///
/// Any token count other than two, blank lines included, is a `MalformedLine`.
/// A negative position is also malformed since no binary index can reach it.
/// A first token that is not an integer at all is an `InvalidPosition`.
pub fn parse_line(line_no: usize, line: &str) -> Result<(usize, String), BlockError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let content = || line.trim().to_string();

    match parts.as_slice() {
        [position, address] => match position.parse::<usize>() {
            Ok(position) => Ok((position, address.to_string())),
            Err(_) if position.parse::<i64>().is_ok() => Err(BlockError::MalformedLine {
                line: line_no,
                content: content(),
            }),
            Err(_) => Err(BlockError::InvalidPosition {
                line: line_no,
                content: content(),
            }),
        },
        _ => Err(BlockError::MalformedLine {
            line: line_no,
            content: content(),
        }),
    }
}
