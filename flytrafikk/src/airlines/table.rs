//! Airline code lookup table.
//!
//! Line-oriented `CODE,Display Name` file, one airline per line.
//! Codes are 2-4 characters (IATA and ICAO prefixes both appear).
//! Malformed or missing lines are skipped individually; a missing file
//! yields an empty table, which is a valid degraded state, never an error.
//!
//! The table is populated at most once per process and read-only
//! afterwards, so concurrent readers need no synchronization.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

use tracing::{info, warn};

/// File name of the code table, relative to the data directory.
pub const AIRLINES_FILE: &str = "airlines.dat";

static GLOBAL_TABLE: OnceLock<AirlineTable> = OnceLock::new();

/// Immutable airline code to display name mapping.
#[derive(Debug, Default)]
pub struct AirlineTable {
    codes: HashMap<String, String>,
}

impl AirlineTable {
    /// Builds a table from explicit entries. Mostly for tests.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let codes = entries
            .into_iter()
            .map(|(code, name)| (code.into().to_uppercase(), name.into()))
            .collect();
        Self { codes }
    }

    /// Loads `airlines.dat` from the given data directory.
    ///
    /// A missing or unreadable file logs a warning and returns an empty
    /// table.
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let path = data_dir.join(AIRLINES_FILE);
        match File::open(&path) {
            Ok(file) => {
                let table = Self::parse(BufReader::new(file));
                info!(
                    path = %path.display(),
                    airlines = table.len(),
                    "airline code table loaded"
                );
                table
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "airline code table unavailable, classification degrades to patterns"
                );
                Self::default()
            }
        }
    }

    /// Parses the line-oriented table format, skipping bad lines.
    pub fn parse<R: BufRead>(reader: R) -> Self {
        let mut codes = HashMap::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = line_number + 1, error = %e, "skipping unreadable line");
                    continue;
                }
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once(',') {
                Some((code, name)) => {
                    let code = code.trim();
                    let name = name.trim();
                    if (2..=4).contains(&code.len()) && !name.is_empty() {
                        codes.insert(code.to_uppercase(), name.to_string());
                    } else {
                        warn!(line = line_number + 1, "skipping malformed airline entry");
                    }
                }
                None => {
                    warn!(line = line_number + 1, "skipping malformed airline entry");
                }
            }
        }

        Self { codes }
    }

    /// Looks up a display name by exact code.
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Process-wide table, populated on first call and immutable after.
    pub fn global(data_dir: &Path) -> &'static AirlineTable {
        GLOBAL_TABLE.get_or_init(|| Self::load_from_dir(data_dir))
    }
}
