//! Roster files on disk.
//!
//! A roster file is the JSON export of the `Documents` sheet:
//!
//! ```json
//! {
//!   "sheet": "Documents",
//!   "columns": ["Vehicle_ID", "Inspection_Expiry", "Registration_Expiry", "Operating_Card_Expiry"],
//!   "rows": [["TRK-12", "2024-04-01", 45400, "2024-09-30"]]
//! }
//! ```

use std::path::Path;

use fleetdocs_core::roster::{Cell, Roster, DEFAULT_SHEET_NAME};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum RosterFileError {
    #[error("Failed to read roster file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Roster file {path} is not a valid sheet export: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Roster file {path} holds sheet '{found}', expected 'Documents'")]
    WrongSheet { path: String, found: String },
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    sheet: Option<String>,
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Cell>>,
}

/// Parse a roster from JSON text. `origin` names the source in errors.
pub fn parse_roster(json: &str, origin: &str) -> Result<Roster, RosterFileError> {
    let file: RosterFile = serde_json::from_str(json).map_err(|source| RosterFileError::Json {
        path: origin.to_string(),
        source,
    })?;

    if let Some(sheet) = file.sheet.as_deref() {
        if sheet.trim() != DEFAULT_SHEET_NAME {
            return Err(RosterFileError::WrongSheet {
                path: origin.to_string(),
                found: sheet.to_string(),
            });
        }
    }

    Ok(Roster {
        columns: file.columns,
        rows: file.rows,
    })
}

/// Read and parse a roster file.
pub fn read_roster(path: &Path) -> Result<Roster, RosterFileError> {
    let origin = path.display().to_string();
    let json = std::fs::read_to_string(path).map_err(|source| RosterFileError::Io {
        path: origin.clone(),
        source,
    })?;
    let roster = parse_roster(&json, &origin)?;
    tracing::debug!(path = %origin, rows = roster.rows.len(), "Roster file read");
    Ok(roster)
}
