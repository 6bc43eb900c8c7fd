//! Vehicle document roster loading.
//!
//! Turns a tabular sheet export (header row plus data rows) into
//! [`DocumentRecord`]s. A missing required column rejects the whole roster;
//! a bad cell only rejects its own row, which is reported alongside the
//! records that did load.
//!
//! This module has no I/O. Reading the sheet from disk is the caller's job.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::documents::{DocumentRecord, DocumentType, COLUMN_VEHICLE_ID, REQUIRED_COLUMNS};

// ── Constants ────────────────────────────────────────────────────────

/// Sheet name the roster is expected under.
pub const DEFAULT_SHEET_NAME: &str = "Documents";

/// Day zero of spreadsheet serial dates (the 1900 date system, corrected for
/// the fictitious 1900-02-29).
const SERIAL_DATE_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Smallest serial date accepted (1900-03-01). Serials 1-60 fall before the
/// fictitious 1900-02-29 and would resolve one day early.
const MIN_SERIAL_DATE: f64 = 61.0;

/// Largest serial date a spreadsheet accepts (9999-12-31).
const MAX_SERIAL_DATE: f64 = 2_958_465.0;

/// Date-only text formats, tried in order. Slash dates are month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%B %d %Y",
];

/// Date-time text formats; the time of day is discarded.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ── Types ────────────────────────────────────────────────────────────

/// A single spreadsheet cell as it appears in a JSON sheet export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Text rendering used for vehicle ids and error messages.
    ///
    /// Whole numbers drop their fractional part so that a numeric id of
    /// `12` does not become `"12.0"`.
    pub fn display_value(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

/// A tabular roster: header names plus data rows.
///
/// Rows shorter than the header are padded with [`Cell::Empty`]; extra
/// trailing cells are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Fatal roster problems: nothing is loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error("Roster is missing required column '{column}'")]
    MissingColumn { column: String },
}

/// Per-row problems: the row is skipped and the rest of the roster loads.
///
/// `row` is 1-based and counts data rows only (the header is not row 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    #[error("Row {row}: {column} value '{value}' is not a recognisable date")]
    MalformedDate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Row {row}: Vehicle_ID is empty")]
    MissingVehicleId { row: usize },
}

/// Result of loading a roster: the valid records in row order plus every
/// rejected row.
#[derive(Debug, Clone, Default)]
pub struct RosterLoad {
    pub records: Vec<DocumentRecord>,
    pub rejected: Vec<RowError>,
}

// ── Loading ──────────────────────────────────────────────────────────

static EMPTY_CELL: Cell = Cell::Empty;

/// Column positions of the required fields within a roster header.
struct ColumnIndex {
    vehicle_id: usize,
    documents: [usize; 3],
}

impl ColumnIndex {
    fn resolve(columns: &[String]) -> Result<Self, RosterError> {
        let find = |name: &str| {
            columns
                .iter()
                .position(|c| c.trim() == name)
                .ok_or_else(|| RosterError::MissingColumn {
                    column: name.to_string(),
                })
        };

        // Check in sheet order so the first missing column is the one reported.
        for column in REQUIRED_COLUMNS {
            find(column)?;
        }

        Ok(Self {
            vehicle_id: find(COLUMN_VEHICLE_ID)?,
            documents: [
                find(DocumentType::Inspection.column())?,
                find(DocumentType::Registration.column())?,
                find(DocumentType::OperatingCard.column())?,
            ],
        })
    }
}

/// Load every valid row of a roster into a [`DocumentRecord`].
pub fn load(roster: &Roster) -> Result<RosterLoad, RosterError> {
    let index = ColumnIndex::resolve(&roster.columns)?;
    let mut result = RosterLoad::default();

    for (i, row) in roster.rows.iter().enumerate() {
        match load_row(i + 1, row, &index) {
            Ok(record) => result.records.push(record),
            Err(e) => result.rejected.push(e),
        }
    }

    Ok(result)
}

fn load_row(row_number: usize, row: &[Cell], index: &ColumnIndex) -> Result<DocumentRecord, RowError> {
    let cell = |i: usize| row.get(i).unwrap_or(&EMPTY_CELL);

    let vehicle_cell = cell(index.vehicle_id);
    if vehicle_cell.is_blank() {
        return Err(RowError::MissingVehicleId { row: row_number });
    }

    let mut expiries = [NaiveDate::MIN; 3];
    for (slot, (document, column)) in expiries
        .iter_mut()
        .zip(DocumentType::ALL.into_iter().zip(index.documents))
    {
        let value = cell(column);
        *slot = parse_date_cell(value).ok_or_else(|| RowError::MalformedDate {
            row: row_number,
            column: document.column().to_string(),
            value: value.display_value(),
        })?;
    }

    let [inspection, registration, operating_card] = expiries;
    DocumentRecord::new(vehicle_cell.display_value(), inspection, registration, operating_card)
        .map_err(|_| RowError::MissingVehicleId { row: row_number })
}

// ── Date parsing ─────────────────────────────────────────────────────

/// Parse a cell into a calendar date.
///
/// Numbers are spreadsheet serial dates; text is tried against the known
/// date and date-time formats. Blank cells and booleans never parse.
pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Number(n) => from_serial_date(*n),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Parse a textual date, discarding any time-of-day component.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

fn from_serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < MIN_SERIAL_DATE || serial > MAX_SERIAL_DATE {
        return None;
    }
    let (y, m, d) = SERIAL_DATE_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial.trunc() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn header() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    // -----------------------------------------------------------------------
    // Column checks
    // -----------------------------------------------------------------------

    #[test]
    fn missing_column_is_fatal() {
        let roster = Roster {
            columns: vec![
                "Vehicle_ID".into(),
                "Inspection_Expiry".into(),
                "Operating_Card_Expiry".into(),
            ],
            rows: vec![],
        };
        let err = load(&roster).unwrap_err();
        assert_eq!(
            err,
            RosterError::MissingColumn {
                column: "Registration_Expiry".into()
            }
        );
    }

    #[test]
    fn header_whitespace_is_ignored() {
        let roster = Roster {
            columns: vec![
                " Vehicle_ID".into(),
                "Inspection_Expiry ".into(),
                "Registration_Expiry".into(),
                "Operating_Card_Expiry".into(),
            ],
            rows: vec![vec![
                text("TRK-1"),
                text("2024-04-01"),
                text("2024-05-01"),
                text("2024-06-01"),
            ]],
        };
        assert_eq!(load(&roster).unwrap().records.len(), 1);
    }

    #[test]
    fn columns_may_appear_in_any_order() {
        let roster = Roster {
            columns: vec![
                "Operating_Card_Expiry".into(),
                "Notes".into(),
                "Registration_Expiry".into(),
                "Vehicle_ID".into(),
                "Inspection_Expiry".into(),
            ],
            rows: vec![vec![
                text("2024-06-01"),
                text("spare tyre"),
                text("2024-05-01"),
                text("TRK-9"),
                text("2024-04-01"),
            ]],
        };
        let loaded = load(&roster).unwrap();
        let record = &loaded.records[0];
        assert_eq!(record.vehicle_id(), "TRK-9");
        assert_eq!(record.expiry(DocumentType::Inspection), date(2024, 4, 1));
        assert_eq!(record.expiry(DocumentType::OperatingCard), date(2024, 6, 1));
    }

    // -----------------------------------------------------------------------
    // Row handling
    // -----------------------------------------------------------------------

    #[test]
    fn malformed_date_skips_only_that_row() {
        let roster = Roster {
            columns: header(),
            rows: vec![
                vec![text("TRK-1"), text("2024-04-01"), text("2024-05-01"), text("2024-06-01")],
                vec![text("TRK-2"), text("2024-04-01"), text("soon"), text("2024-06-01")],
                vec![text("TRK-3"), text("2024-04-03"), text("2024-05-03"), text("2024-06-03")],
            ],
        };
        let loaded = load(&roster).unwrap();

        let ids: Vec<_> = loaded.records.iter().map(|r| r.vehicle_id()).collect();
        assert_eq!(ids, vec!["TRK-1", "TRK-3"]);
        assert_eq!(
            loaded.rejected,
            vec![RowError::MalformedDate {
                row: 2,
                column: "Registration_Expiry".into(),
                value: "soon".into(),
            }]
        );
    }

    #[test]
    fn empty_date_cell_is_malformed() {
        let roster = Roster {
            columns: header(),
            rows: vec![vec![text("TRK-1"), text("2024-04-01"), Cell::Empty]],
        };
        let loaded = load(&roster).unwrap();
        assert!(loaded.records.is_empty());
        assert_matches!(
            &loaded.rejected[0],
            RowError::MalformedDate { row: 1, column, .. } if column == "Registration_Expiry"
        );
    }

    #[test]
    fn blank_vehicle_id_is_rejected() {
        let roster = Roster {
            columns: header(),
            rows: vec![vec![text("  "), text("2024-04-01"), text("2024-05-01"), text("2024-06-01")]],
        };
        let loaded = load(&roster).unwrap();
        assert_eq!(loaded.rejected, vec![RowError::MissingVehicleId { row: 1 }]);
    }

    #[test]
    fn numeric_vehicle_id_renders_without_fraction() {
        let roster = Roster {
            columns: header(),
            rows: vec![vec![
                Cell::Number(12.0),
                text("2024-04-01"),
                text("2024-05-01"),
                text("2024-06-01"),
            ]],
        };
        assert_eq!(load(&roster).unwrap().records[0].vehicle_id(), "12");
    }

    #[test]
    fn malformed_date_error_names_row_and_column() {
        let err = RowError::MalformedDate {
            row: 4,
            column: "Inspection_Expiry".into(),
            value: "31/02/2024".into(),
        };
        assert_eq!(
            err.to_string(),
            "Row 4: Inspection_Expiry value '31/02/2024' is not a recognisable date"
        );
    }

    // -----------------------------------------------------------------------
    // Date parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_supported_text_formats() {
        let expected = date(2024, 4, 1);
        for input in [
            "2024-04-01",
            "2024/04/01",
            "04/01/2024",
            "4/1/2024",
            "01.04.2024",
            "1 April 2024",
            "1 Apr 2024",
            "April 1, 2024",
            "2024-04-01 00:00:00",
            "2024-04-01T13:45:00",
            "2024-04-01 08:30",
            "2024-04-01T23:59:59+03:00",
        ] {
            assert_eq!(parse_date_text(input), Some(expected), "input: {input}");
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(parse_date_text("2024-02-30"), None);
        assert_eq!(parse_date_text("not a date"), None);
        assert_eq!(parse_date_text(""), None);
    }

    #[test]
    fn serial_dates_use_spreadsheet_epoch() {
        assert_eq!(parse_date_cell(&Cell::Number(45383.0)), Some(date(2024, 4, 1)));
        // Fractional part is a time of day.
        assert_eq!(parse_date_cell(&Cell::Number(45383.75)), Some(date(2024, 4, 1)));
        assert_eq!(parse_date_cell(&Cell::Number(0.0)), None);
        assert_eq!(parse_date_cell(&Cell::Number(-5.0)), None);
    }

    #[test]
    fn serial_dates_before_march_1900_are_rejected() {
        assert_eq!(parse_date_cell(&Cell::Number(1.0)), None);
        assert_eq!(parse_date_cell(&Cell::Number(60.0)), None);
        assert_eq!(parse_date_cell(&Cell::Number(61.0)), Some(date(1900, 3, 1)));
    }

    #[test]
    fn booleans_never_parse_as_dates() {
        assert_eq!(parse_date_cell(&Cell::Bool(true)), None);
    }

    #[test]
    fn cells_deserialize_from_json_values() {
        let row: Vec<Cell> =
            serde_json::from_str(r#"["TRK-1", 45383, null, true, "2024-04-01"]"#).unwrap();
        assert_eq!(
            row,
            vec![
                text("TRK-1"),
                Cell::Number(45383.0),
                Cell::Empty,
                Cell::Bool(true),
                text("2024-04-01"),
            ]
        );
    }
}
