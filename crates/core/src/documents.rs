//! Tracked vehicle compliance documents.
//!
//! A [`DocumentRecord`] holds one vehicle's expiry date for each
//! [`DocumentType`]. Records are built by the roster loader and never
//! mutated afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Roster column holding the vehicle identifier.
pub const COLUMN_VEHICLE_ID: &str = "Vehicle_ID";

/// Roster column holding the inspection expiry date.
pub const COLUMN_INSPECTION_EXPIRY: &str = "Inspection_Expiry";

/// Roster column holding the registration expiry date.
pub const COLUMN_REGISTRATION_EXPIRY: &str = "Registration_Expiry";

/// Roster column holding the operating card expiry date.
pub const COLUMN_OPERATING_CARD_EXPIRY: &str = "Operating_Card_Expiry";

/// Every column a roster must carry, in sheet order.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COLUMN_VEHICLE_ID,
    COLUMN_INSPECTION_EXPIRY,
    COLUMN_REGISTRATION_EXPIRY,
    COLUMN_OPERATING_CARD_EXPIRY,
];

// ---------------------------------------------------------------------------
// DocumentType
// ---------------------------------------------------------------------------

/// A compliance document tracked per vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Inspection,
    Registration,
    OperatingCard,
}

impl DocumentType {
    /// Fixed evaluation order used by the rule engine and reports.
    pub const ALL: [DocumentType; 3] = [
        DocumentType::Inspection,
        DocumentType::Registration,
        DocumentType::OperatingCard,
    ];

    /// Display label used in reminder text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Inspection => "Inspection",
            Self::Registration => "Registration",
            Self::OperatingCard => "Operating Card",
        }
    }

    /// Roster column the expiry date is read from.
    pub fn column(self) -> &'static str {
        match self {
            Self::Inspection => COLUMN_INSPECTION_EXPIRY,
            Self::Registration => COLUMN_REGISTRATION_EXPIRY,
            Self::OperatingCard => COLUMN_OPERATING_CARD_EXPIRY,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// DocumentRecord
// ---------------------------------------------------------------------------

/// One roster row: a vehicle and the expiry date of each tracked document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    vehicle_id: String,
    inspection_expiry: NaiveDate,
    registration_expiry: NaiveDate,
    operating_card_expiry: NaiveDate,
}

impl DocumentRecord {
    /// Build a record, rejecting a blank vehicle id.
    pub fn new(
        vehicle_id: impl Into<String>,
        inspection_expiry: NaiveDate,
        registration_expiry: NaiveDate,
        operating_card_expiry: NaiveDate,
    ) -> Result<Self, CoreError> {
        let vehicle_id = vehicle_id.into().trim().to_string();
        if vehicle_id.is_empty() {
            return Err(CoreError::Validation(format!(
                "{COLUMN_VEHICLE_ID} must not be empty"
            )));
        }
        Ok(Self {
            vehicle_id,
            inspection_expiry,
            registration_expiry,
            operating_card_expiry,
        })
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Expiry date of the given document.
    pub fn expiry(&self, document: DocumentType) -> NaiveDate {
        match document {
            DocumentType::Inspection => self.inspection_expiry,
            DocumentType::Registration => self.registration_expiry,
            DocumentType::OperatingCard => self.operating_card_expiry,
        }
    }

    /// All documents with their expiry dates, in [`DocumentType::ALL`] order.
    pub fn documents(&self) -> impl Iterator<Item = (DocumentType, NaiveDate)> + '_ {
        DocumentType::ALL.into_iter().map(|d| (d, self.expiry(d)))
    }
}
