use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;

/// A single vehicle registration row read from the population dataset.
///
/// Numeric fields hold `0` when the source cell was absent or could not be
/// parsed. Use [`VehicleRecord::known_range`] and
/// [`VehicleRecord::known_model_year`] for the "absent" view of that sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    /// First ten characters of the VIN. Not validated, not unique.
    pub vin: String,
    pub county: String,
    pub city: String,
    pub state: String,
    /// Kept as text so leading zeros survive.
    pub postal_code: String,
    pub model_year: i64,
    pub make: String,
    pub model: String,
    /// Free text; usually contains `"BEV"` or `"PHEV"`.
    pub electric_vehicle_type: String,
    /// Free text; usually contains `"Eligible"` or `"Not eligible"`.
    pub cafv_eligibility: String,
    /// Miles on a full charge. `0` or negative means not reported.
    pub electric_range: i64,
    #[serde(rename = "baseMSRP")]
    pub base_msrp: i64,
    pub legislative_district: String,
    pub dol_vehicle_id: String,
    pub vehicle_location: String,
    pub electric_utility: String,
    pub census_tract: String,
}

impl VehicleRecord {
    /// Stringified value of `field`, as used for grouping.
    ///
    /// Integer fields are rendered in decimal, so a missing model year groups
    /// under `"0"`.
    pub fn field_value(&self, field: RecordField) -> Cow<'_, str> {
        match field {
            RecordField::Vin => Cow::Borrowed(&self.vin),
            RecordField::County => Cow::Borrowed(&self.county),
            RecordField::City => Cow::Borrowed(&self.city),
            RecordField::State => Cow::Borrowed(&self.state),
            RecordField::PostalCode => Cow::Borrowed(&self.postal_code),
            RecordField::ModelYear => Cow::Owned(self.model_year.to_string()),
            RecordField::Make => Cow::Borrowed(&self.make),
            RecordField::Model => Cow::Borrowed(&self.model),
            RecordField::ElectricVehicleType => Cow::Borrowed(&self.electric_vehicle_type),
            RecordField::CafvEligibility => Cow::Borrowed(&self.cafv_eligibility),
            RecordField::ElectricRange => Cow::Owned(self.electric_range.to_string()),
            RecordField::BaseMsrp => Cow::Owned(self.base_msrp.to_string()),
            RecordField::LegislativeDistrict => Cow::Borrowed(&self.legislative_district),
            RecordField::DolVehicleId => Cow::Borrowed(&self.dol_vehicle_id),
            RecordField::VehicleLocation => Cow::Borrowed(&self.vehicle_location),
            RecordField::ElectricUtility => Cow::Borrowed(&self.electric_utility),
            RecordField::CensusTract => Cow::Borrowed(&self.census_tract),
        }
    }

    /// Electric range when it was actually reported (strictly positive).
    pub fn known_range(&self) -> Option<i64> {
        (self.electric_range > 0).then_some(self.electric_range)
    }

    /// Model year unless it is the `0` placeholder.
    pub fn known_model_year(&self) -> Option<i64> {
        (self.model_year != 0).then_some(self.model_year)
    }

    pub fn vehicle_type(&self) -> VehicleType {
        VehicleType::classify(&self.electric_vehicle_type)
    }

    pub fn eligibility(&self) -> Eligibility {
        Eligibility::classify(&self.cafv_eligibility)
    }
}

// ── RecordField ───────────────────────────────────────────────────────────────

/// Names every column of a [`VehicleRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    Vin,
    County,
    City,
    State,
    PostalCode,
    ModelYear,
    Make,
    Model,
    ElectricVehicleType,
    CafvEligibility,
    ElectricRange,
    #[serde(rename = "baseMSRP")]
    BaseMsrp,
    LegislativeDistrict,
    DolVehicleId,
    VehicleLocation,
    ElectricUtility,
    CensusTract,
}

impl RecordField {
    /// Every field, in dataset column order.
    pub const ALL: [RecordField; 17] = [
        RecordField::Vin,
        RecordField::County,
        RecordField::City,
        RecordField::State,
        RecordField::PostalCode,
        RecordField::ModelYear,
        RecordField::Make,
        RecordField::Model,
        RecordField::ElectricVehicleType,
        RecordField::CafvEligibility,
        RecordField::ElectricRange,
        RecordField::BaseMsrp,
        RecordField::LegislativeDistrict,
        RecordField::DolVehicleId,
        RecordField::VehicleLocation,
        RecordField::ElectricUtility,
        RecordField::CensusTract,
    ];

    /// Exact header text of the source column this field is read from.
    pub fn column_name(self) -> &'static str {
        match self {
            RecordField::Vin => "VIN (1-10)",
            RecordField::County => "County",
            RecordField::City => "City",
            RecordField::State => "State",
            RecordField::PostalCode => "Postal Code",
            RecordField::ModelYear => "Model Year",
            RecordField::Make => "Make",
            RecordField::Model => "Model",
            RecordField::ElectricVehicleType => "Electric Vehicle Type",
            RecordField::CafvEligibility => "Clean Alternative Fuel Vehicle (CAFV) Eligibility",
            RecordField::ElectricRange => "Electric Range",
            RecordField::BaseMsrp => "Base MSRP",
            RecordField::LegislativeDistrict => "Legislative District",
            RecordField::DolVehicleId => "DOL Vehicle ID",
            RecordField::VehicleLocation => "Vehicle Location",
            RecordField::ElectricUtility => "Electric Utility",
            RecordField::CensusTract => "2020 Census Tract",
        }
    }

    /// camelCase key, e.g. `"modelYear"`.
    pub fn key(self) -> &'static str {
        match self {
            RecordField::Vin => "vin",
            RecordField::County => "county",
            RecordField::City => "city",
            RecordField::State => "state",
            RecordField::PostalCode => "postalCode",
            RecordField::ModelYear => "modelYear",
            RecordField::Make => "make",
            RecordField::Model => "model",
            RecordField::ElectricVehicleType => "electricVehicleType",
            RecordField::CafvEligibility => "cafvEligibility",
            RecordField::ElectricRange => "electricRange",
            RecordField::BaseMsrp => "baseMSRP",
            RecordField::LegislativeDistrict => "legislativeDistrict",
            RecordField::DolVehicleId => "dolVehicleId",
            RecordField::VehicleLocation => "vehicleLocation",
            RecordField::ElectricUtility => "electricUtility",
            RecordField::CensusTract => "censusTract",
        }
    }

    /// Whether the field is parsed as an integer rather than kept as text.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            RecordField::ModelYear | RecordField::ElectricRange | RecordField::BaseMsrp
        )
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RecordField {
    type Err = DashboardError;

    /// Accepts the camelCase key or its snake_case spelling, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        RecordField::ALL
            .into_iter()
            .find(|field| field.key().to_lowercase() == wanted)
            .ok_or_else(|| DashboardError::UnknownField(s.to_string()))
    }
}

// ── Classifications ───────────────────────────────────────────────────────────

/// Powertrain category derived from the free-text vehicle type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    /// Battery electric.
    Bev,
    /// Plug-in hybrid.
    Phev,
    Other,
}

impl VehicleType {
    /// `"BEV"` is checked before `"PHEV"`.
    pub fn classify(raw: &str) -> Self {
        if raw.contains("BEV") {
            VehicleType::Bev
        } else if raw.contains("PHEV") {
            VehicleType::Phev
        } else {
            VehicleType::Other
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            VehicleType::Bev => "BEV",
            VehicleType::Phev => "PHEV",
            VehicleType::Other => "Other",
        }
    }
}

/// Clean Alternative Fuel Vehicle eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    Eligible,
    NotEligible,
    Unknown,
}

impl Eligibility {
    /// Case-sensitive: `"Not eligible"` does not contain `"Eligible"`.
    pub fn classify(raw: &str) -> Self {
        if raw.contains("Eligible") {
            Eligibility::Eligible
        } else if raw.contains("Not eligible") {
            Eligibility::NotEligible
        } else {
            Eligibility::Unknown
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Eligibility::Eligible => "Eligible",
            Eligibility::NotEligible => "Not Eligible",
            Eligibility::Unknown => "Unknown",
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
