use std::sync::OnceLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{LayoutError, ValidationError};
use crate::settings::ValidationSettings;
use crate::util::{ensure_non_empty, ensure_unique};
use crate::well;

// https://ngff.openmicroscopy.org/0.4/#plate-md

fn alphanumeric() -> &'static Regex {
    static ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();
    ALPHANUMERIC.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("Could not construct regex"))
}

#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
}

#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub name: String,
}

/// A well as listed by its plate.
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Well {
    // "{row name}/{column name}", relative to the plate group
    pub path: String,

    #[serde(rename = "rowIndex")]
    pub row_index: usize,

    #[serde(rename = "columnIndex")]
    pub column_index: usize,
}

fn undefined_name() -> Option<String> {
    Some("Undefined".to_string())
}

#[derive(Deserialize)]
pub(crate) struct RawPlate {
    #[serde(default = "undefined_name")]
    pub name: Option<String>,

    pub version: Option<String>,

    // [sic!]
    pub field_count: Option<u64>,

    #[serde(default)]
    pub acquisitions: Vec<Value>,

    pub columns: Vec<Column>,

    pub rows: Vec<Row>,

    pub wells: Vec<Well>,
}

#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Plate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_count: Option<u64>,

    pub acquisitions: Vec<Value>,

    pub columns: Vec<Column>,

    pub rows: Vec<Row>,

    pub wells: Vec<Well>,
}

impl<'de> Deserialize<'de> for Plate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawPlate::deserialize(deserializer)?;
        Plate::try_from(raw).map_err(D::Error::custom)
    }
}

impl TryFrom<RawPlate> for Plate {
    type Error = ValidationError;

    fn try_from(raw: RawPlate) -> Result<Self, Self::Error> {
        Plate::from_raw(raw, &ValidationSettings::default())
    }
}

impl Plate {
    pub(crate) fn from_raw(raw: RawPlate, settings: &ValidationSettings) -> Result<Self, ValidationError> {
        ensure_non_empty("columns", &raw.columns)?;
        ensure_non_empty("rows", &raw.rows)?;
        ensure_non_empty("wells", &raw.wells)?;
        ensure_unique("columns", raw.columns.iter().map(|c| c.name.as_str()))?;
        ensure_unique("rows", raw.rows.iter().map(|r| r.name.as_str()))?;
        ensure_unique("wells", raw.wells.iter().map(|w| w.path.as_str()))?;

        let plate = Plate {
            name: raw.name,
            version: raw.version,
            field_count: raw.field_count,
            acquisitions: raw.acquisitions,
            columns: raw.columns,
            rows: raw.rows,
            wells: raw.wells,
        };
        if settings.check_plate_layout {
            plate.check_layout()?;
        }
        Ok(plate)
    }

    fn check_layout(&self) -> Result<(), LayoutError> {
        let names = self
            .columns
            .iter()
            .map(|c| ("columns", c.name.as_str()))
            .chain(self.rows.iter().map(|r| ("rows", r.name.as_str())));
        for (list, name) in names {
            if !alphanumeric().is_match(name) {
                return Err(LayoutError::InvalidName {
                    list: list.to_string(),
                    name: name.to_string(),
                });
            }
        }

        for w in self.wells.iter() {
            let row = self.rows.get(w.row_index).ok_or_else(|| LayoutError::WellIndexOutOfRange {
                path: w.path.clone(),
                list: "rows".to_string(),
                index: w.row_index,
                len: self.rows.len(),
            })?;
            let column = self.columns.get(w.column_index).ok_or_else(|| LayoutError::WellIndexOutOfRange {
                path: w.path.clone(),
                list: "columns".to_string(),
                index: w.column_index,
                len: self.columns.len(),
            })?;
            let expected = format!("{}/{}", row.name, column.name);
            if w.path != expected {
                return Err(LayoutError::WellPathMismatch {
                    path: w.path.clone(),
                    expected,
                });
            }
        }
        Ok(())
    }

    pub fn acquisition_count(&self) -> usize {
        self.acquisitions.len()
    }

    pub fn well(&self, path: &str) -> Option<&Well> {
        self.wells.iter().find(|w| w.path == path)
    }

    /// Checks the `well` attributes found at `path` against this plate.
    /// If the plate has more than one acquisition, every image of the well must name one.
    pub fn check_well(&self, path: &str, well: &well::Well) -> Result<(), LayoutError> {
        if self.acquisition_count() > 1 && well.images.iter().any(|i| i.acquisition.is_none()) {
            return Err(LayoutError::MissingAcquisition {
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

pub fn parse_plate(raw: Value) -> Result<Plate, ValidationError> {
    parse_plate_with(raw, &ValidationSettings::default())
}

pub fn parse_plate_with(raw: Value, settings: &ValidationSettings) -> Result<Plate, ValidationError> {
    let raw: RawPlate = serde_json::from_value(raw)?;
    Plate::from_raw(raw, settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureError;
    use crate::well::parse_well;
    use proptest::prelude::*;
    use serde_json::json;

    fn plate_json() -> Value {
        json!({
            "name": "test",
            "version": "0.4",
            "field_count": 4,
            "acquisitions": [
                {"id": 1, "maximumfieldcount": 2, "name": "Meas_01(2012-07-31_10-41-12)", "starttime": 1343731272000i64},
                {"id": 2, "maximumfieldcount": 2, "name": "Meas_02(201207-31_11-56-41)", "starttime": 1343735801000i64}
            ],
            "columns": [{"name": "1"}, {"name": "2"}, {"name": "3"}],
            "rows": [{"name": "A"}, {"name": "B"}],
            "wells": [
                {"path": "A/1", "rowIndex": 0, "columnIndex": 0},
                {"path": "A/2", "rowIndex": 0, "columnIndex": 1},
                {"path": "B/3", "rowIndex": 1, "columnIndex": 2}
            ]
        })
    }

    #[test]
    fn parse_valid_plate() {
        let plate = parse_plate(plate_json()).unwrap();
        assert_eq!(plate.name.as_deref(), Some("test"));
        assert_eq!(plate.acquisition_count(), 2);
        assert_eq!(plate.well("B/3").map(|w| w.column_index), Some(2));
    }

    #[test]
    fn missing_name_defaults_to_undefined() {
        let mut raw = plate_json();
        raw.as_object_mut().unwrap().remove("name");
        assert_eq!(parse_plate(raw).unwrap().name.as_deref(), Some("Undefined"));
    }

    #[test]
    fn null_name_stays_empty() {
        let mut raw = plate_json();
        raw["name"] = Value::Null;
        assert_eq!(parse_plate(raw).unwrap().name, None);
    }

    #[test]
    fn acquisitions_are_optional() {
        let mut raw = plate_json();
        raw.as_object_mut().unwrap().remove("acquisitions");
        assert_eq!(parse_plate(raw).unwrap().acquisition_count(), 0);
    }

    #[test]
    fn empty_lists_fail() {
        for list in ["columns", "rows", "wells"] {
            let mut raw = plate_json();
            raw[list] = json!([]);
            assert!(matches!(
                parse_plate(raw),
                Err(ValidationError::Structure(StructureError::EmptyRequiredList(l))) if l == list
            ));
        }
    }

    #[test]
    fn duplicate_columns_fail() {
        let mut raw = plate_json();
        raw["columns"][2]["name"] = json!("1");
        assert!(matches!(
            parse_plate(raw),
            Err(ValidationError::Structure(StructureError::DuplicateEntry { list, key })) if list == "columns" && key == "1"
        ));
    }

    #[test]
    fn duplicate_wells_fail() {
        let mut raw = plate_json();
        raw["wells"][1] = json!({"path": "A/1", "rowIndex": 0, "columnIndex": 0});
        assert!(matches!(
            parse_plate(raw),
            Err(ValidationError::Structure(StructureError::DuplicateEntry { list, .. })) if list == "wells"
        ));
    }

    #[test]
    fn non_alphanumeric_row_fails() {
        let mut raw = plate_json();
        raw["rows"][1]["name"] = json!("B-1");
        assert!(matches!(
            parse_plate(raw),
            Err(ValidationError::Layout(LayoutError::InvalidName { list, .. })) if list == "rows"
        ));
    }

    #[test]
    fn well_index_out_of_range_fails() {
        let mut raw = plate_json();
        raw["wells"][2]["rowIndex"] = json!(2);
        assert!(matches!(
            parse_plate(raw),
            Err(ValidationError::Layout(LayoutError::WellIndexOutOfRange { index: 2, len: 2, .. }))
        ));
    }

    #[test]
    fn well_path_must_match_indices() {
        let mut raw = plate_json();
        raw["wells"][2]["path"] = json!("B/2");
        assert!(matches!(
            parse_plate(raw),
            Err(ValidationError::Layout(LayoutError::WellPathMismatch { expected, .. })) if expected == "B/3"
        ));
    }

    #[test]
    fn layout_check_can_be_disabled() {
        let mut raw = plate_json();
        raw["wells"][2]["path"] = json!("somewhere/else");
        let settings = ValidationSettings {
            check_plate_layout: false,
            ..Default::default()
        };
        assert!(parse_plate_with(raw, &settings).is_ok());
    }

    #[test]
    fn wells_must_name_acquisitions_on_multi_acquisition_plates() {
        let plate = parse_plate(plate_json()).unwrap();
        let well = parse_well(json!({"images": [{"path": "0", "acquisition": 1}, {"path": "1"}]})).unwrap();
        assert_eq!(
            plate.check_well("A/1", &well),
            Err(LayoutError::MissingAcquisition { path: "A/1".to_string() })
        );
    }

    proptest! {
        #[test]
        fn parsing_is_idempotent(columns in 1usize..12, rows in 1usize..8) {
            let row_names: Vec<String> = (0..rows).map(|r| ((b'A' + r as u8) as char).to_string()).collect();
            let wells: Vec<Value> = row_names
                .iter()
                .enumerate()
                .flat_map(|(r, row)| (0..columns).map(move |c| json!({
                    "path": format!("{}/{}", row, c + 1),
                    "rowIndex": r,
                    "columnIndex": c
                })))
                .collect();
            let raw = json!({
                "columns": (1..=columns).map(|c| json!({"name": c.to_string()})).collect::<Vec<Value>>(),
                "rows": row_names.iter().map(|r| json!({"name": r})).collect::<Vec<Value>>(),
                "wells": wells
            });
            let first = parse_plate(raw.clone()).unwrap();
            prop_assert_eq!(first.wells.len(), rows * columns);
            prop_assert_eq!(first, parse_plate(raw).unwrap());
        }
    }
}
