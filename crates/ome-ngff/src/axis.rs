use std::hash::{Hash, Hasher};

use serde::de::value::Error as ValueError;
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Serialize};

// https://ngff.openmicroscopy.org/0.4/#axes-md

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceUnit {
    Angstrom,
    Attometer,
    Centimeter,
    Decimeter,
    Exameter,
    Femtometer,
    Foot,
    Gigameter,
    Hectometer,
    Inch,
    Kilometer,
    Megameter,
    Meter,
    Micrometer,
    Mile,
    Millimeter,
    Nanometer,
    Parsec,
    Petameter,
    Picometer,
    Terameter,
    Yard,
    Yoctometer,
    Yottameter,
    Zeptometer,
    Zettameter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Attosecond,
    Centisecond,
    Day,
    Decisecond,
    Exasecond,
    Femtosecond,
    Gigasecond,
    Hectosecond,
    Hour,
    Kilosecond,
    Megasecond,
    Microsecond,
    Millisecond,
    Minute,
    Nanosecond,
    Petasecond,
    Picosecond,
    Second,
    Terasecond,
    Yoctosecond,
    Yottasecond,
    Zeptosecond,
    Zettasecond,
}

/// The conventional axis types. Anything else (including a missing type) is a custom axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisKind {
    Space,
    Time,
    Channel,
    Custom,
}

impl AxisKind {
    pub fn of(kind: Option<&str>) -> Self {
        match kind {
            Some("space") => AxisKind::Space,
            Some("time") => AxisKind::Time,
            Some("channel") => AxisKind::Channel,
            _ => AxisKind::Custom,
        }
    }
}

/// One dimension of a multiscale image.
///
/// An axis is identified by its name: two axes hash equally if their names are equal, and
/// uniqueness within a multiscale is checked on names alone. Equality is structural, so two
/// axes with the same name but a different type or unit are not equal.
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,

    // SHOULD be one of "space", "time" or "channel", but MAY take other values
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Axis {
    pub fn new<N: Into<String>>(name: N, kind: Option<&str>, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: kind.map(str::to_string),
            unit: unit.map(str::to_string),
        }
    }

    pub fn axis_kind(&self) -> AxisKind {
        AxisKind::of(self.kind.as_deref())
    }

    pub fn space_unit(&self) -> Option<SpaceUnit> {
        self.unit.as_deref().and_then(parse_unit)
    }

    pub fn time_unit(&self) -> Option<TimeUnit> {
        self.unit.as_deref().and_then(parse_unit)
    }

    /// Returns false if a space or time axis carries a unit that is not part of the UDUNITS-2
    /// subset listed by OME-NGFF.
    pub fn has_recognized_unit(&self) -> bool {
        match (self.axis_kind(), &self.unit) {
            (_, None) => true,
            (AxisKind::Space, Some(_)) => self.space_unit().is_some(),
            (AxisKind::Time, Some(_)) => self.time_unit().is_some(),
            _ => true,
        }
    }
}

impl Hash for Axis {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

fn parse_unit<T: DeserializeOwned>(unit: &str) -> Option<T> {
    T::deserialize(IntoDeserializer::<ValueError>::into_deserializer(unit)).ok()
}
