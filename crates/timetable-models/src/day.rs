//! Day-of-week value type with the school's localized labels.
//!
//! Days are stored and displayed with their Indonesian labels (`Senin` …
//! `Minggu`). Parsing is case-insensitive and also accepts English names
//! and three-letter abbreviations, since imported sheets are not always
//! consistent. Ordering follows the fixed weekday weight (Monday = 1),
//! never the alphabetical order of the labels.

use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, Type,
    postgres::{PgHasArrayType, PgTypeInfo},
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown day '{0}'")]
pub struct UnknownDay(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Sort weight: Monday = 1 … Sunday = 7.
    pub fn weight(self) -> u8 {
        match self {
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
            DayOfWeek::Sunday => 7,
        }
    }

    /// The stored and displayed label.
    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Senin",
            DayOfWeek::Tuesday => "Selasa",
            DayOfWeek::Wednesday => "Rabu",
            DayOfWeek::Thursday => "Kamis",
            DayOfWeek::Friday => "Jumat",
            DayOfWeek::Saturday => "Sabtu",
            DayOfWeek::Sunday => "Minggu",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            DayOfWeek::Monday => &["senin", "monday", "mon"],
            DayOfWeek::Tuesday => &["selasa", "tuesday", "tue"],
            DayOfWeek::Wednesday => &["rabu", "wednesday", "wed"],
            DayOfWeek::Thursday => &["kamis", "thursday", "thu"],
            DayOfWeek::Friday => &["jumat", "jum'at", "friday", "fri"],
            DayOfWeek::Saturday => &["sabtu", "saturday", "sat"],
            DayOfWeek::Sunday => &["minggu", "ahad", "sunday", "sun"],
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayOfWeek {
    type Err = UnknownDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.aliases().contains(&needle.as_str()))
            .ok_or_else(|| UnknownDay(s.trim().to_string()))
    }
}

impl Serialize for DayOfWeek {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for DayOfWeek {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// Stored as its label in a text column
impl Type<sqlx::Postgres> for DayOfWeek {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for DayOfWeek {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.label(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for DayOfWeek {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<DayOfWeek>()?)
    }
}

impl PgHasArrayType for DayOfWeek {
    fn array_type_info() -> PgTypeInfo {
        <String as PgHasArrayType>::array_type_info()
    }
}
