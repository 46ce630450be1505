// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Datelike;
use chrono::Duration;
use chrono::NaiveDateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::Error as _;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::invalid;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Accepted layouts for timestamps that carry no zone offset.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Last year that RFC 3339 can write with four digits.
const MAX_YEAR: i32 = 9999;

/// A point in time, always in UTC.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts)
    }

    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Parse an ISO-8601 timestamp. Offsets are converted to UTC; a
    /// timestamp without an offset is taken to already be in UTC.
    pub fn parse(s: &str) -> Fallible<Self> {
        let s = s.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(ts.with_timezone(&Utc)));
        }
        for format in NAIVE_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(Self(ts.and_utc()));
            }
        }
        invalid(format!("invalid timestamp: {s:?}"))
    }

    /// Format as RFC 3339 with a `Z` suffix.
    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Fractional days from `earlier` to `self`. Negative if `earlier` is
    /// actually later.
    pub fn days_since(self, earlier: Timestamp) -> f64 {
        let delta = self.0 - earlier.0;
        delta.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
    }

    /// Add `duration`. Fails if the result cannot be written back as an
    /// RFC 3339 timestamp.
    pub fn plus(self, duration: Duration) -> Fallible<Self> {
        match self.0.checked_add_signed(duration) {
            Some(ts) if ts.year() <= MAX_YEAR => Ok(Self(ts)),
            _ => invalid(format!(
                "{self} plus {} days is past the year {MAX_YEAR}",
                duration.num_days()
            )),
        }
    }
}

impl FromStr for Timestamp {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        Timestamp::parse(&string).map_err(|e| D::Error::custom(e.message()))
    }
}
