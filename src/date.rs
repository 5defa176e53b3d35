use crate::{Error, Result};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const FORMAT: &str = "%y%m%d";

/// A day in the APOD archive, written as `YYMMDD` like the site's page names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateCode(NaiveDate);

impl DateCode {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn back(&self) -> Self {
        self.back_by(1)
    }

    pub fn back_by(&self, days: u32) -> Self {
        Self(self.0 - Duration::days(i64::from(days)))
    }
}

impl FromStr for DateCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // chrono accepts fewer digits per field, the archive names never do
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, FORMAT)
            .map(Self)
            .map_err(|_| Error::InvalidDate(s.to_string()))
    }
}

impl TryFrom<String> for DateCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DateCode> for String {
    fn from(code: DateCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for DateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}
