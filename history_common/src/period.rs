//! History periods selectable on the command line.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

const DAY_SECS: i64 = 86_400;

/// Look-back window for the history page, ending now.
///
/// The string form (`1y`, `6mo`, ...) is used both on the command line and
/// in the output file name.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
)]
#[strum(ascii_case_insensitive)]
pub enum Period {
    #[strum(serialize = "1mo")]
    #[value(name = "1mo")]
    #[serde(rename = "1mo")]
    OneMonth,
    #[strum(serialize = "3mo")]
    #[value(name = "3mo")]
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[strum(serialize = "6mo")]
    #[value(name = "6mo")]
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[strum(serialize = "1y")]
    #[value(name = "1y")]
    #[serde(rename = "1y")]
    OneYear,
    #[strum(serialize = "2y")]
    #[value(name = "2y")]
    #[serde(rename = "2y")]
    TwoYears,
    #[strum(serialize = "5y")]
    #[value(name = "5y")]
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    /// Length of the window in seconds. Months count as 30 days, years as 365.
    pub fn span_secs(self) -> i64 {
        match self {
            Period::OneMonth => 30 * DAY_SECS,
            Period::ThreeMonths => 90 * DAY_SECS,
            Period::SixMonths => 180 * DAY_SECS,
            Period::OneYear => 365 * DAY_SECS,
            Period::TwoYears => 2 * 365 * DAY_SECS,
            Period::FiveYears => 5 * 365 * DAY_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_forms_round_trip() {
        assert_eq!(Period::OneYear.to_string(), "1y");
        assert_eq!("6MO".parse::<Period>().unwrap(), Period::SixMonths);
        assert_eq!(Period::default(), Period::OneYear);
    }

    #[test]
    fn one_year_is_365_days() {
        assert_eq!(Period::OneYear.span_secs(), 86_400 * 365);
    }
}
