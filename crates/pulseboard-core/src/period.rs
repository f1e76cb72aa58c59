//! Reporting periods and the date windows they map to.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named reporting window selected by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReportingPeriod {
    #[default]
    #[serde(rename = "last7Days")]
    Last7Days,
    #[serde(rename = "last30Days")]
    Last30Days,
    #[serde(rename = "last3Months")]
    Last3Months,
    #[serde(rename = "lastYear")]
    LastYear,
}

impl ReportingPeriod {
    pub const ALL: [ReportingPeriod; 4] = [
        ReportingPeriod::Last7Days,
        ReportingPeriod::Last30Days,
        ReportingPeriod::Last3Months,
        ReportingPeriod::LastYear,
    ];

    /// Strict parse. A missing or blank value selects the default period.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(label) => Self::from_label(label).ok_or_else(|| {
                anyhow!("period must be one of: last7Days, last30Days, last3Months, lastYear")
            }),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "last7Days" => Some(Self::Last7Days),
            "last30Days" => Some(Self::Last30Days),
            "last3Months" => Some(Self::Last3Months),
            "lastYear" => Some(Self::LastYear),
            _ => None,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Last7Days => "last7Days",
            Self::Last30Days => "last30Days",
            Self::Last3Months => "last3Months",
            Self::LastYear => "lastYear",
        }
    }

    /// Human-readable name shown next to the period selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Last7Days => "Last 7 Days",
            Self::Last30Days => "Last 30 Days",
            Self::Last3Months => "Last 3 Months",
            Self::LastYear => "Last Year",
        }
    }

    /// The window this period itself covers, ending today.
    pub fn current_range(&self) -> DateRange {
        let start = match self {
            Self::Last7Days => RangeBoundary::days_ago(7),
            Self::Last30Days => RangeBoundary::days_ago(30),
            Self::Last3Months => RangeBoundary::months_ago(3),
            Self::LastYear => RangeBoundary::years_ago(1),
        };
        DateRange::new(start, RangeBoundary::Today)
    }

    /// The equal-length window immediately before [`current_range`](Self::current_range).
    pub fn previous_range(&self) -> DateRange {
        match self {
            Self::Last7Days => DateRange::new(RangeBoundary::days_ago(14), RangeBoundary::days_ago(7)),
            Self::Last30Days => {
                DateRange::new(RangeBoundary::days_ago(60), RangeBoundary::days_ago(30))
            }
            Self::Last3Months => {
                DateRange::new(RangeBoundary::months_ago(6), RangeBoundary::months_ago(3))
            }
            Self::LastYear => DateRange::new(RangeBoundary::years_ago(2), RangeBoundary::years_ago(1)),
        }
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Resolve the comparison window for a period.
pub fn resolve_previous_period(period: ReportingPeriod) -> DateRange {
    period.previous_range()
}

/// Resolve the comparison window for a raw label. Unknown labels get the
/// `last7Days` window, so this never fails.
pub fn previous_range_for_label(label: &str) -> DateRange {
    ReportingPeriod::from_label(label.trim())
        .unwrap_or_default()
        .previous_range()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffsetUnit {
    Days,
    Months,
    Years,
}

impl OffsetUnit {
    fn singular(&self) -> &'static str {
        match self {
            Self::Days => "day",
            Self::Months => "month",
            Self::Years => "year",
        }
    }
}

/// One end of a [`DateRange`].
///
/// The string form is what the provider receives: `today`, `YYYY-MM-DD`, or a
/// signed offset such as `-14days`, `-3months`, `-1year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeBoundary {
    Today,
    Date(NaiveDate),
    Relative { amount: i32, unit: OffsetUnit },
}

impl RangeBoundary {
    pub fn days_ago(days: i32) -> Self {
        Self::Relative {
            amount: -days,
            unit: OffsetUnit::Days,
        }
    }

    pub fn months_ago(months: i32) -> Self {
        Self::Relative {
            amount: -months,
            unit: OffsetUnit::Months,
        }
    }

    pub fn years_ago(years: i32) -> Self {
        Self::Relative {
            amount: -years,
            unit: OffsetUnit::Years,
        }
    }

    /// Anchor the boundary to a concrete day. Month and year offsets clamp to
    /// the last day of a shorter month.
    pub fn resolve(&self, today: NaiveDate) -> Result<NaiveDate> {
        match *self {
            Self::Today => Ok(today),
            Self::Date(date) => Ok(date),
            Self::Relative { amount, unit } => {
                let resolved = match unit {
                    OffsetUnit::Days => today.checked_add_signed(Duration::days(amount.into())),
                    OffsetUnit::Months => shift_months(today, amount),
                    OffsetUnit::Years => amount
                        .checked_mul(12)
                        .and_then(|months| shift_months(today, months)),
                };
                resolved.ok_or_else(|| anyhow!("date offset {self} out of range"))
            }
        }
    }
}

fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let magnitude = Months::new(months.unsigned_abs());
    if months < 0 {
        date.checked_sub_months(magnitude)
    } else {
        date.checked_add_months(magnitude)
    }
}

impl fmt::Display for RangeBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Relative { amount, unit } => {
                let plural = if amount.unsigned_abs() == 1 { "" } else { "s" };
                write!(f, "{amount}{}{plural}", unit.singular())
            }
        }
    }
}

impl FromStr for RangeBoundary {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw == "today" {
            return Ok(Self::Today);
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(Self::Date(date));
        }

        let digits_end = raw
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
            .map(|(i, _)| i)
            .ok_or_else(|| anyhow!("invalid date boundary: {raw}"))?;
        let (number, unit) = raw.split_at(digits_end);
        let amount: i32 = number
            .parse()
            .map_err(|_| anyhow!("invalid date boundary: {raw}"))?;
        let unit = match unit {
            "day" | "days" => OffsetUnit::Days,
            "month" | "months" => OffsetUnit::Months,
            "year" | "years" => OffsetUnit::Years,
            _ => return Err(anyhow!("invalid date boundary unit: {raw}")),
        };
        Ok(Self::Relative { amount, unit })
    }
}

impl Serialize for RangeBoundary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RangeBoundary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A half-open window `[start_date, end_date)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: RangeBoundary,
    pub end_date: RangeBoundary,
}

impl DateRange {
    pub fn new(start_date: RangeBoundary, end_date: RangeBoundary) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(RangeBoundary::Date(start), RangeBoundary::Date(end))
    }

    /// Anchor both ends to concrete days relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let start = self.start_date.resolve(today)?;
        let end = self.end_date.resolve(today)?;
        if end < start {
            return Err(anyhow!("endDate must be on or after startDate"));
        }
        Ok((start, end))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_date, self.end_date)
    }
}
