//! Request, response, and record types for the Better availability API.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Local, NaiveDateTime};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Parameters that stay constant across one batch; only the day varies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    pub venue_name: String,
    pub activity_name: String,
    /// URL template carrying `{venue_name}` and `{activity_name}` placeholders.
    pub base_url: String,
}

impl AvailabilityQuery {
    #[must_use]
    pub fn from_search(search: &courtwatch_core::SearchConfig) -> Self {
        Self {
            venue_name: search.venue_name.clone(),
            activity_name: search.activity_name.clone(),
            base_url: search.base_url.clone(),
        }
    }
}

/// One HTTP response as received, body left unparsed.
///
/// Bodies of non-200 responses are never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub day: NaiveDateTime,
    pub status: u16,
    pub body: String,
}

/// Status code the API uses for "no sessions on this date".
pub const STATUS_NO_DATA: u16 = 422;

/// Per-day classification, kept for diagnostics only. The aggregate pipeline
/// treats every non-success outcome the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    Success,
    NoData,
    Failed { status: u16 },
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    #[must_use]
    pub fn outcome(&self) -> DayOutcome {
        match self.status {
            200 => DayOutcome::Success,
            STATUS_NO_DATA => DayOutcome::NoData,
            status => DayOutcome::Failed { status },
        }
    }
}

/// A recognized output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Timestamp,
    Spaces,
    Duration,
    Price,
}

impl Column {
    pub const ALL: [Column; 4] = [
        Column::Timestamp,
        Column::Spaces,
        Column::Duration,
        Column::Price,
    ];

    /// The key this column is read from in a raw record and written to on output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Spaces => "spaces",
            Column::Duration => "duration",
            Column::Price => "price",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A coerced value for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Timestamp(DateTime<Local>),
    Spaces(i64),
    Duration(Duration),
    /// Display-ready amount; `None` when the API sent a price without one.
    Price(Option<String>),
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            CellValue::Spaces(n) => serializer.serialize_i64(*n),
            CellValue::Duration(d) => serializer.serialize_i64(d.num_minutes()),
            CellValue::Price(Some(amount)) => serializer.serialize_str(amount),
            CellValue::Price(None) => serializer.serialize_none(),
        }
    }
}

/// A normalized availability slot.
///
/// Holds only the recognized columns that were present in the raw record.
/// A column absent from the raw record is absent here too, which is distinct
/// from a present column with a null value (only possible for `price`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedRecord {
    cells: BTreeMap<Column, CellValue>,
}

impl ProcessedRecord {
    pub(crate) fn insert(&mut self, column: Column, value: CellValue) {
        self.cells.insert(column, value);
    }

    #[must_use]
    pub fn get(&self, column: Column) -> Option<&CellValue> {
        self.cells.get(&column)
    }

    #[must_use]
    pub fn contains(&self, column: Column) -> bool {
        self.cells.contains_key(&column)
    }

    #[must_use]
    pub fn columns(&self) -> BTreeSet<Column> {
        self.cells.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Local>> {
        match self.cells.get(&Column::Timestamp) {
            Some(CellValue::Timestamp(ts)) => Some(*ts),
            _ => None,
        }
    }

    #[must_use]
    pub fn spaces(&self) -> Option<i64> {
        match self.cells.get(&Column::Spaces) {
            Some(CellValue::Spaces(n)) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        match self.cells.get(&Column::Duration) {
            Some(CellValue::Duration(d)) => Some(*d),
            _ => None,
        }
    }

    /// `None` if the record had no price; `Some(None)` if it had a price
    /// without a `formatted_amount`.
    #[must_use]
    pub fn price(&self) -> Option<Option<&str>> {
        match self.cells.get(&Column::Price) {
            Some(CellValue::Price(amount)) => Some(amount.as_deref()),
            _ => None,
        }
    }
}

impl Serialize for ProcessedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column.name(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn response(status: u16) -> RawResponse {
        RawResponse {
            day: NaiveDate::from_ymd_opt(2025, 5, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn outcome_classifies_statuses() {
        assert_eq!(response(200).outcome(), DayOutcome::Success);
        assert_eq!(response(422).outcome(), DayOutcome::NoData);
        assert_eq!(
            response(503).outcome(),
            DayOutcome::Failed { status: 503 }
        );
    }

    #[test]
    fn only_200_is_success() {
        assert!(response(200).is_success());
        assert!(!response(201).is_success());
        assert!(!response(422).is_success());
    }

    #[test]
    fn column_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("location"), None);
    }

    #[test]
    fn serializes_present_columns_only() {
        let mut record = ProcessedRecord::default();
        record.insert(Column::Spaces, CellValue::Spaces(4));
        record.insert(Column::Duration, CellValue::Duration(Duration::minutes(90)));
        record.insert(Column::Price, CellValue::Price(None));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"spaces": 4, "duration": 90, "price": null})
        );
    }

    #[test]
    fn price_accessor_distinguishes_absent_from_null() {
        let mut record = ProcessedRecord::default();
        assert_eq!(record.price(), None);
        record.insert(Column::Price, CellValue::Price(None));
        assert_eq!(record.price(), Some(None));
        record.insert(Column::Price, CellValue::Price(Some("£6.50".to_string())));
        assert_eq!(record.price(), Some(Some("£6.50")));
    }
}
