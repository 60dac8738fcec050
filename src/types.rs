use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::error::LottoError;
use crate::utils::{format_date_for_api, join_numbers};

pub const GAME_TYPE: &str = "Lotto";

/// Raw payload returned by the draw results endpoint, kept as decoded JSON.
pub type DrawResult = Value;

/// Parameters of a single by-date request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawQuery {
    pub date: NaiveDate,
    pub game_type: &'static str,
}

impl DrawQuery {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, game_type: GAME_TYPE }
    }

    /// First two items of the day, base game before Plus.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("gameType", self.game_type.to_string()),
            ("drawDate", format_date_for_api(self.date)),
            ("index", "1".to_string()),
            ("size", "2".to_string()),
            ("sort", "drawSystemId".to_string()),
            ("order", "ASC".to_string()),
        ]
    }
}

/// One line of the exported CSV file, fields in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub date: String,
    pub numbers: String,
    pub plus_numbers: String,
}

impl ExportRow {
    /// Turns a fetched payload into a row.
    ///
    /// `Ok(None)` means there was no draw: no payload, or an absent or empty
    /// `items` array. Once `items` has entries the nested `results[0].resultsJson`
    /// arrays must be present, otherwise the payload is reported as malformed.
    pub fn from_draw_result(
        date: NaiveDate,
        result: Option<&DrawResult>,
    ) -> Result<Option<Self>, LottoError> {
        let Some(result) = result else {
            return Ok(None);
        };

        let items = match result.get("items") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(LottoError::malformed(date, "`items` is not an array")),
        };

        let Some(first) = items.first() else {
            return Ok(None);
        };

        let numbers = drawn_numbers(date, first, 0)?;
        let plus_numbers = match items.get(1) {
            Some(second) => drawn_numbers(date, second, 1)?,
            None => Vec::new(),
        };

        Ok(Some(Self {
            date: format_date_for_api(date),
            numbers: join_numbers(&numbers),
            plus_numbers: join_numbers(&plus_numbers),
        }))
    }
}

fn drawn_numbers(date: NaiveDate, item: &Value, index: usize) -> Result<Vec<i64>, LottoError> {
    let values = item
        .pointer("/results/0/resultsJson")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            LottoError::malformed(date, format!("items[{index}] has no results[0].resultsJson"))
        })?;

    values
        .iter()
        .map(|v| {
            v.as_i64().ok_or_else(|| {
                LottoError::malformed(date, format!("items[{index}] contains non-integer number {v}"))
            })
        })
        .collect()
}
