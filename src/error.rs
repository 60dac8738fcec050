//! Error types for the draw history exporter

use chrono::NaiveDate;
use reqwest::StatusCode;
use thiserror::Error;

/// A fetch that did not end in either a payload or a 404
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("draw results request for {date} failed with status {status}")]
    Status { date: NaiveDate, status: StatusCode },

    #[error("draw results request for {date} could not be completed: {source}")]
    Transport {
        date: NaiveDate,
        #[source]
        source: reqwest::Error,
    },

    #[error("draw results for {date} are not valid JSON: {source}")]
    Decode {
        date: NaiveDate,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors that stop a harvest run
#[derive(Error, Debug)]
pub enum LottoError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("malformed draw results for {date}: {reason}")]
    MalformedPayload { date: NaiveDate, reason: String },
}

impl LottoError {
    pub fn malformed(date: NaiveDate, reason: impl Into<String>) -> Self {
        Self::MalformedPayload { date, reason: reason.into() }
    }
}

/// Errors raised while writing the CSV file
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
