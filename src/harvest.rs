//! Walks the archive one day at a time and collects export rows.
//!
//! A run ends either when the end date has been fetched ([`RunOutcome::Completed`])
//! or at the first fatal error ([`RunOutcome::Aborted`]). In both cases the rows
//! gathered so far are handed back so they can still be exported.

use chrono::NaiveDate;
use std::time::Duration;
use tracing::{error, info};

use crate::api::DrawSource;
use crate::error::LottoError;
use crate::types::ExportRow;
use crate::utils::days_between;

/// Wait inserted between two consecutive requests.
#[allow(async_fn_in_trait)]
pub trait Pacer {
    async fn pause(&self);
}

/// Sleeps for a fixed interval, keeping the upstream API from being hammered.
#[derive(Debug, Clone, Copy)]
pub struct Sleep(pub Duration);

impl Pacer for Sleep {
    async fn pause(&self) {
        tokio::time::sleep(self.0).await;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Pacer for NoDelay {
    async fn pause(&self) {}
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed,
    Aborted { date: NaiveDate, error: LottoError },
}

impl RunOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted { .. })
    }
}

#[derive(Debug)]
pub struct HarvestReport {
    /// Rows in ascending date order.
    pub rows: Vec<ExportRow>,
    /// Dates fetched without a draw.
    pub skipped: usize,
    pub outcome: RunOutcome,
}

pub struct Harvester<S, P> {
    source: S,
    pacer: P,
    start: NaiveDate,
    end: NaiveDate,
}

impl<S: DrawSource, P: Pacer> Harvester<S, P> {
    pub fn new(source: S, pacer: P, start: NaiveDate, end: NaiveDate) -> Self {
        Self { source, pacer, start, end }
    }

    pub async fn run(&self) -> HarvestReport {
        info!("Fetching Lotto draws from {} to {}", self.start, self.end);

        let mut rows = Vec::new();
        let mut skipped = 0;

        for date in days_between(self.start, self.end) {
            match self.harvest_day(date).await {
                Ok(Some(row)) => {
                    info!(
                        "Numbers: {} -> [{}] (plus: [{}])",
                        row.date, row.numbers, row.plus_numbers
                    );
                    rows.push(row);
                }
                Ok(None) => {
                    info!("No data for {}, skipping...", date);
                    skipped += 1;
                }
                Err(e) => {
                    error!("Stopping at {}: {}", date, e);
                    return HarvestReport {
                        rows,
                        skipped,
                        outcome: RunOutcome::Aborted { date, error: e },
                    };
                }
            }

            if date < self.end {
                self.pacer.pause().await;
            }
        }

        HarvestReport { rows, skipped, outcome: RunOutcome::Completed }
    }

    async fn harvest_day(&self, date: NaiveDate) -> Result<Option<ExportRow>, LottoError> {
        let result = self.source.fetch_draw_results(date).await?;
        ExportRow::from_draw_result(date, result.as_ref())
    }
}
