//! # Report Commands
//!
//! Revenue summary over stored invoices. Amounts come straight from the
//! saved rows; nothing is re-priced.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use innkeep_core::{Invoice, RevenueSummary};

/// Revenue report response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReportDto {
    /// First day included, when bounded.
    pub from: Option<NaiveDate>,
    /// Last day included, when bounded.
    pub to: Option<NaiveDate>,
    pub summary: RevenueSummary,
    /// Human-readable totals using the configured currency prefix.
    pub formatted_total: String,
    pub formatted_average: String,
}

/// Summarizes revenue for invoices dated within `[from, to]` (whole days,
/// UTC). Either bound may be omitted; with neither, every invoice counts.
pub async fn revenue_report(
    db: &DbState,
    config: &ConfigState,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<RevenueReportDto, ApiError> {
    debug!(?from, ?to, "revenue_report command");

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ApiError::validation(format!(
                "report start {} is after end {}",
                from, to
            )));
        }
    }

    let invoices: Vec<Invoice> = match (from, to) {
        (None, None) => db.inner().invoices().list().await?,
        _ => {
            let start = from.map(start_of_day).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            let end = to.map(end_of_day).unwrap_or_else(|| end_of_day(Utc::now().date_naive()));
            db.inner().invoices().list_between(start, end).await?
        }
    };

    let summary = RevenueSummary::from_invoices(&invoices);

    Ok(RevenueReportDto {
        from,
        to,
        formatted_total: config.format_currency(summary.total),
        formatted_average: config.format_currency(summary.average_total()),
        summary,
    })
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    day.and_time(last).and_utc()
}
