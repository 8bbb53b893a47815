//! Report windows and the in-process aggregation used by the in-memory store.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use std::collections::HashMap;

use crate::error::{TransactionError, TransactionResult};
use crate::models::{BestSeller, Report, TransactionDetail};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open interval `[start, end)` of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl ReportWindow {
    /// Resolves optional `YYYY-MM-DD` bounds; absent (or blank) dates mean `today`.
    /// `end_date` is inclusive: the window ends at the following local midnight.
    pub fn resolve(
        start_date: Option<&str>,
        end_date: Option<&str>,
        today: NaiveDate,
    ) -> TransactionResult<Self> {
        let start = parse_date("start_date", start_date)?.unwrap_or(today);
        let end = parse_date("end_date", end_date)?.unwrap_or(today);

        if start > end {
            return Err(TransactionError::InvalidDateRange { start, end });
        }

        Self::days(start, end)
    }

    /// The window covering only `today`.
    pub fn today(today: NaiveDate) -> TransactionResult<Self> {
        Self::days(today, today)
    }

    fn days(first: NaiveDate, last: NaiveDate) -> TransactionResult<Self> {
        let after_last = last
            .succ_opt()
            .ok_or_else(|| TransactionError::Validation(format!("end_date {} is out of range", last)))?;

        Ok(Self {
            start: local_midnight(first),
            end: local_midnight(after_last),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_utc() && at < self.end_utc()
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }
}

fn parse_date(field: &'static str, raw: Option<&str>) -> TransactionResult<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| TransactionError::InvalidDateFormat {
            field,
            value: raw.to_string(),
        })
}

fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    start_of_day(&Local, date)
}

/// First instant of `date` in `tz`, stepping past a DST gap at midnight.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=24 * 4)
        .map(|step| midnight + TimeDelta::minutes(15 * step))
        .find_map(|at| tz.from_local_datetime(&at).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Aggregates detail rows; `None` when there are none.
///
/// The best seller has the highest summed quantity, ties going to the
/// lowest product id, and carries the name from its most recent detail.
pub fn summarize<'a, I>(details: I) -> Option<Report>
where
    I: IntoIterator<Item = &'a TransactionDetail>,
{
    struct Sold<'d> {
        quantity: i64,
        latest_id: i32,
        name: &'d str,
    }

    let mut total_revenue: i64 = 0;
    let mut total_transactions: i64 = 0;
    let mut per_product: HashMap<i32, Sold<'a>> = HashMap::new();

    for detail in details {
        total_revenue = total_revenue.saturating_add(detail.subtotal);
        total_transactions += 1;

        let sold = per_product.entry(detail.product_id).or_insert(Sold {
            quantity: 0,
            latest_id: detail.id,
            name: &detail.product_name,
        });
        sold.quantity += i64::from(detail.quantity);
        if detail.id >= sold.latest_id {
            sold.latest_id = detail.id;
            sold.name = &detail.product_name;
        }
    }

    if total_transactions == 0 {
        return None;
    }

    let best_selling_product = per_product
        .iter()
        .max_by(|(a_id, a), (b_id, b)| a.quantity.cmp(&b.quantity).then(b_id.cmp(a_id)))
        .map(|(_, sold)| BestSeller {
            name: sold.name.to_string(),
            quantity_sold: sold.quantity,
        });

    Some(Report {
        total_revenue,
        total_transactions,
        best_selling_product,
    })
}
