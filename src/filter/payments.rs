use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use super::error::FilterError;
use super::filter::Filter;
use super::types::{PageRequest, SqlParam, SqlResult};

pub(crate) const PAYMENT_LIST_SELECT: &str = "p.id, p.amount, p.affect_month, p.created_at, p.user_id, \
    d.first_name, d.last_name, p.curso_id, c.name AS curso";

// A payment row is only listed when its student detail and curso both exist.
pub(crate) const PAYMENT_LIST_FROM: &str = "payments p \
    JOIN user_details d ON d.user_id = p.user_id \
    JOIN cursos c ON c.id = p.curso_id";

/// Optional payment-list filters. Dates are calendar days in UTC, both ends inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFilter {
    pub user_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl PaymentFilter {
    pub fn validate(&self) -> Result<(), FilterError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(FilterError::InvalidDateRange {
                    field: "start_date",
                    message: format!("start_date {} is after end_date {}", start, end),
                });
            }
        }
        Ok(())
    }

    pub fn to_sql(&self, page: PageRequest) -> Result<SqlResult, FilterError> {
        self.validate()?;

        let mut filter = Filter::new(PAYMENT_LIST_SELECT, PAYMENT_LIST_FROM, "p.id")?;
        let conditions = filter.where_clause();

        if let Some(user_id) = self.user_id {
            conditions.eq("p.user_id", SqlParam::Int(user_id))?;
        }
        if let Some(start) = self.start_date {
            conditions.gte("p.created_at", SqlParam::Timestamp(start_of_day("start_date", start)?))?;
        }
        if let Some(end) = self.end_date {
            // Inclusive end date: everything before the following midnight.
            let next_day = end.succ_opt().ok_or_else(|| FilterError::InvalidDateRange {
                field: "end_date",
                message: format!("end_date {} is out of range", end),
            })?;
            conditions.lt("p.created_at", SqlParam::Timestamp(start_of_day("end_date", next_day)?))?;
        }

        filter.page(page);
        filter.to_sql()
    }
}

fn start_of_day(field: &'static str, date: NaiveDate) -> Result<DateTime<Utc>, FilterError> {
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| FilterError::InvalidDateRange {
        field,
        message: format!("invalid date {}", date),
    })?;
    Ok(Utc.from_utc_datetime(&midnight))
}
