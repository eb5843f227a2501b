use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, TxFields,
    util::{normalize_optional_text, normalize_required_name},
};

mod list;
mod write;

/// Filters for listing transactions.
///
/// All present filters are AND-combined. `from` and `to` are both inclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub wallet_id: Option<Uuid>,
    /// Case-insensitive substring matched against name or description.
    pub search: Option<String>,
}

impl TransactionFilter {
    /// Filter covering whole calendar days: `start` from 00:00:00, `end` up
    /// to 23:59:59.999 (UTC).
    #[must_use]
    pub fn for_days(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            from: Some(start_of_day(start)),
            to: Some(end_of_day(end)),
            ..Default::default()
        }
    }

    fn validate(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && to < from
        {
            return Err(EngineError::InvalidRange(
                "end date cannot be earlier than start date".to_string(),
            ));
        }
        Ok(())
    }

    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// First instant of `day` in UTC.
#[must_use]
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Last millisecond of `day` in UTC.
#[must_use]
pub fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    start_of_day(day) + TimeDelta::days(1) - TimeDelta::milliseconds(1)
}

/// Validated copy of the caller's fields.
fn normalize_fields(fields: &TxFields) -> ResultEngine<TxFields> {
    Ok(TxFields {
        wallet_id: fields.wallet_id,
        category_id: fields.category_id,
        name: normalize_required_name(&fields.name, "transaction")?,
        amount: fields.amount.ensure_in_bounds("amount")?,
        occurred_at: fields.occurred_at,
        description: normalize_optional_text(fields.description.as_deref())?,
    })
}

/// Rejects a balance move that would leave `current + delta` out of range.
fn ensure_balance_in_bounds(current_minor: i64, delta: MoneyCents) -> ResultEngine<()> {
    MoneyCents::new(current_minor)
        .checked_add(delta)
        .ok_or_else(|| EngineError::InvalidAmount("wallet balance is out of range".to_string()))?
        .ensure_in_bounds("wallet balance")
        .map(|_| ())
}
