//! Weekly and monthly resampling of daily bars

use chrono::{Datelike, Days, NaiveDate};

use crate::model::{Period, PriceBar, PriceSeries};

/// Aggregate a daily series into `period` bars.
///
/// Weeks end on Friday (weekend bars roll into the following Friday) and
/// months end on their last calendar day; each output bar is labelled with
/// that end date. Percent changes are recomputed from consecutive closes.
pub fn resample(series: &PriceSeries, period: Period) -> PriceSeries {
    if period == Period::Daily {
        return series.clone();
    }

    let mut out: Vec<PriceBar> = Vec::new();
    for bar in series.bars() {
        let Some(label) = period_end(bar.date, period) else {
            continue;
        };
        match out.last_mut() {
            Some(current) if current.date == label => {
                current.high = current.high.max(bar.high);
                current.low = current.low.min(bar.low);
                current.close = bar.close;
                current.volume += bar.volume;
                current.amount = match (current.amount, bar.amount) {
                    (Some(a), Some(b)) => Some(a + b),
                    _ => None,
                };
            }
            _ => out.push(PriceBar {
                date: label,
                change_pct: None,
                ..bar.clone()
            }),
        }
    }

    for i in 1..out.len() {
        let prev = out[i - 1].close;
        out[i].change_pct = if prev.is_finite() && prev > 0.0 {
            Some((out[i].close / prev - 1.0) * 100.0)
        } else {
            None
        };
    }

    PriceSeries::new(series.symbol(), out)
}

fn period_end(date: NaiveDate, period: Period) -> Option<NaiveDate> {
    match period {
        Period::Daily => Some(date),
        Period::Weekly => {
            let weekday = i64::from(date.weekday().num_days_from_monday());
            let ahead = (4 - weekday).rem_euclid(7) as u64;
            date.checked_add_days(Days::new(ahead))
        }
        Period::Monthly => {
            let (year, month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
        }
    }
}
