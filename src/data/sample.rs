//! Synthetic payload generation for offline use (`--demo`).
//!
//! Payloads follow the live service contract, so everything downstream
//! (merge, pivot, window, insights) runs unchanged on them. Like the service,
//! interest history rows carry both the measured value and the fitted trend.

use std::f64::consts::TAU;

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{
    InterestPayload, InterestRow, InterestStats, PricePayload, PricePoint, ProductInfo, Sale,
    TrendDirection,
};
use crate::error::AppError;

/// Days of observed interest history (about four years, like the live service).
const INTEREST_HISTORY_DAYS: i64 = 4 * 365;
/// Days of projected interest.
const INTEREST_FORECAST_DAYS: i64 = 365;

const PRICE_HISTORY_DAYS: i64 = 180;
const PRICE_FORECAST_DAYS: i64 = 90;

/// Relative daily noise on observed interest.
const INTEREST_NOISE_REL: f64 = 0.12;
/// Relative daily noise on observed prices.
const PRICE_NOISE_REL: f64 = 0.01;

/// Generate an interest payload whose observed history ends on `today`.
pub fn sample_interest(keyword: &str, today: NaiveDate, seed: u64) -> Result<InterestPayload, AppError> {
    let mut rng = StdRng::seed_from_u64(sample_seed(keyword, today, seed));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::runtime(format!("Noise distribution error: {e}")))?;

    let base = rng.gen_range(800.0..5000.0);
    let drift = rng.gen_range(-0.25..0.35); // relative change per year
    let yearly_amp = rng.gen_range(0.05..0.30);
    let weekly_amp = rng.gen_range(0.02..0.10);

    let level = |day: i64, date: NaiveDate| -> f64 {
        let years = day as f64 / 365.0;
        let yearly = (TAU * date.ordinal0() as f64 / 365.0).sin() * yearly_amp;
        let weekly = (TAU * date.weekday().num_days_from_monday() as f64 / 7.0).cos() * weekly_amp;
        (base * (1.0 + drift * years) * (1.0 + yearly + weekly)).max(1.0)
    };

    let start = today - Duration::days(INTEREST_HISTORY_DAYS - 1);
    let mut rows = Vec::with_capacity((INTEREST_HISTORY_DAYS + INTEREST_FORECAST_DAYS) as usize);
    let mut observed_sum = 0.0;
    let mut observed_peak = f64::NEG_INFINITY;
    let mut last_observed = 0.0;

    for day in 0..INTEREST_HISTORY_DAYS {
        let date = start + Duration::days(day);
        let noise = 1.0 + INTEREST_NOISE_REL * normal.sample(&mut rng);
        let views = (level(day, date) * noise).max(0.0).round();
        observed_sum += views;
        observed_peak = observed_peak.max(views);
        last_observed = views;
        rows.push(InterestRow {
            date,
            actual: Some(views),
            predicted: Some(fitted(level(day, date))),
        });
    }

    let mut last_projected = last_observed;
    for day in INTEREST_HISTORY_DAYS..INTEREST_HISTORY_DAYS + INTEREST_FORECAST_DAYS {
        let date = start + Duration::days(day);
        let projected = fitted(level(day, date));
        last_projected = projected;
        rows.push(InterestRow {
            date,
            actual: None,
            predicted: Some(projected),
        });
    }

    let trend = if last_projected > last_observed {
        TrendDirection::Rising
    } else {
        TrendDirection::Falling
    };

    Ok(InterestPayload {
        keyword: keyword.to_string(),
        source: Some("Synthetic sample".to_string()),
        stats: Some(InterestStats {
            peak: Some(observed_peak),
            average: Some((observed_sum / INTEREST_HISTORY_DAYS as f64).floor()),
            prediction_trend: Some(trend),
        }),
        graph_data: rows,
    })
}

/// Generate a price payload whose history ends on `today`.
///
/// The forecast starts on the last history day so the two lines meet.
pub fn sample_price(product_url: &str, today: NaiveDate, seed: u64) -> Result<PricePayload, AppError> {
    let mut rng = StdRng::seed_from_u64(sample_seed(product_url, today, seed));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::runtime(format!("Noise distribution error: {e}")))?;

    let list_price = rng.gen_range(999.0..49_999.0_f64).round();
    let start = today - Duration::days(PRICE_HISTORY_DAYS - 1);

    let mut history = Vec::with_capacity(PRICE_HISTORY_DAYS as usize);
    let mut price = list_price;
    for day in 0..PRICE_HISTORY_DAYS {
        // Occasional markdowns and restorations around the list price.
        let r: f64 = rng.gen_range(0.0..1.0);
        if r < 0.03 {
            price = (price * rng.gen_range(0.80..0.95)).round();
        } else if r < 0.05 {
            price = list_price;
        }
        let noisy = (price * (1.0 + PRICE_NOISE_REL * normal.sample(&mut rng))).round();
        history.push(PricePoint {
            date: start + Duration::days(day),
            price: noisy.max(1.0),
        });
    }

    let current = history.last().map(|p| p.price).unwrap_or(list_price);
    let dip_day = rng.gen_range(10..PRICE_FORECAST_DAYS - 10);
    let dip_depth = rng.gen_range(0.05..0.20);
    let mut forecast = Vec::with_capacity(PRICE_FORECAST_DAYS as usize + 1);
    for day in 0..=PRICE_FORECAST_DAYS {
        let dist = ((day - dip_day) as f64 / 7.0).powi(2);
        let factor = 1.0 - dip_depth * (-dist).exp();
        forecast.push(PricePoint {
            date: today + Duration::days(day),
            price: (current * factor).round(),
        });
    }

    Ok(PricePayload {
        product: Some(ProductInfo {
            title: Some("Sample product".to_string()),
            url: Some(product_url.to_string()),
            site: Some("demo".to_string()),
        }),
        history,
        forecast,
        current_price: Some(current),
        sales: vec![
            Sale {
                name: "Season Sale".to_string(),
                date: Some((today + Duration::days(30)).to_string()),
                source: Some("https://example.com/sales".to_string()),
            },
            Sale {
                name: "Festive Days".to_string(),
                date: Some((today + Duration::days(75)).to_string()),
                source: Some("https://example.com/festive".to_string()),
            },
        ],
    })
}

/// Trend values are reported to one decimal.
fn fitted(level: f64) -> f64 {
    (level * 10.0).round() / 10.0
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable across toolchains: FNV-1a over the inputs, finished with splitmix64.
fn sample_seed(query: &str, today: NaiveDate, seed: u64) -> u64 {
    let fnv = |hash: u64, bytes: &[u8]| {
        bytes
            .iter()
            .fold(hash, |h, &b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
    };
    let mut h = fnv(FNV_OFFSET, query.trim().to_lowercase().as_bytes());
    h = fnv(h, &today.num_days_from_ce().to_le_bytes());
    h = fnv(h, &seed.to_le_bytes());

    h = h.wrapping_add(0x9e37_79b9_7f4a_7c15);
    h = (h ^ (h >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h = (h ^ (h >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^ (h >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{derive_interest, derive_price, locate_pivot, merge_interest, merge_series};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    #[test]
    fn interest_sample_is_deterministic() {
        let a = sample_interest("Bitcoin", today(), 7).unwrap();
        let b = sample_interest("Bitcoin", today(), 7).unwrap();
        assert_eq!(a, b);
        let c = sample_interest("Bitcoin", today(), 8).unwrap();
        assert_ne!(a.graph_data, c.graph_data);
    }

    #[test]
    fn interest_sample_pivots_the_day_after_today() {
        let payload = sample_interest("Rust", today(), 1).unwrap();
        let merged = merge_interest(&payload.graph_data);
        assert_eq!(merged.len(), (INTEREST_HISTORY_DAYS + INTEREST_FORECAST_DAYS) as usize);
        let pivot = locate_pivot(&merged).unwrap();
        assert_eq!(merged[pivot].date, today() + Duration::days(1));
        assert!(derive_interest(&merged, None).is_available());
    }

    #[test]
    fn price_sample_overlaps_on_today() {
        let payload = sample_price("https://shop.test/p/1", today(), 3).unwrap();
        let merged = merge_series(&payload.observed(), &payload.predicted());
        let overlap: Vec<_> = merged
            .iter()
            .filter(|p| p.observed.is_some() && p.predicted.is_some())
            .collect();
        assert_eq!(overlap.len(), 1);
        assert_eq!(overlap[0].date, today());

        let insight = derive_price(&payload.observed(), &payload.predicted(), payload.current_price);
        let s = insight.summary().unwrap();
        assert!(s.next_dip.is_some());
        assert!(s.peak >= s.average && s.average >= s.lowest_value);
    }

    #[test]
    fn seed_mixing_is_pinned() {
        assert_eq!(sample_seed("Bitcoin", today(), 7), 5_063_630_915_265_624_513);
        assert_eq!(sample_seed("  bitcoin ", today(), 7), sample_seed("Bitcoin", today(), 7));
        assert_ne!(sample_seed("Bitcoin", today(), 8), sample_seed("Bitcoin", today(), 7));
    }

    #[test]
    fn interest_history_rows_carry_fitted_trend() {
        let payload = sample_interest("Rust", today(), 1).unwrap();
        let history: Vec<_> = payload.graph_data.iter().filter(|r| r.actual.is_some()).collect();
        assert_eq!(history.len(), INTEREST_HISTORY_DAYS as usize);
        assert!(history.iter().all(|r| r.predicted.is_some()));

        let merged = merge_interest(&payload.graph_data);
        assert!(merged.iter().all(|p| p.observed.is_some() != p.predicted.is_some()));
    }
}
