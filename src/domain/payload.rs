//! Wire payloads returned by the forecast service.
//!
//! Field names mirror the JSON contract exactly (including the space-separated
//! interest column names). Every collection defaults to empty and every scalar is
//! optional so a sparse payload still deserializes; the engine decides what is
//! "unavailable".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Domain, ObservedPoint, PredictedPoint, TrendDirection};

/// A payload from either endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum Payload {
    Interest(InterestPayload),
    Price(PricePayload),
}

impl Payload {
    pub fn domain(&self) -> Domain {
        match self {
            Payload::Interest(_) => Domain::Interest,
            Payload::Price(_) => Domain::Price,
        }
    }

    /// Title shown above the chart.
    pub fn title(&self) -> String {
        match self {
            Payload::Interest(p) => p.keyword.clone(),
            Payload::Price(p) => p
                .product
                .as_ref()
                .and_then(|prod| prod.title.clone())
                .unwrap_or_else(|| "Tracked product".to_string()),
        }
    }
}

/// `GET /predict/{keyword}` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterestPayload {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub stats: Option<InterestStats>,
    #[serde(default)]
    pub graph_data: Vec<InterestRow>,
}

/// Upstream summary block. Only `prediction_trend` is consumed; peak/average are
/// recomputed locally from the observed rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InterestStats {
    #[serde(default)]
    pub peak: Option<f64>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub prediction_trend: Option<TrendDirection>,
}

/// One row of `graph_data`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestRow {
    pub date: NaiveDate,
    #[serde(rename = "Actual Interest", default)]
    pub actual: Option<f64>,
    #[serde(rename = "Predicted Trend", default)]
    pub predicted: Option<f64>,
}

/// `GET /price-track?url=...` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PricePayload {
    #[serde(default)]
    pub product: Option<ProductInfo>,
    #[serde(default)]
    pub history: Vec<PricePoint>,
    #[serde(default)]
    pub forecast: Vec<PricePoint>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub sales: Vec<Sale>,
}

impl PricePayload {
    pub fn observed(&self) -> Vec<ObservedPoint> {
        self.history
            .iter()
            .map(|p| ObservedPoint {
                date: p.date,
                value: p.price,
            })
            .collect()
    }

    pub fn predicted(&self) -> Vec<PredictedPoint> {
        self.forecast
            .iter()
            .map(|p| PredictedPoint {
                date: p.date,
                value: p.price,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// An upcoming sale event scraped for the product's site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_payload_parses_service_shape() {
        let json = r#"{
            "keyword": "Bitcoin",
            "source": "Wikipedia Pageviews",
            "stats": {"peak": 5000, "average": 1200, "prediction_trend": "Rising"},
            "graph_data": [
                {"date": "2025-01-01", "Actual Interest": 1000, "Predicted Trend": 990.5, "Lower Bound": 1.0, "Upper Bound": 2.0},
                {"date": "2025-01-02", "Actual Interest": null, "Predicted Trend": 1010.0}
            ]
        }"#;
        let payload: InterestPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.keyword, "Bitcoin");
        assert_eq!(payload.graph_data.len(), 2);
        assert_eq!(payload.graph_data[0].actual, Some(1000.0));
        assert_eq!(payload.graph_data[1].actual, None);
        assert_eq!(
            payload.stats.and_then(|s| s.prediction_trend),
            Some(TrendDirection::Rising)
        );
    }

    #[test]
    fn price_payload_tolerates_missing_fields() {
        let json = r#"{"history": [{"date": "2025-03-01", "price": 1999.0}]}"#;
        let payload: PricePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.history.len(), 1);
        assert!(payload.forecast.is_empty());
        assert!(payload.current_price.is_none());
        assert!(payload.sales.is_empty());
        assert_eq!(payload.observed()[0].value, 1999.0);
    }

    #[test]
    fn tagged_payload_keeps_domain() {
        let payload = Payload::Price(PricePayload::default());
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"domain\":\"price\""));
        let back: Payload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.domain(), Domain::Price);
        assert_eq!(back.title(), "Tracked product");
    }
}
