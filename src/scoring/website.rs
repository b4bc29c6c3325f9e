//! Website quality rank from SEO crawler output.

use serde::Deserialize;
use serde_json::Value;

/// Logistic squashing curve `1 / (1 + e^(-k(x - x0)))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Logistic {
    /// Slope; larger values give a steeper curve.
    pub k: f64,
    /// Midpoint, where both curves return 0.5.
    pub x0: f64,
}

impl Default for Logistic {
    fn default() -> Self {
        Self { k: 0.25, x0: 10.0 }
    }
}

impl Logistic {
    pub fn new(k: f64, x0: f64) -> Self {
        Self { k, x0 }
    }

    /// Increasing in `x`; rewards larger measurements.
    pub fn sigmoid(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-self.k * (x - self.x0)).exp())
    }

    /// Decreasing in `x`; penalises larger measurements.
    pub fn inverse_sigmoid(&self, x: f64) -> f64 {
        1.0 / (1.0 + (self.k * (x - self.x0)).exp())
    }
}

/// Page load time curve: fast sites (well under 2s) score close to 1.
const LOAD_TIME_CURVE: Logistic = Logistic { k: 3.0, x0: 2.0 };

/// Sum of all weights in `rank`.
const WEIGHT_TOTAL: f64 = 10.0;

/// Measurements feeding the website rank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeoSignal {
    pub keyword_count: usize,
    /// Seconds.
    pub total_time: f64,
    pub error_count: usize,
    pub warning_count: usize,
    pub duplicate_count: usize,
}

impl SeoSignal {
    /// Website rank in `[0, 1]`, rounded to four decimals.
    pub fn rank(&self) -> f64 {
        let curve = Logistic::default();
        let load_time = if self.total_time.is_finite() {
            LOAD_TIME_CURVE.inverse_sigmoid(self.total_time)
        } else {
            0.0
        };

        let weighted = 1.0
            + 2.0 * curve.sigmoid(self.keyword_count as f64)
            + 3.0 * load_time
            + 2.0 * curve.inverse_sigmoid(self.error_count as f64)
            + curve.inverse_sigmoid(self.warning_count as f64)
            + curve.inverse_sigmoid(self.duplicate_count as f64);

        round4(weighted / WEIGHT_TOTAL).clamp(0.0, 1.0)
    }
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// One organisation's entry in a `seo_stats_*.json` file.
///
/// Only list lengths matter, so list items are kept as raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct SeoReport {
    pub org_id: i64,
    #[serde(default)]
    pub keywords: Vec<Value>,
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub pages: Vec<SeoPage>,
    #[serde(default)]
    pub duplicate_pages: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeoPage {
    #[serde(default)]
    pub warnings: Vec<Value>,
}

impl SeoReport {
    /// Warnings are taken from the first crawled page only.
    pub fn signal(&self) -> SeoSignal {
        SeoSignal {
            keyword_count: self.keywords.len(),
            total_time: self.total_time,
            error_count: self.errors.len(),
            warning_count: self.pages.first().map_or(0, |p| p.warnings.len()),
            duplicate_count: self.duplicate_pages.len(),
        }
    }

    pub fn rank(&self) -> f64 {
        self.signal().rank()
    }
}
