//! Mapping functions derived from the extent of the current data.
//!
//! Every scale degrades to the midpoint of its output range when the input domain is
//! empty or collapses to a single value, so callers never see a division by a zero span.

use serde::{Deserialize, Serialize};

/// Values at or below zero are lifted to this floor before taking logarithms.
const LOG_FLOOR: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// Extent of the finite values in `values`, or `None` if there are none.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|value| value.is_finite())
            .fold(None, |extent, value| match extent {
                None => Some(Self {
                    min: value,
                    max: value,
                }),
                Some(Self { min, max }) => Some(Self {
                    min: min.min(value),
                    max: max.max(value),
                }),
            })
    }

    pub fn span(self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(self) -> bool {
        self.span().abs() < f64::EPSILON
    }
}

/// Output interval of a scale.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Range {
    pub start: f32,
    pub end: f32,
}

impl Range {
    pub const UNIT: Self = Self {
        start: 0.0,
        end: 1.0,
    };

    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn midpoint(self) -> f32 {
        (self.start + self.end) * 0.5
    }

    pub fn lerp(self, t: f64) -> f32 {
        self.start + (self.end - self.start) * t as f32
    }
}

fn normalize_linear(value: f64, extent: Option<Extent>) -> Option<f64> {
    let extent = extent?;
    if extent.is_degenerate() || !value.is_finite() {
        return None;
    }
    Some(((value - extent.min) / extent.span()).clamp(0.0, 1.0))
}

fn normalize_log(value: f64, extent: Option<Extent>) -> Option<f64> {
    let extent = extent?;
    if !value.is_finite() {
        return None;
    }
    let min = extent.min.max(LOG_FLOOR).ln();
    let max = extent.max.max(LOG_FLOOR).ln();
    let denominator = max - min;
    if denominator.abs() < f64::EPSILON {
        return None;
    }
    Some(((value.max(LOG_FLOOR).ln() - min) / denominator).clamp(0.0, 1.0))
}

/// Linear mapping from a data extent onto a [`Range`], clamped to the range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: Option<Extent>,
    range: Range,
}

impl LinearScale {
    pub fn new(range: Range) -> Self {
        Self {
            domain: None,
            range,
        }
    }

    pub fn with_domain(mut self, domain: Option<Extent>) -> Self {
        self.domain = domain;
        self
    }

    pub fn map(&self, value: f64) -> f32 {
        match normalize_linear(value, self.domain) {
            Some(t) => self.range.lerp(t),
            None => self.range.midpoint(),
        }
    }
}

/// Logarithmic mapping, used for amounts that span orders of magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogScale {
    domain: Option<Extent>,
    range: Range,
}

impl LogScale {
    pub fn new(range: Range) -> Self {
        Self {
            domain: None,
            range,
        }
    }

    pub fn with_domain(mut self, domain: Option<Extent>) -> Self {
        self.domain = domain;
        self
    }

    pub fn map(&self, value: f64) -> f32 {
        match normalize_log(value, self.domain) {
            Some(t) => self.range.lerp(t),
            None => self.range.midpoint(),
        }
    }
}

/// Evenly divided bands, mapping a band index to the centre of its band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandScale {
    count: usize,
    range: Range,
}

impl BandScale {
    pub fn new(count: usize, range: Range) -> Self {
        Self { count, range }
    }

    pub fn bandwidth(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        (self.range.end - self.range.start) / self.count as f32
    }

    pub fn center(&self, index: usize) -> f32 {
        if self.count == 0 {
            return self.range.midpoint();
        }
        let index = index.min(self.count - 1);
        self.range.start + self.bandwidth() * (index as f32 + 0.5)
    }
}
