//! Linear mapping between base-pair coordinates and pixels.
//!
//! The same scale positions band rectangles and drives the selection brush,
//! so it must stay invertible: both the domain and the range are required to
//! have positive width.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("Degenerate domain: stop ({stop}) must be greater than start ({start})")]
    DegenerateDomain { start: f64, stop: f64 },
    #[error("Degenerate range: end ({end}) must be greater than start ({start})")]
    DegenerateRange { start: f64, end: f64 },
    #[error("Non-finite scale bound")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_stop: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_stop: f64, range_start: f64, range_end: f64) -> Result<Self, ScaleError> {
        if ![domain_start, domain_stop, range_start, range_end].iter().all(|v| v.is_finite()) {
            return Err(ScaleError::NonFinite);
        }
        if domain_stop <= domain_start {
            return Err(ScaleError::DegenerateDomain { start: domain_start, stop: domain_stop });
        }
        if range_end <= range_start {
            return Err(ScaleError::DegenerateRange { start: range_start, end: range_end });
        }
        Ok(Self {
            domain_start,
            domain_stop,
            range_start,
            range_end,
        })
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_stop)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Map a base-pair coordinate to a pixel offset. Values outside the domain
    /// extrapolate linearly.
    pub fn map(&self, bp: f64) -> f64 {
        let t = (bp - self.domain_start) / (self.domain_stop - self.domain_start);
        lerp(self.range_start, self.range_end, t)
    }

    /// Map a pixel offset back to a base-pair coordinate.
    pub fn invert(&self, px: f64) -> f64 {
        let t = (px - self.range_start) / (self.range_end - self.range_start);
        lerp(self.domain_start, self.domain_stop, t)
    }

    /// Pixel width covered by `[start, end]`.
    pub fn span(&self, start: f64, end: f64) -> f64 {
        self.map(end) - self.map(start)
    }

    pub fn clamp_px(&self, px: f64) -> f64 {
        px.clamp(self.range_start, self.range_end)
    }

    /// Round tick positions inside the domain, stepping by 1, 2 or 5 × 10^k so
    /// that roughly `count` ticks are produced.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let count = count.max(1) as f64;
        let span = self.domain_stop - self.domain_start;
        let mut step = 10f64.powi((span / count).log10().floor() as i32);
        let err = count / span * step;
        if err <= 0.15 {
            step *= 10.0;
        } else if err <= 0.35 {
            step *= 5.0;
        } else if err <= 0.75 {
            step *= 2.0;
        }

        let first = (self.domain_start / step).ceil();
        let last = (self.domain_stop / step).floor();
        if last < first {
            return Vec::new();
        }
        let n = (last - first) as usize;
        (0..=n).map(|i| (first + i as f64) * step).collect()
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 1.0 {
        b
    } else {
        a + t * (b - a)
    }
}

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Format a number with an SI prefix, keeping at most six significant digits
/// and trimming trailing zeros: `20000000` becomes `20M`, `1500` becomes `1.5k`.
pub fn format_si(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let exponent = (((value.abs().log10() / 3.0).floor() as i32) * 3).clamp(-24, 24);
    let scaled = value / 10f64.powi(exponent);
    let int_digits = (scaled.abs().log10().floor() as i32 + 1).max(1);
    let decimals = (6 - int_digits).max(0) as usize;

    let mut digits = format!("{:.*}", decimals, scaled);
    if digits.contains('.') {
        while digits.ends_with('0') {
            digits.pop();
        }
        if digits.ends_with('.') {
            digits.pop();
        }
    }
    let prefix = SI_PREFIXES[((exponent + 24) / 3) as usize];
    format!("{}{}", digits, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_endpoints_map_exactly() {
        let scale = LinearScale::new(1.0, 248_956_422.0, 0.0, 870.0).unwrap();
        assert_eq!(scale.map(1.0), 0.0);
        assert_eq!(scale.map(248_956_422.0), 870.0);
        assert_eq!(scale.invert(0.0), 1.0);
        assert_eq!(scale.invert(870.0), 248_956_422.0);
    }

    #[test]
    fn test_midpoint_is_proportional() {
        let scale = LinearScale::new(0.0, 1000.0, 0.0, 500.0).unwrap();
        assert_eq!(scale.map(500.0), 250.0);
        assert_eq!(scale.span(100.0, 200.0), 50.0);
        assert_eq!(scale.invert(125.0), 250.0);
    }

    #[test]
    fn test_degenerate_domain_is_rejected() {
        assert_eq!(
            LinearScale::new(100.0, 100.0, 0.0, 10.0),
            Err(ScaleError::DegenerateDomain { start: 100.0, stop: 100.0 })
        );
        assert!(LinearScale::new(200.0, 100.0, 0.0, 10.0).is_err());
        assert!(matches!(
            LinearScale::new(0.0, 100.0, 0.0, -4.0),
            Err(ScaleError::DegenerateRange { .. })
        ));
        assert_eq!(LinearScale::new(f64::NAN, 100.0, 0.0, 10.0), Err(ScaleError::NonFinite));
    }

    #[test]
    fn test_ticks_for_chromosome_one() {
        let scale = LinearScale::new(1.0, 248_956_422.0, 0.0, 870.0).unwrap();
        let ticks = scale.ticks(10);
        assert_eq!(ticks.first().copied(), Some(20_000_000.0));
        assert_eq!(ticks.last().copied(), Some(240_000_000.0));
        assert_eq!(ticks.len(), 12);
    }

    #[test]
    fn test_ticks_include_zero_when_in_domain() {
        let scale = LinearScale::new(0.0, 100.0, 0.0, 10.0).unwrap();
        assert_eq!(
            scale.ticks(10),
            vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]
        );
    }

    #[test]
    fn test_format_si() {
        assert_eq!(format_si(0.0), "0");
        assert_eq!(format_si(20_000_000.0), "20M");
        assert_eq!(format_si(1500.0), "1.5k");
        assert_eq!(format_si(250.0), "250");
        assert_eq!(format_si(248_956_422.0), "248.956M");
        assert_eq!(format_si(1_000_000_000.0), "1G");
    }

    proptest! {
        #[test]
        fn prop_endpoints_and_monotonic(
            start in 0u64..1_000_000_000,
            width in 1u64..1_000_000_000,
            range_end in 1.0f64..10_000.0,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let d0 = start as f64;
            let d1 = (start + width) as f64;
            let scale = LinearScale::new(d0, d1, 0.0, range_end).unwrap();
            prop_assert_eq!(scale.map(d0), 0.0);
            prop_assert_eq!(scale.map(d1), range_end);

            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let x_lo = d0 + lo * (d1 - d0);
            let x_hi = d0 + hi * (d1 - d0);
            prop_assert!(scale.map(x_lo) <= scale.map(x_hi));
        }

        #[test]
        fn prop_invert_round_trips(
            start in 0u64..1_000_000_000,
            width in 1_000u64..1_000_000_000,
            t in 0.0f64..1.0,
        ) {
            let d0 = start as f64;
            let d1 = (start + width) as f64;
            let scale = LinearScale::new(d0, d1, 0.0, 870.0).unwrap();
            let x = d0 + t * (d1 - d0);
            let back = scale.invert(scale.map(x));
            prop_assert!((back - x).abs() <= 1e-6 * width as f64);
        }
    }
}
