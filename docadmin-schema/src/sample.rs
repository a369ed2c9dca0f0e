//! Sample size bounds.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Number of documents to scan, clamped to `[1, 100]`.
///
/// Out-of-range requests are never rejected. Zero and negative values become
/// one, anything above one hundred becomes one hundred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct SampleSize(usize);

impl SampleSize {
    pub const MIN: usize = 1;
    pub const MAX: usize = 100;
    pub const DEFAULT: usize = 10;

    pub fn new(requested: i64) -> Self {
        let clamped = requested.clamp(Self::MIN as i64, Self::MAX as i64) as usize;

        if clamped as i64 != requested {
            debug!(requested, clamped, "sample size clamped");
        }

        Self(clamped)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for SampleSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<i64> for SampleSize {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<i32> for SampleSize {
    fn from(value: i32) -> Self {
        Self::new(i64::from(value))
    }
}

impl From<usize> for SampleSize {
    fn from(value: usize) -> Self {
        Self::new(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<SampleSize> for i64 {
    fn from(value: SampleSize) -> Self {
        value.0 as i64
    }
}

impl fmt::Display for SampleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_to_bounds() {
        assert_eq!(SampleSize::new(0).get(), 1);
        assert_eq!(SampleSize::new(-5).get(), 1);
        assert_eq!(SampleSize::new(1).get(), 1);
        assert_eq!(SampleSize::new(50).get(), 50);
        assert_eq!(SampleSize::new(100).get(), 100);
        assert_eq!(SampleSize::new(500).get(), 100);
        assert_eq!(SampleSize::from(usize::MAX).get(), 100);
    }

    #[test]
    fn test_default() {
        assert_eq!(SampleSize::default().get(), 10);
    }

    #[test]
    fn test_deserialize_clamps() {
        let size: SampleSize = serde_json::from_str("250").unwrap();
        assert_eq!(size.get(), 100);
        assert_eq!(serde_json::to_string(&SampleSize::new(7)).unwrap(), "7");
    }
}
