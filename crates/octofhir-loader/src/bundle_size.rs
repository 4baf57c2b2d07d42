use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::NonZeroUsize;

use crate::error::{LoaderError, Result};

/// Maximum number of NDJSON lines grouped into one batch Bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BundleSize(NonZeroUsize);

impl BundleSize {
    pub const DEFAULT: usize = 500;

    /// Create a bundle size, rejecting zero.
    pub fn new(size: usize) -> Result<Self> {
        NonZeroUsize::new(size)
            .map(Self)
            .ok_or_else(|| LoaderError::configuration("bundle size must be a positive integer"))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for BundleSize {
    fn default() -> Self {
        Self(NonZeroUsize::new(Self::DEFAULT).unwrap_or(NonZeroUsize::MIN))
    }
}

impl From<NonZeroUsize> for BundleSize {
    fn from(size: NonZeroUsize) -> Self {
        Self(size)
    }
}

impl TryFrom<i64> for BundleSize {
    type Error = LoaderError;

    fn try_from(size: i64) -> Result<Self> {
        if size <= 0 {
            return Err(LoaderError::configuration(format!(
                "bundle size must be a positive integer, got {size}"
            )));
        }
        let size = usize::try_from(size)
            .map_err(|_| LoaderError::configuration(format!("bundle size {size} is too large")))?;
        Self::new(size)
    }
}

impl fmt::Display for BundleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for BundleSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.get() as u64)
    }
}

impl<'de> Deserialize<'de> for BundleSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        let err = BundleSize::new(0).unwrap_err();
        assert!(matches!(err, LoaderError::Configuration(_)));
    }

    #[test]
    fn test_negative_is_rejected() {
        assert!(BundleSize::try_from(-5).is_err());
        assert!(BundleSize::try_from(0).is_err());
        assert_eq!(BundleSize::try_from(7).unwrap().get(), 7);
    }

    #[test]
    fn test_default() {
        assert_eq!(BundleSize::default().get(), 500);
    }

    #[test]
    fn test_deserialize_validates() {
        let size: BundleSize = serde_json::from_str("25").unwrap();
        assert_eq!(size.get(), 25);
        assert!(serde_json::from_str::<BundleSize>("0").is_err());
        assert!(serde_json::from_str::<BundleSize>("-1").is_err());
        assert_eq!(serde_json::to_string(&size).unwrap(), "25");
    }
}
