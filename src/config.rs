//! Global configuration for the curve codec and its analyses.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ZorderError};
use crate::types::MAX_KEY_BITS;

/// Codec width plus reporting knobs for locality summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Total key width B in bits.
    pub bits: u32,
    /// Number of interleaved axes D.
    pub dims: u32,
    /// Percentiles reported by locality summaries.
    pub percentiles: Vec<f64>,
    /// Number of largest steps reported by locality summaries.
    pub top_spikes: usize,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            bits: 32,
            dims: 2,
            percentiles: vec![50.0, 90.0, 99.0],
            top_spikes: 8,
        }
    }
}

impl CurveConfig {
    /// Config with the given width and two axes.
    pub fn with_bits(bits: u32) -> Self {
        Self {
            bits,
            ..Self::default()
        }
    }

    /// Check the width, axis count and percentiles.
    ///
    /// B must be non-zero, at most 64 and divisible by D.
    pub fn validate(&self) -> Result<()> {
        check_width(self.bits, self.dims)?;
        for &p in &self.percentiles {
            if !(0.0..=100.0).contains(&p) {
                return Err(ZorderError::InvalidPercentile(p));
            }
        }
        Ok(())
    }

    /// Load a config from a JSON file and validate it.
    ///
    /// Missing fields fall back to [`Default`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&s)?;
        config.validate()?;
        Ok(config)
    }
}

/// Width and axis-count rule shared by configs and codecs.
pub(crate) fn check_width(bits: u32, dims: u32) -> Result<()> {
    if dims == 0 {
        return Err(ZorderError::InvalidDimensions { dims });
    }
    if bits == 0 || bits > MAX_KEY_BITS || bits % dims != 0 {
        return Err(ZorderError::InvalidWidth {
            bits,
            dims,
            max: MAX_KEY_BITS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = CurveConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_odd_zero_and_wide_widths() {
        for bits in [0, 7, 65, 128] {
            let err = CurveConfig::with_bits(bits).validate().unwrap_err();
            assert!(
                matches!(err, ZorderError::InvalidWidth { bits: b, dims: 2, max: 64 } if b == bits),
                "bits={} gave {:?}",
                bits,
                err
            );
        }
    }

    #[test]
    fn three_axes_need_multiple_of_three() {
        let mut config = CurveConfig::with_bits(32);
        config.dims = 3;
        assert!(config.validate().is_err());
        config.bits = 63;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn width_rule_is_shared_with_codecs() {
        assert!(check_width(63, 3).is_ok());
        assert!(matches!(
            check_width(64, 0),
            Err(ZorderError::InvalidDimensions { dims: 0 })
        ));
        assert!(matches!(
            check_width(64, 3),
            Err(ZorderError::InvalidWidth { bits: 64, dims: 3, max: 64 })
        ));
        // Same rule, same error, whichever entry point is used.
        let mut config = CurveConfig::with_bits(64);
        config.dims = 3;
        assert!(matches!(
            config.validate(),
            Err(ZorderError::InvalidWidth { bits: 64, dims: 3, .. })
        ));
        assert!(matches!(
            crate::MortonCodec::<3>::new(64),
            Err(ZorderError::InvalidWidth { bits: 64, dims: 3, .. })
        ));
    }

    #[test]
    fn rejects_zero_dims_and_bad_percentiles() {
        let mut config = CurveConfig::default();
        config.dims = 0;
        assert!(matches!(
            config.validate(),
            Err(ZorderError::InvalidDimensions { dims: 0 })
        ));

        let mut config = CurveConfig::default();
        config.percentiles = vec![50.0, 101.0];
        assert!(matches!(
            config.validate(),
            Err(ZorderError::InvalidPercentile(p)) if p == 101.0
        ));
    }

    #[test]
    fn load_fills_missing_fields_from_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"bits": 16, "top_spikes": 3}"#).unwrap();

        let config = CurveConfig::load(file.path()).unwrap();
        assert_eq!(config.bits, 16);
        assert_eq!(config.dims, 2);
        assert_eq!(config.top_spikes, 3);
        assert_eq!(config.percentiles, CurveConfig::default().percentiles);
    }

    #[test]
    fn load_rejects_invalid_width() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"bits": 15}"#).unwrap();
        assert!(matches!(
            CurveConfig::load(file.path()),
            Err(ZorderError::InvalidWidth { bits: 15, .. })
        ));
        assert!(matches!(
            CurveConfig::load("/nonexistent/curve.json"),
            Err(ZorderError::Io(_))
        ));
    }

    #[test]
    fn error_names_value_and_bound() {
        let msg = CurveConfig::with_bits(33).validate().unwrap_err().to_string();
        assert!(msg.contains("33"));
        assert!(msg.contains("64"));
    }
}
