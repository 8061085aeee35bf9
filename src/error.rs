use thiserror::Error;

/// Raised while building a scene or an analyser, before any tick runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroCount { field: &'static str },

    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("{field} must be a finite number >= 0, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("stride must be at least 1, got {0}")]
    InvalidStride(usize),

    #[error("fft size must be a power of two in 32..=32768, got {0}")]
    InvalidFftSize(usize),

    #[error("scene has no element groups")]
    EmptyScene,
}

pub(crate) fn ensure_count(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroCount { field });
    }
    Ok(())
}

pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn ensure_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field, value });
    }
    Ok(())
}

pub(crate) fn ensure_ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = ensure_positive("ring radius", -1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ring radius must be a positive finite number, got -1"
        );
        let err = ensure_count("layer count", 0).unwrap_err();
        assert_eq!(err.to_string(), "layer count must be greater than zero");
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(ensure_positive("radius", f32::NAN).is_err());
        assert!(ensure_non_negative("floor", f32::NAN).is_err());
        assert!(ensure_non_negative("floor", 0.0).is_ok());
    }
}
