use std::fmt;

use crate::shared::constants::DEFAULT_BLUR_STRENGTH;
use crate::shared::error::RedactError;

/// Side length of the square averaging kernel.
///
/// Always at least 1; a strength of 1 leaves pixels untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BlurStrength(u32);

impl BlurStrength {
    pub fn new(value: i64) -> Result<Self, RedactError> {
        if value < 1 {
            return Err(RedactError::Config(format!(
                "Blur strength must be a positive integer, got {value}"
            )));
        }
        let value = u32::try_from(value).map_err(|_| {
            RedactError::Config(format!("Blur strength {value} is too large"))
        })?;
        Ok(Self(value))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn kernel_size(&self) -> usize {
        self.0 as usize
    }
}

impl Default for BlurStrength {
    fn default() -> Self {
        Self(DEFAULT_BLUR_STRENGTH)
    }
}

impl fmt::Display for BlurStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_forty() {
        assert_eq!(BlurStrength::default().get(), 40);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(40)]
    #[case(201)]
    fn test_accepts_positive(#[case] value: i64) {
        assert_eq!(BlurStrength::new(value).unwrap().get() as i64, value);
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(-40)]
    fn test_rejects_non_positive(#[case] value: i64) {
        let err = BlurStrength::new(value).unwrap_err();
        assert!(matches!(err, RedactError::Config(_)));
    }

    #[test]
    fn test_rejects_overflow() {
        assert!(BlurStrength::new(i64::from(u32::MAX) + 1).is_err());
    }
}
