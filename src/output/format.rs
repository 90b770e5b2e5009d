//! Number formatting for text output.
//!
//! Format strings follow the usual one-letter convention:
//! - `G` - general, shortest representation that round-trips
//! - `F<n>` - fixed point with `n` decimals (default 2)
//! - `E<n>` - scientific with `n` decimals (default 6)
//!
//! Precision is capped at [`MAX_PRECISION`] decimals.

use crate::utils::config::MAX_PRECISION;
use crate::utils::error::OutputError;
use std::fmt;
use std::str::FromStr;

/// How floating point values are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberFormat {
    #[default]
    General,
    Fixed(usize),
    Scientific(usize),
}

impl NumberFormat {
    /// Render `value`; a hand-built precision above the cap is clamped
    pub fn format(&self, value: f64) -> String {
        match *self {
            NumberFormat::General => format!("{}", value),
            NumberFormat::Fixed(decimals) => format!("{:.*}", decimals.min(MAX_PRECISION), value),
            NumberFormat::Scientific(decimals) => {
                format!("{:.*E}", decimals.min(MAX_PRECISION), value)
            }
        }
    }
}

impl FromStr for NumberFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let Some(kind) = chars.next() else {
            return Ok(NumberFormat::General);
        };

        let digits = chars.as_str();
        let precision = |default: usize| -> Result<usize, OutputError> {
            if digits.is_empty() {
                return Ok(default);
            }
            match digits.parse::<usize>() {
                Ok(decimals) if decimals <= MAX_PRECISION => Ok(decimals),
                _ => Err(OutputError::InvalidNumberFormat(s.to_string())),
            }
        };

        match kind.to_ascii_uppercase() {
            'G' if digits.is_empty() => Ok(NumberFormat::General),
            'F' => Ok(NumberFormat::Fixed(precision(2)?)),
            'E' => Ok(NumberFormat::Scientific(precision(6)?)),
            _ => Err(OutputError::InvalidNumberFormat(s.to_string())),
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberFormat::General => write!(f, "G"),
            NumberFormat::Fixed(decimals) => write!(f, "F{}", decimals),
            NumberFormat::Scientific(decimals) => write!(f, "E{}", decimals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("G".parse::<NumberFormat>().unwrap(), NumberFormat::General);
        assert_eq!("".parse::<NumberFormat>().unwrap(), NumberFormat::General);
        assert_eq!("f3".parse::<NumberFormat>().unwrap(), NumberFormat::Fixed(3));
        assert_eq!("F".parse::<NumberFormat>().unwrap(), NumberFormat::Fixed(2));
        assert_eq!("E".parse::<NumberFormat>().unwrap(), NumberFormat::Scientific(6));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("X2".parse::<NumberFormat>().is_err());
        assert!("Fx".parse::<NumberFormat>().is_err());
        assert!("G5".parse::<NumberFormat>().is_err());
    }

    #[test]
    fn test_parse_rejects_precision_above_cap() {
        assert_eq!(
            "F99".parse::<NumberFormat>().unwrap(),
            NumberFormat::Fixed(MAX_PRECISION)
        );
        assert!(matches!(
            "F100".parse::<NumberFormat>(),
            Err(OutputError::InvalidNumberFormat(_))
        ));
        assert!(matches!(
            "E70000".parse::<NumberFormat>(),
            Err(OutputError::InvalidNumberFormat(_))
        ));
    }

    #[test]
    fn test_format_clamps_hand_built_precision() {
        let wide = NumberFormat::Fixed(70_000).format(1.0);
        assert_eq!(wide.len(), 2 + MAX_PRECISION);
    }

    #[test]
    fn test_format_values() {
        assert_eq!(NumberFormat::General.format(2.0), "2");
        assert_eq!(NumberFormat::General.format(0.25), "0.25");
        assert_eq!(NumberFormat::Fixed(2).format(4.0), "4.00");
        assert_eq!(NumberFormat::Scientific(2).format(1500.0), "1.50E3");
        assert_eq!(NumberFormat::General.format(f64::NAN), "NaN");
    }

    #[test]
    fn test_display_round_trips() {
        for format in [NumberFormat::General, NumberFormat::Fixed(4), NumberFormat::Scientific(1)] {
            assert_eq!(format.to_string().parse::<NumberFormat>().unwrap(), format);
        }
    }
}
