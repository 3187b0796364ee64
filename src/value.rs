use std::{fmt::Display, str::FromStr};

/// Number of fractional digits in a reported average
pub const FRACTION_DIGITS: usize = 5;

/// Floating point width a [`crate::MeanTable`] computes in.
///
/// Implemented for `f32` and `f64`. Decoding, folding and formatting all
/// happen in the same width, so a 32-bit table rounds like a 32-bit table
/// all the way to the response body.
///
/// Decoding goes through [`FromStr`] on the number as written, which rounds
/// the decimal text once, directly to this width.
pub trait Value:
    num_traits::Float + Display + std::fmt::Debug + FromStr + Send + 'static
{
    /// Width in bits.
    const BITS: u32;

    /// Converts a record count into this width.
    fn from_count(count: u64) -> Self;

    /// Parses a JSON number in this width.
    ///
    /// Returns `None` if the text is not a number, or if it is out of range
    /// for this width.
    fn parse_number(text: &str) -> Option<Self> {
        text.parse::<Self>().ok().filter(|x| x.is_finite())
    }

    /// Formats the value with exactly [`FRACTION_DIGITS`] fractional digits.
    fn format_rounded(self) -> String {
        format!("{:.*}", FRACTION_DIGITS, self)
    }
}

impl Value for f32 {
    const BITS: u32 = 32;

    #[allow(clippy::cast_precision_loss)]
    fn from_count(count: u64) -> Self {
        count as Self
    }
}

impl Value for f64 {
    const BITS: u32 = 64;

    #[allow(clippy::cast_precision_loss)]
    fn from_count(count: u64) -> Self {
        count as Self
    }
}

/// Precision a deployment aggregates in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Precision {
    /// 32-bit floats
    Single,

    /// 64-bit floats
    #[default]
    Double,
}

impl Precision {
    /// Width in bits.
    #[must_use]
    pub fn bits(self) -> u32 {
        match self {
            Self::Single => <f32 as Value>::BITS,
            Self::Double => <f64 as Value>::BITS,
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "f{}", self.bits())
    }
}

impl std::str::FromStr for Precision {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "32" | "f32" | "single" => Ok(Self::Single),
            "64" | "f64" | "double" => Ok(Self::Double),
            _ => Err(()),
        }
    }
}
