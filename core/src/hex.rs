//! Hex color normalization.
//!
//! Accepts `RGB`, `#RGB`, `RRGGBB` and `#RRGGBB` in any case. Shorthand is
//! expanded digit by digit before validation; the six digits then become the
//! 24-bit integer the dataset uses as its row id.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// A validated 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor(u32);

impl HexColor {
    /// Normalize and validate `input`.
    ///
    /// Empty input is `InvalidArgument`; anything that is not 3 or 6 hex
    /// digits (with an optional leading `#`) is `InvalidHexColor` carrying
    /// `input` unchanged.
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        if input.is_empty() {
            return Err(ApiError::InvalidArgument("hex_color"));
        }

        let expanded = expand_shorthand(input);
        let digits = expanded.strip_prefix('#').unwrap_or(&expanded);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ApiError::InvalidHexColor(input.to_string()));
        }

        u32::from_str_radix(digits, 16)
            .map(HexColor)
            .map_err(|_| ApiError::InvalidHexColor(input.to_string()))
    }

    /// The dataset row id, in `0..=0xFFFFFF`.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl FromStr for HexColor {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Double every character after an optional `#` when exactly three remain.
fn expand_shorthand(input: &str) -> String {
    let (hash, rest) = match input.strip_prefix('#') {
        Some(rest) => ("#", rest),
        None => ("", input),
    };
    if rest.chars().count() != 3 {
        return input.to_string();
    }
    let mut out = String::with_capacity(7);
    out.push_str(hash);
    for c in rest.chars() {
        out.push(c);
        out.push(c);
    }
    out
}
