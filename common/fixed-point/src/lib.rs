//! Non-negative, arbitrary-precision decimal with truncating rounding.
//!
//! All monetary quantities in the liquidation core (supplied cTokens, borrow
//! principal, borrow indices, prices, health factors) are represented as
//! [`FixedPoint`]. Internally a value is stored as an unsigned integer scaled
//! by `10^FIXED_POINT_PRECISION`; every multiplication and division rescales
//! back to that precision by integer division, which truncates toward zero —
//! exactly the rounding mode section 4.1 of the spec calls for, and for free,
//! since `BigUint` division already truncates.

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use common_constants::FIXED_POINT_PRECISION;
use num_bigint::BigUint;
use num_traits::{One, Zero};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("cannot parse '{0}' as a non-negative decimal")]
    InvalidDecimal(String),
    #[error("division by zero")]
    DivisionByZero,
}

fn scale() -> &'static BigUint {
    static SCALE: OnceLock<BigUint> = OnceLock::new();
    SCALE.get_or_init(|| BigUint::from(10u32).pow(FIXED_POINT_PRECISION))
}

/// A non-negative rational with `FIXED_POINT_PRECISION` fractional digits.
#[derive(Clone, PartialEq, Eq)]
pub struct FixedPoint {
    /// Value * 10^FIXED_POINT_PRECISION, as an exact integer.
    raw: BigUint,
}

impl FixedPoint {
    pub fn zero() -> Self {
        FixedPoint { raw: BigUint::zero() }
    }

    pub fn one() -> Self {
        FixedPoint { raw: scale().clone() }
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Builds a `FixedPoint` from an already-scaled raw integer, i.e. a value
    /// read straight from chain storage with `decimals` fractional digits
    /// (8 for a cToken balance, 18 for most underlying assets).
    pub fn from_scaled(raw: impl Into<BigUint>, decimals: u32) -> Self {
        let raw = raw.into();
        match FIXED_POINT_PRECISION.cmp(&decimals) {
            Ordering::Greater => FixedPoint {
                raw: raw * BigUint::from(10u32).pow(FIXED_POINT_PRECISION - decimals),
            },
            Ordering::Less => FixedPoint {
                raw: raw / BigUint::from(10u32).pow(decimals - FIXED_POINT_PRECISION),
            },
            Ordering::Equal => FixedPoint { raw },
        }
    }

    /// Inverse of [`FixedPoint::from_scaled`]: truncates to `decimals`
    /// fractional digits and returns the raw integer, suitable for handing
    /// back to a transaction builder.
    pub fn to_scaled(&self, decimals: u32) -> BigUint {
        match FIXED_POINT_PRECISION.cmp(&decimals) {
            Ordering::Greater => &self.raw / BigUint::from(10u32).pow(FIXED_POINT_PRECISION - decimals),
            Ordering::Less => &self.raw * BigUint::from(10u32).pow(decimals - FIXED_POINT_PRECISION),
            Ordering::Equal => self.raw.clone(),
        }
    }

    pub fn from_u64(value: u64) -> Self {
        FixedPoint { raw: BigUint::from(value) * scale() }
    }

    /// Parses a plain decimal string such as `"123.456"` or `"7"`. Rejects
    /// sign characters and anything that isn't digits plus at most one dot —
    /// negative amounts never occur in this domain (section 3).
    pub fn from_decimal_str(s: &str) -> Result<Self, FixedPointError> {
        let invalid = || FixedPointError::InvalidDecimal(s.to_string());
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            return Err(invalid());
        }
        let mut parts = s.splitn(2, '.');
        let int_part = parts.next().unwrap();
        let frac_part = parts.next().unwrap_or("");
        if parts.next().is_some() || (int_part.is_empty() && frac_part.is_empty()) {
            return Err(invalid());
        }

        let int_value: BigUint = if int_part.is_empty() {
            BigUint::zero()
        } else {
            int_part.parse().map_err(|_| invalid())?
        };

        let precision = FIXED_POINT_PRECISION as usize;
        let mut frac_digits = frac_part.to_string();
        if frac_digits.len() > precision {
            frac_digits.truncate(precision); // extra digits are truncated, not rounded
        } else {
            frac_digits.push_str(&"0".repeat(precision - frac_digits.len()));
        }
        let frac_value: BigUint = if frac_digits.is_empty() {
            BigUint::zero()
        } else {
            frac_digits.parse().map_err(|_| invalid())?
        };

        Ok(FixedPoint { raw: int_value * scale() + frac_value })
    }

    pub fn checked_add(&self, other: &Self) -> Self {
        FixedPoint { raw: &self.raw + &other.raw }
    }

    /// `None` if `other > self` — non-negativity would be violated.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if self.raw < other.raw {
            None
        } else {
            Some(FixedPoint { raw: &self.raw - &other.raw })
        }
    }

    /// Subtracts, clamping at zero instead of going negative. Returns
    /// whether clamping occurred so callers can raise a drift warning
    /// (section 7, `StateDrift`).
    pub fn saturating_sub(&self, other: &Self) -> (Self, bool) {
        match self.checked_sub(other) {
            Some(v) => (v, false),
            None => (FixedPoint::zero(), true),
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        FixedPoint { raw: (&self.raw * &other.raw) / scale() }
    }

    pub fn checked_div(&self, other: &Self) -> Result<Self, FixedPointError> {
        if other.raw.is_zero() {
            return Err(FixedPointError::DivisionByZero);
        }
        Ok(FixedPoint { raw: (&self.raw * scale()) / &other.raw })
    }

    pub fn min(a: Self, b: Self) -> Self {
        if a.raw <= b.raw { a } else { b }
    }
}

impl Default for FixedPoint {
    fn default() -> Self {
        FixedPoint::zero()
    }
}

impl PartialOrd for FixedPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl std::ops::Add for FixedPoint {
    type Output = FixedPoint;
    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(&rhs)
    }
}

impl std::ops::Add<&FixedPoint> for &FixedPoint {
    type Output = FixedPoint;
    fn add(self, rhs: &FixedPoint) -> Self::Output {
        self.checked_add(rhs)
    }
}

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedPoint({self})")
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = FIXED_POINT_PRECISION as usize;
        let digits = self.raw.to_str_radix(10);
        let padded = format!("{digits:0>width$}", width = precision + 1);
        let split_at = padded.len() - precision;
        let (int_part, frac_part) = padded.split_at(split_at);
        let trimmed_frac = frac_part.trim_end_matches('0');
        if trimmed_frac.is_empty() {
            write!(f, "{int_part}")
        } else {
            write!(f, "{int_part}.{trimmed_frac}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_round_trip() {
        let v = FixedPoint::from_decimal_str("123.456").unwrap();
        assert_eq!(v.to_string(), "123.456");
    }

    #[test]
    fn parses_bare_integer() {
        let v = FixedPoint::from_decimal_str("42").unwrap();
        assert_eq!(v, FixedPoint::from_u64(42));
    }

    #[test]
    fn rejects_garbage() {
        assert!(FixedPoint::from_decimal_str("-1").is_err());
        assert!(FixedPoint::from_decimal_str("1.2.3").is_err());
        assert!(FixedPoint::from_decimal_str("").is_err());
        assert!(FixedPoint::from_decimal_str("abc").is_err());
    }

    #[test]
    fn truncates_rather_than_rounds_extra_digits() {
        // One more digit than precision allows; a half-up scheme would round
        // this up, truncation must not.
        let precision = FIXED_POINT_PRECISION as usize;
        let s = format!("1.{}9", "0".repeat(precision - 1));
        let v = FixedPoint::from_decimal_str(&s).unwrap();
        assert_eq!(v, FixedPoint::from_u64(1));
    }

    #[test]
    fn multiplication_truncates() {
        // 1/3 * 3 should truncate to something just under 1, not exactly 1.
        let one = FixedPoint::one();
        let three = FixedPoint::from_u64(3);
        let third = one.checked_div(&three).unwrap();
        let back = third.mul(&three);
        assert!(back < one);
    }

    #[test]
    fn division_by_zero_errs() {
        let v = FixedPoint::from_u64(1);
        assert_eq!(
            v.checked_div(&FixedPoint::zero()),
            Err(FixedPointError::DivisionByZero)
        );
    }

    #[test]
    fn saturating_sub_clamps_and_flags() {
        let five = FixedPoint::from_u64(5);
        let seven = FixedPoint::from_u64(7);
        let (result, saturated) = five.saturating_sub(&seven);
        assert!(result.is_zero());
        assert!(saturated);

        let (result, saturated) = seven.saturating_sub(&five);
        assert_eq!(result, FixedPoint::from_u64(2));
        assert!(!saturated);
    }

    #[test]
    fn scaled_round_trip_respects_decimals() {
        let raw = BigUint::from(123_456_789u64);
        let v = FixedPoint::from_scaled(raw.clone(), 8);
        assert_eq!(v.to_scaled(8), raw);
    }

    #[test]
    fn borrow_index_ratio_preserves_precision_above_1e18() {
        // Both index values exceed 1e18, as called out in design notes §9.
        let principal = FixedPoint::from_u64(1_000);
        let index_now = FixedPoint::from_decimal_str("2000000000000000000.0").unwrap();
        let index_at_principal = FixedPoint::from_decimal_str("1000000000000000000.0").unwrap();
        let owed = principal.mul(&index_now).checked_div(&index_at_principal).unwrap();
        assert_eq!(owed, FixedPoint::from_u64(2_000));
    }
}
