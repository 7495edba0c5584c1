use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

const CENTS_PER_POINT: i64 = 100;

//--------------------------------------       Points        ---------------------------------------------------------
/// A loyalty points amount, stored as a whole number of hundredths of a point.
///
/// On the wire (JSON) points are plain numbers, e.g. `729.98`.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[sqlx(transparent)]
pub struct Points(i64);

op!(binary Points, Add, add);
op!(binary Points, Sub, sub);
op!(inplace Points, AddAssign, add_assign);
op!(inplace Points, SubAssign, sub_assign);
op!(unary Points, Neg, neg);

impl Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Value cannot be represented as loyalty points: {0}")]
pub struct PointsConversionError(String);

impl Points {
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Construct an amount from hundredths of a point.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_points(points: i64) -> Self {
        Self(points * CENTS_PER_POINT)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / CENTS_PER_POINT as f64
    }

    /// Converts a decimal amount into points, rounding to the nearest hundredth. Negative and non-finite values are
    /// rejected.
    pub fn try_from_f64(value: f64) -> Result<Self, PointsConversionError> {
        if !value.is_finite() {
            return Err(PointsConversionError(format!("{value} is not a finite number")));
        }
        if value < 0.0 {
            return Err(PointsConversionError(format!("{value} is negative")));
        }
        whole_cents(value * CENTS_PER_POINT as f64)
            .map(Self)
            .ok_or_else(|| PointsConversionError(format!("{value} is too large")))
    }

    /// `None` if the sum does not fit.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

/// Rounds to a whole number of cents. `i64::MAX as f64` is 2^63, one past the largest `i64`, so it is out of range.
fn whole_cents(cents: f64) -> Option<i64> {
    let cents = cents.round();
    if cents >= i64::MAX as f64 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(cents as i64)
}

impl From<i64> for Points {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / CENTS_PER_POINT as u64;
        let frac = abs % CENTS_PER_POINT as u64;
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Points {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Points::try_from_f64(value).map_err(de::Error::custom)
    }
}
