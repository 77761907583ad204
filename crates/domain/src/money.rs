// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fixed-point money and percentage rates.
//!
//! Amounts are held as integer cents so that every intermediate pricing
//! step is rounded to the smallest currency unit exactly once. On the wire
//! amounts are plain decimal numbers (`321.0`, `112.35`).

use crate::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Add, Sub};

/// Largest accepted amount, in cents (ten million currency units).
const MAX_CENTS: i64 = 1_000_000_000;

/// A monetary amount in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// The largest amount that can be stored and read back.
    pub const MAX: Self = Self(MAX_CENTS);

    /// Creates an amount from a cent count.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Converts a decimal amount (e.g. `12.5`) into cents, rounding to the
    /// nearest cent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the value is not finite,
    /// negative, or unreasonably large.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_decimal(field: &str, value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::InvalidAmount {
                field: field.to_string(),
                reason: String::from("amount must be a finite number"),
            });
        }
        if value < 0.0 {
            return Err(DomainError::InvalidAmount {
                field: field.to_string(),
                reason: format!("amount must not be negative, got {value}"),
            });
        }
        let cents: f64 = (value * 100.0).round();
        if cents > MAX_CENTS as f64 {
            return Err(DomainError::InvalidAmount {
                field: field.to_string(),
                reason: format!("amount {value} exceeds the supported maximum"),
            });
        }
        Ok(Self(cents as i64))
    }

    /// Returns the amount as a decimal number of currency units.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Multiplies by a rate and rounds half away from zero to the cent.
    #[must_use]
    pub fn apply_rate(self, rate: Rate) -> Self {
        let product: i128 = i128::from(self.0) * i128::from(rate.basis_points());
        let half: i128 = i128::from(Rate::SCALE) / 2;
        let rounded: i128 = if product >= 0 {
            (product + half) / i128::from(Rate::SCALE)
        } else {
            (product - half) / i128::from(Rate::SCALE)
        };
        // Bounded by MAX_CENTS * 10_000 / 10_000 for accepted inputs.
        #[allow(clippy::cast_possible_truncation)]
        Self(rounded as i64)
    }

    /// Returns true if the amount is above [`Money::MAX`].
    #[must_use]
    pub const fn exceeds_max(self) -> bool {
        self.0 > MAX_CENTS
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Saturating subtraction that never goes below zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        let value: i64 = self.0 - other.0;
        if value < 0 { Self(0) } else { Self(value) }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign: &str = if self.0 < 0 { "-" } else { "" };
        let abs: i64 = self.0.abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value: f64 = f64::deserialize(deserializer)?;
        Self::from_decimal("amount", value).map_err(serde::de::Error::custom)
    }
}

/// A percentage expressed in basis points (1/100 of a percent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(u32);

impl Rate {
    /// Basis points in 100%.
    pub const SCALE: u32 = 10_000;

    /// Creates a rate from basis points (`3500` is 35%).
    #[must_use]
    pub const fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    /// Creates a rate from a whole percentage.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDepositPercent` if the percentage exceeds 100.
    pub const fn from_percent(percent: u32) -> Result<Self, DomainError> {
        if percent > 100 {
            return Err(DomainError::InvalidDepositPercent(percent));
        }
        Ok(Self(percent * 100))
    }

    /// Returns the rate in basis points.
    #[must_use]
    pub const fn basis_points(self) -> u32 {
        self.0
    }
}
