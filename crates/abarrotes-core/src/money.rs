//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:  0.1 + 0.2 = 0.30000000000000004                          │
//! │                                                                         │
//! │  A sale total must equal Σ quantity × price of its items EXACTLY.       │
//! │  Integer cents make that equality hold by construction:                 │
//! │    2 × 2200 + 1 × 1850 = 6250 cents = $62.50                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use abarrotes_core::money::Money;
//!
//! let price = Money::from_cents(2200);      // $22.00
//! let line = price * 2;                     // $44.00
//! let total = line + Money::parse("18.5").unwrap();
//! assert_eq!(total.cents(), 6250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so that differences (e.g. margin = sale - purchase) can go below
/// zero; the stored prices themselves are validated as non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use abarrotes_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ```rust
    /// use abarrotes_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Parses a decimal amount typed by a user.
    ///
    /// ## Accepted Input
    /// ```text
    ///   "22"      → 2200
    ///   "18.5"    → 1850
    ///   "$ 0.99"  → 99
    ///   ".5"      → 50
    ///   "-3.25"   → -325   (sign is kept; range checks happen in validation)
    ///
    ///   ""  "abc"  "1.234"  "1,50"  "1.2.3"  → InvalidFormat
    /// ```
    ///
    /// At most two fraction digits are accepted: a third digit would be
    /// silently lost otherwise.
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        parse_amount("amount", input)
    }
}

/// Parses `input` as a decimal amount, reporting errors against `field`.
pub(crate) fn parse_amount(field: &str, input: &str) -> Result<Money, ValidationError> {
    let invalid = |reason: &str| ValidationError::invalid_format(field, reason);

    let mut text = input.trim();
    let negative = text.starts_with('-');
    if negative {
        text = text[1..].trim_start();
    }
    if let Some(rest) = text.strip_prefix('$') {
        text = rest.trim_start();
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("expected a number"));
    }
    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) {
        return Err(invalid("expected a number"));
    }
    if fraction.len() > 2 {
        return Err(invalid("at most two decimal places are allowed"));
    }

    let units: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("amount is too large"))?
    };
    let minor: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid("expected a number"))? * 10,
        _ => fraction.parse().map_err(|_| invalid("expected a number"))?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(minor))
        .ok_or_else(|| invalid("amount is too large"))?;

    Ok(Money(if negative { -cents } else { cents }))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$12.34`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
