//! # Money Module
//!
//! Provides the `Money` and `Rate` types plus the rounding utilities every
//! price in Plateful flows through.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A card processor settles whole cents. If our receipt is built from    │
//! │  floats, the lines can sum to $24.4099999 while the charge is $24.41.  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Integer Rates                            │
//! │    Money = i64 cents, Rate = exact decimal fraction                    │
//! │    Every division states its rounding mode explicitly                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use plateful_core::money::{apply_percent, Money, Rate, Rounding};
//!
//! let subtotal = Money::from_cents(2000);              // $20.00
//! let tax_rate = Rate::from_percentage(9.5).unwrap();  // 9.5%
//!
//! let tax = apply_percent(subtotal, tax_rate, Rounding::Round).unwrap();
//! assert_eq!(tax.cents(), 190);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::PricingError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Discount lines on a receipt are negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serializes as a bare integer**: Stored order records stay readable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use plateful_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Adds two amounts, failing with [`PricingError::Overflow`] instead of wrapping.
    pub fn checked_add(self, other: Money) -> Result<Money, PricingError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(PricingError::Overflow)
    }

    /// Subtracts two amounts, failing with [`PricingError::Overflow`] instead of wrapping.
    pub fn checked_sub(self, other: Money) -> Result<Money, PricingError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(PricingError::Overflow)
    }

    /// Multiplies by a quantity, failing with [`PricingError::Overflow`] instead of wrapping.
    ///
    /// ## Example
    /// ```rust
    /// use plateful_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1250); // burger + cheese
    /// assert_eq!(unit_price.checked_mul(3).unwrap().cents(), 3750);
    /// assert!(Money::from_cents(i64::MAX).checked_mul(2).is_err());
    /// ```
    pub fn checked_mul(self, qty: i64) -> Result<Money, PricingError> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or(PricingError::Overflow)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// An exact rate held as a decimal fraction of the whole: `units / 10^scale`.
///
/// ## Why Decimal?
/// Rates are configured as decimals (`9.5`, `8.875`, `0.029`). Keeping every
/// digit that was written means `base × rate` is computed exactly and the
/// only rounding is the one the caller asks for.
///
/// ```text
///   9.5%        tax          →   95 / 10^3
///   8.875%      tax          → 8875 / 10^5
///   0.029       processing   →   29 / 10^3
///   99.99996%   discount     → 9999996 / 10^7
///   100%        discount     →    1 / 10^0
/// ```
///
/// Values are kept normalized (no trailing zero digits), so equal rates
/// compare equal however they were built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "RateParts")]
#[ts(export)]
pub struct Rate {
    units: u64,
    scale: u32,
}

/// Most decimal places a rate may carry, as a fraction of the whole.
pub const MAX_RATE_SCALE: u32 = 18;

#[derive(Deserialize)]
struct RateParts {
    units: u64,
    scale: u32,
}

impl TryFrom<RateParts> for Rate {
    type Error = PricingError;

    fn try_from(parts: RateParts) -> Result<Self, Self::Error> {
        Rate::from_parts(parts.units, parts.scale)
    }
}

impl Rate {
    /// Creates the rate `units / 10^scale` of the whole.
    ///
    /// ## Example
    /// ```rust
    /// use plateful_core::money::Rate;
    ///
    /// assert_eq!(Rate::from_parts(29, 3).unwrap(), Rate::from_fraction(0.029).unwrap());
    /// assert!(Rate::from_parts(1, 19).is_err());
    /// ```
    pub fn from_parts(units: u64, scale: u32) -> Result<Self, PricingError> {
        if scale > MAX_RATE_SCALE {
            return Err(PricingError::invalid_amount(
                "rate",
                format!("has more than {} decimal places", MAX_RATE_SCALE),
            ));
        }

        let (mut units, mut scale) = (units, scale);
        while scale > 0 && units % 10 == 0 {
            units /= 10;
            scale -= 1;
        }
        if units == 0 {
            scale = 0;
        }

        Ok(Rate { units, scale })
    }

    /// Creates a rate from a percentage value (9.5 = 9.5%).
    ///
    /// Every decimal digit of the value is kept. Fails with
    /// [`PricingError::InvalidAmount`] when the value is NaN, infinite,
    /// negative, too large, or carries more decimal places than
    /// [`MAX_RATE_SCALE`] allows.
    pub fn from_percentage(pct: f64) -> Result<Self, PricingError> {
        let (units, places) = decimal_parts(pct)?;
        Self::from_parts(units, places + 2)
    }

    /// Creates a rate from a fraction of the whole (0.029 = 2.9%).
    pub fn from_fraction(fraction: f64) -> Result<Self, PricingError> {
        let (units, places) = decimal_parts(fraction)?;
        Self::from_parts(units, places)
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate { units: 0, scale: 0 }
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.units == 0
    }

    /// Checks if the rate is 100% or more.
    pub fn is_whole_or_more(&self) -> bool {
        let (units, whole) = self.ratio();
        units >= whole
    }

    /// `(units, 10^scale)` for exact integer arithmetic.
    pub(crate) fn ratio(&self) -> (i128, i128) {
        (self.units as i128, 10i128.pow(self.scale))
    }
}

/// Digits of a non-negative finite `f64` as written in its shortest
/// round-trip form: `8.875` → `(8875, 3)`.
fn decimal_parts(value: f64) -> Result<(u64, u32), PricingError> {
    if !value.is_finite() {
        return Err(PricingError::invalid_amount("rate", "must be a finite number"));
    }
    if value < 0.0 {
        return Err(PricingError::invalid_amount("rate", "must not be negative"));
    }

    // abs() turns -0.0 into 0.0
    let text = value.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut units: u64 = 0;
    for c in int_part.chars().chain(frac_part.chars()) {
        let digit = c
            .to_digit(10)
            .ok_or_else(|| PricingError::invalid_amount("rate", "is not a decimal number"))?;
        units = units
            .checked_mul(10)
            .and_then(|u| u.checked_add(digit as u64))
            .ok_or_else(|| PricingError::invalid_amount("rate", "is too large"))?;
    }

    let places = u32::try_from(frac_part.len())
        .map_err(|_| PricingError::invalid_amount("rate", "is too precise"))?;
    Ok((units, places))
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

/// Shows the rate as a trimmed percentage: `9.5%`, `10%`, `8.875%`.
impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.units as u128;
        if self.scale <= 2 {
            return write!(f, "{}%", units * 10u128.pow(2 - self.scale));
        }

        let places = (self.scale - 2) as usize;
        let per_percent = 10u128.pow(self.scale - 2);
        let (whole, frac) = (units / per_percent, units % per_percent);
        if frac == 0 {
            return write!(f, "{}%", whole);
        }
        let digits = format!("{:0width$}", frac, width = places);
        write!(f, "{}.{}%", whole, digits.trim_end_matches('0'))
    }
}

// =============================================================================
// Rounding Utilities
// =============================================================================

/// Rounding rule applied whenever a division leaves a fractional cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Toward positive infinity. Fees use this so the platform never under-collects.
    Ceil,
    /// To nearest, half away from zero. Tax and discount use this.
    Round,
    /// Toward negative infinity.
    Floor,
}

/// Divides `num` by a positive `den` under the given rounding rule.
pub(crate) fn div_rounded(num: i128, den: i128, rounding: Rounding) -> i128 {
    debug_assert!(den > 0, "divisor must be positive");

    let quotient = num.div_euclid(den);
    let remainder = num.rem_euclid(den);

    match rounding {
        Rounding::Floor => quotient,
        Rounding::Ceil => {
            if remainder == 0 {
                quotient
            } else {
                quotient + 1
            }
        }
        // Floor quotient plus remainder in [0, den): ties go up for positive
        // values and stay down (away from zero) for negative ones.
        Rounding::Round => {
            let twice = remainder * 2;
            let round_up = if num >= 0 { twice >= den } else { twice > den };
            if round_up {
                quotient + 1
            } else {
                quotient
            }
        }
    }
}

/// Narrows an i128 intermediate back into Money.
pub(crate) fn money_from_i128(value: i128) -> Result<Money, PricingError> {
    i64::try_from(value)
        .map(Money::from_cents)
        .map_err(|_| PricingError::Overflow)
}

/// Converts a decimal dollar amount into cents.
///
/// Multiplies by 100 and rounds half away from zero, so `10.005` becomes
/// `1001`. Negative amounts are accepted; use
/// [`to_non_negative_minor_units`] where they are not allowed.
///
/// ## Example
/// ```rust
/// use plateful_core::money::to_minor_units;
///
/// assert_eq!(to_minor_units(12.34).unwrap().cents(), 1234);
/// assert_eq!(to_minor_units(-0.5).unwrap().cents(), -50);
/// assert!(to_minor_units(f64::NAN).is_err());
/// ```
pub fn to_minor_units(amount: f64) -> Result<Money, PricingError> {
    if !amount.is_finite() {
        return Err(PricingError::invalid_amount("amount", "must be a finite number"));
    }

    let scaled = (amount * 100.0).round();
    if scaled >= i64::MAX as f64 || scaled <= i64::MIN as f64 {
        return Err(PricingError::invalid_amount("amount", "is out of range"));
    }

    Ok(Money::from_cents(scaled as i64))
}

/// Same as [`to_minor_units`] but rejects negative amounts.
pub fn to_non_negative_minor_units(amount: f64) -> Result<Money, PricingError> {
    let money = to_minor_units(amount)?;
    if money.is_negative() {
        return Err(PricingError::invalid_amount("amount", "must not be negative"));
    }
    Ok(money)
}

/// Computes `base × rate` exactly, then rounds once under the given rule.
///
/// ## User Workflow
/// ```text
/// Taxable: $20.00
///      │
///      ├── apply_percent(9.5%, Round) ──► Tax:         $1.90
///      │
///      └── apply_percent(7.5%, Ceil)  ──► Service fee: $1.50
/// ```
pub fn apply_percent(base: Money, rate: Rate, rounding: Rounding) -> Result<Money, PricingError> {
    let (units, whole) = rate.ratio();
    let product = (base.cents() as i128)
        .checked_mul(units)
        .ok_or(PricingError::Overflow)?;
    money_from_i128(div_rounded(product, whole, rounding))
}

/// Returns `min(value, cap)` when a cap is set, otherwise `value`.
///
/// ## Example
/// ```rust
/// use plateful_core::money::{cap_at, Money};
///
/// let fee = Money::from_cents(15000);
/// assert_eq!(cap_at(fee, Some(Money::from_cents(995))).cents(), 995);
/// assert_eq!(cap_at(fee, None).cents(), 15000);
/// ```
#[inline]
pub fn cap_at(value: Money, cap: Option<Money>) -> Money {
    match cap {
        Some(cap) => value.min(cap),
        None => value,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
