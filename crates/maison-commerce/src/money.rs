//! Money type for representing monetary values.
//!
//! Uses cents-based integer representation to avoid floating-point
//! precision issues that plague monetary calculations. Every arithmetic
//! operation is checked and reports currency mismatches or overflow as
//! [`CommerceError`] instead of panicking.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    AED,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "INR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::INR => "INR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::AED => "AED",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol (e.g., "₹").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "\u{20b9}",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::AED => "AED ",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "INR" => Some(Currency::INR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "AED" => Some(Currency::AED),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (paise for INR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit.
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Format as a display string (e.g., "₹1299.00").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "1299.00").
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places();
        if places == 0 {
            return self.amount_cents.to_string();
        }
        let divisor = 10_i64.pow(places);
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        let divisor = divisor as u64;
        format!(
            "{sign}{}.{:0width$}",
            abs / divisor,
            abs % divisor,
            width = places as usize
        )
    }

    /// Add another Money value.
    pub fn try_add(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount_cents
            .checked_add(other.amount_cents)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Subtract another Money value.
    pub fn try_subtract(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount_cents
            .checked_sub(other.amount_cents)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Multiply by a scalar.
    pub fn try_multiply(&self, factor: i64) -> Result<Money, CommerceError> {
        let amount = self
            .amount_cents
            .checked_mul(factor)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(amount, self.currency))
    }

    /// Calculate a whole-number percentage of this amount, rounded down.
    pub fn percentage(&self, percent: i64) -> Result<Money, CommerceError> {
        let scaled = self
            .amount_cents
            .checked_mul(percent)
            .ok_or(CommerceError::Overflow)?;
        Ok(Money::new(scaled.div_euclid(100), self.currency))
    }

    /// The smaller of two amounts in the same currency.
    pub fn min(self, other: Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(&other)?;
        Ok(if other.amount_cents < self.amount_cents {
            other
        } else {
            self
        })
    }

    /// Sum an iterator of Money values.
    pub fn try_sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Result<Money, CommerceError> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), CommerceError> {
        if self.currency != other.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(129900, Currency::INR).display(), "\u{20b9}1299.00");
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(5, Currency::USD).display_amount(), "0.05");
        assert_eq!(Money::new(-250, Currency::USD).display_amount(), "-2.50");
        assert_eq!(Money::new(100, Currency::JPY).display(), "\u{00a5}100");
    }

    #[test]
    fn test_money_addition() {
        let a = Money::new(1000, Currency::INR);
        let b = Money::new(500, Currency::INR);
        assert_eq!(a.try_add(&b).unwrap().amount_cents, 1500);
    }

    #[test]
    fn test_money_subtraction() {
        let a = Money::new(1000, Currency::INR);
        let b = Money::new(300, Currency::INR);
        assert_eq!(a.try_subtract(&b).unwrap().amount_cents, 700);
    }

    #[test]
    fn test_money_currency_mismatch() {
        let inr = Money::new(1000, Currency::INR);
        let eur = Money::new(1000, Currency::EUR);
        assert!(matches!(
            inr.try_add(&eur),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_money_overflow() {
        let big = Money::new(i64::MAX, Currency::INR);
        assert!(matches!(big.try_multiply(2), Err(CommerceError::Overflow)));
        assert!(matches!(
            big.try_add(&Money::new(1, Currency::INR)),
            Err(CommerceError::Overflow)
        ));
    }

    #[test]
    fn test_money_percentage_rounds_down() {
        let m = Money::new(999, Currency::INR);
        assert_eq!(m.percentage(10).unwrap().amount_cents, 99);
        assert_eq!(Money::new(10000, Currency::INR).percentage(15).unwrap().amount_cents, 1500);
    }

    #[test]
    fn test_money_sum() {
        let items = [
            Money::new(100, Currency::INR),
            Money::new(250, Currency::INR),
        ];
        let total = Money::try_sum(items.iter(), Currency::INR).unwrap();
        assert_eq!(total.amount_cents, 350);
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("INR"), Some(Currency::INR));
        assert_eq!(Currency::from_code("eur"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("INVALID"), None);
        assert_eq!(Currency::default(), Currency::INR);
    }
}
