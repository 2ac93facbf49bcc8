//! Quantity types
//!
//! Domain primitives for ingredient amounts and cooking times. Both are
//! validated at construction, so a value that exists is always >= 1.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound for a stored cooking time (minutes)
const MAX_COOKING_TIME: i64 = 32_767;

/// Upper bound for a single ingredient amount on a recipe
const MAX_AMOUNT: i64 = i32::MAX as i64;

/// Errors that can occur when creating a quantity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    #[error("Value must be 1 or greater (got {0})")]
    NotPositive(i64),

    #[error("Value exceeds maximum allowed ({max}, got {got})")]
    Overflow { max: i64, got: i64 },

    #[error("Invalid number: {0}")]
    ParseError(String),
}

/// Amount of one ingredient in one recipe.
///
/// # Invariants
/// - Value is always >= 1
/// - Value fits the `amount INTEGER` column
///
/// # Example
/// ```
/// use recipe_book::domain::Amount;
///
/// let amount = Amount::new(200).unwrap();
/// assert_eq!(amount.value(), 200);
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i32);

impl Amount {
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }
        if value > MAX_AMOUNT {
            return Err(QuantityError::Overflow {
                max: MAX_AMOUNT,
                got: value,
            });
        }
        Ok(Self(value as i32))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|e| QuantityError::ParseError(e.to_string()))?;
        Amount::new(value)
    }
}

impl TryFrom<i64> for Amount {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0 as i64
    }
}

/// Cooking time in minutes, >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CookingTime(i32);

impl CookingTime {
    pub fn new(minutes: i64) -> Result<Self, QuantityError> {
        if minutes < 1 {
            return Err(QuantityError::NotPositive(minutes));
        }
        if minutes > MAX_COOKING_TIME {
            return Err(QuantityError::Overflow {
                max: MAX_COOKING_TIME,
                got: minutes,
            });
        }
        Ok(Self(minutes as i32))
    }

    pub fn minutes(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for CookingTime {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        CookingTime::new(value)
    }
}

impl From<CookingTime> for i64 {
    fn from(time: CookingTime) -> Self {
        time.0 as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(100).unwrap();
        assert_eq!(amount.value(), 100);
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert_eq!(Amount::new(0), Err(QuantityError::NotPositive(0)));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert!(matches!(Amount::new(-5), Err(QuantityError::NotPositive(-5))));
    }

    #[test]
    fn test_amount_overflow() {
        let result = Amount::new(i64::from(i32::MAX) + 1);
        assert!(matches!(result, Err(QuantityError::Overflow { .. })));
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Amount = " 15 ".parse().unwrap();
        assert_eq!(amount.value(), 15);

        let bad: Result<Amount, _> = "ten".parse();
        assert!(matches!(bad, Err(QuantityError::ParseError(_))));
    }

    #[test]
    fn test_amount_serde_rejects_zero() {
        let ok: Amount = serde_json::from_str("3").unwrap();
        assert_eq!(ok.value(), 3);
        assert!(serde_json::from_str::<Amount>("0").is_err());
    }

    #[test]
    fn test_cooking_time_bounds() {
        assert!(CookingTime::new(1).is_ok());
        assert!(CookingTime::new(0).is_err());
        assert!(CookingTime::new(32_767).is_ok());
        assert!(matches!(
            CookingTime::new(32_768),
            Err(QuantityError::Overflow { max: 32_767, .. })
        ));
    }
}
