//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as JSON numbers in major units (e.g. `19.99` dollars). The
//! workspace builds `serde_json` with `arbitrary_precision`, so a number
//! reaches [`Decimal`] as its literal digits rather than as an `f64`, and the
//! charge sent to the payment gateway is exactly `price * 100`.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize, Serializer};

/// Errors converting a [`Price`] into gateway minor units.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Zero or negative price.
    #[error("price must be greater than zero")]
    NotPositive,
    /// More than two decimal places: `price * 100` is not a whole number.
    #[error("price {0} has more precision than the currency's minor unit")]
    SubMinorUnit(Decimal),
    /// The amount does not fit the gateway's integer range.
    #[error("price {0} is too large")]
    Overflow(Decimal),
}

/// A price in the currency's major unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The amount in major units.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Convert to integer minor units (`price * 100`).
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the price is not positive, has sub-cent
    /// precision, or overflows `i64`.
    pub fn to_minor_units(&self) -> Result<i64, PriceError> {
        if self.0 <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }

        let scaled = self
            .0
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PriceError::Overflow(self.0))?;

        if !scaled.fract().is_zero() {
            return Err(PriceError::SubMinorUnit(self.0));
        }

        scaled.to_i64().ok_or(PriceError::Overflow(self.0))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Clients expect a JSON number, not the decimal's default string form.
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let number = serde_json::Number::from_str(&self.0.normalize().to_string())
            .map_err(serde::ser::Error::custom)?;
        number.serialize(serializer)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// ISO 4217 currency codes accepted by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Lowercase code as the gateway expects it on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(json: &str) -> Price {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_whole_price_scales_exactly() {
        assert_eq!(price("1999").to_minor_units(), Ok(199_900));
    }

    #[test]
    fn test_fractional_price_has_no_float_drift() {
        // 19.99 * 100 in f64 is 1998.9999999999998
        assert_eq!(price("19.99").to_minor_units(), Ok(1999));
        assert_eq!(price("0.29").to_minor_units(), Ok(29));
    }

    #[test]
    fn test_price_beyond_f64_precision_keeps_every_digit() {
        // Nearest f64 is 90071992547409.92
        let exact = price("90071992547409.93");
        assert_eq!(exact.amount(), Decimal::from_str("90071992547409.93").unwrap());
        assert_eq!(exact.to_minor_units(), Ok(9_007_199_254_740_993));
    }

    #[test]
    fn test_string_price_is_accepted() {
        assert_eq!(price("\"12.50\"").to_minor_units(), Ok(1250));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(price("0").to_minor_units(), Err(PriceError::NotPositive));
        assert_eq!(price("-5").to_minor_units(), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_rejects_sub_cent_precision() {
        assert!(matches!(
            price("1.005").to_minor_units(),
            Err(PriceError::SubMinorUnit(_))
        ));
    }

    #[test]
    fn test_rejects_overflow() {
        let huge = Price::new(Decimal::from_str("100000000000000000000").unwrap());
        assert!(matches!(huge.to_minor_units(), Err(PriceError::Overflow(_))));
    }

    #[test]
    fn test_serializes_as_json_number() {
        assert_eq!(serde_json::to_string(&price("1999")).unwrap(), "1999");
        assert_eq!(serde_json::to_string(&price("19.99")).unwrap(), "19.99");
        assert_eq!(serde_json::to_string(&price("\"12.50\"")).unwrap(), "12.5");
        assert_eq!(
            serde_json::to_string(&price("90071992547409.93")).unwrap(),
            "90071992547409.93"
        );
    }

    #[test]
    fn test_currency_wire_code() {
        assert_eq!(CurrencyCode::default().as_str(), "usd");
        assert_eq!(serde_json::to_string(&CurrencyCode::GBP).unwrap(), "\"gbp\"");
    }
}
