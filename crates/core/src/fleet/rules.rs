//! Fleet validation rules.

use rust_decimal::Decimal;

use super::error::FleetError;
use crate::trip::LifecycleService;

/// Stateless validation for truck input.
pub struct FleetRules;

impl FleetRules {
    /// Trim and upper-case a number plate.
    ///
    /// # Errors
    ///
    /// `NumberPlateRequired` if nothing is left after trimming.
    pub fn normalize_plate(raw: &str) -> Result<String, FleetError> {
        let plate = raw.trim();
        if plate.is_empty() {
            return Err(FleetError::NumberPlateRequired);
        }
        Ok(plate.to_uppercase())
    }

    /// Daily fixed cost follows the same rule as any other amount.
    ///
    /// # Errors
    ///
    /// `InvalidFixedCost` for zero or negative values, fractions of a paisa,
    /// or anything too large to store.
    pub fn validate_fixed_cost(cost: Decimal) -> Result<Decimal, FleetError> {
        LifecycleService::validate_amount(cost).map_err(|_| FleetError::InvalidFixedCost(cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("  tn09ab1234 ", "TN09AB1234")]
    #[case("KA01 MX 0001", "KA01 MX 0001")]
    fn test_normalize_plate(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(FleetRules::normalize_plate(raw).unwrap(), expected);
    }

    #[test]
    fn test_blank_plate_is_required() {
        assert!(matches!(
            FleetRules::normalize_plate("   "),
            Err(FleetError::NumberPlateRequired)
        ));
    }

    #[test]
    fn test_fixed_cost() {
        assert_eq!(FleetRules::validate_fixed_cost(dec!(1500)).unwrap(), dec!(1500));
        assert!(FleetRules::validate_fixed_cost(dec!(0)).is_err());
        assert!(FleetRules::validate_fixed_cost(dec!(-1)).is_err());
    }

    #[rstest]
    #[case(dec!(0.001))]
    #[case(dec!(1500.125))]
    #[case(dec!(1000000000000))]
    fn test_fixed_cost_must_fit_in_paise(#[case] cost: Decimal) {
        assert!(matches!(
            FleetRules::validate_fixed_cost(cost),
            Err(FleetError::InvalidFixedCost(c)) if c == cost
        ));
    }
}
