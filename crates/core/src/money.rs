use rust_decimal::{Decimal, RoundingStrategy};

/// Quantize a currency amount to 2 decimal places.
///
/// Midpoints round to the nearest even digit, matching the decimal
/// arithmetic the shop's books were originally kept with.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Quantize a parts multiplier to 4 decimal places.
pub fn round_multiplier(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{round_money, round_multiplier};

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    #[test]
    fn money_rounds_to_two_places() {
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
        assert_eq!(round_money(dec("10.006")), dec("10.01"));
    }

    #[test]
    fn money_midpoints_round_to_even() {
        assert_eq!(round_money(dec("0.125")), dec("0.12"));
        assert_eq!(round_money(dec("0.135")), dec("0.14"));
    }

    #[test]
    fn multiplier_keeps_four_places() {
        assert_eq!(round_multiplier(dec("1.30")), dec("1.3000"));
        assert_eq!(round_multiplier(dec("1.23456")), dec("1.2346"));
    }

    #[test]
    fn rounding_is_stable_under_repetition() {
        let once = round_money(dec("42.555"));
        assert_eq!(round_money(once), once);
    }
}
