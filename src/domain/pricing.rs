use crate::domain::money::{Money, round_minor};
use crate::domain::room::Room;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Flat GST applied to the post-discount subtotal.
pub const GST_RATE: Decimal = dec!(0.18);

/// Uplift applied when check-in falls in an exam-season month.
pub const SEASONAL_MULTIPLIER: Decimal = dec!(1.10);

/// Months with exam-driven demand: March, April, October, November.
const EXAM_SEASON_MONTHS: [u32; 4] = [3, 4, 10, 11];

/// Fixed promo-code discount table. Lookup is case-insensitive; unknown codes
/// resolve to zero rather than erroring.
const PROMO_CODES: [(&str, Decimal); 3] = [
    ("VIRAMAH10", dec!(0.10)),
    ("STUDENT15", dec!(0.15)),
    ("WELCOME5", dec!(0.05)),
];

/// Input ratios retained for audit and display.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PriceBreakdown {
    pub per_night: Money,
    pub seasonal_multiplier: Decimal,
    pub long_term_discount: Decimal,
    pub promo_discount: Decimal,
    pub tax_rate: Decimal,
}

/// Itemized price for a stay. Invariant: `total == base - discount + tax`,
/// all four in whole minor units.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PricingResult {
    pub nights: i64,
    pub base_amount: Money,
    pub discount_amount: Money,
    pub tax_amount: Money,
    pub total_amount: Money,
    pub breakdown: PriceBreakdown,
}

fn promo_discount(code: &str) -> Decimal {
    PROMO_CODES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, discount)| *discount)
        .unwrap_or(Decimal::ZERO)
}

fn long_term_discount(nights: i64) -> Decimal {
    if nights >= 365 {
        dec!(0.10)
    } else if nights >= 180 {
        dec!(0.05)
    } else {
        Decimal::ZERO
    }
}

/// Computes the itemized price for a stay. Pure and deterministic.
///
/// Rounding happens only at the four output fields, in base -> discount ->
/// tax -> total order; the intermediate ratios stay exact decimals.
pub fn calculate_price(
    room: &Room,
    check_in: NaiveDate,
    check_out: NaiveDate,
    promo_code: Option<&str>,
) -> PricingResult {
    // Same-day checkout still bills one night.
    let nights = (check_out - check_in).num_days().max(1);

    let seasonal_multiplier = if EXAM_SEASON_MONTHS.contains(&check_in.month()) {
        SEASONAL_MULTIPLIER
    } else {
        Decimal::ONE
    };
    let long_term = long_term_discount(nights);
    let promo = promo_code.map(promo_discount).unwrap_or(Decimal::ZERO);

    let base_amount = round_minor(
        room.base_rate.to_decimal() * Decimal::from(nights) * seasonal_multiplier,
    );
    let discount_amount = round_minor(base_amount.to_decimal() * (long_term + promo));
    let tax_amount = round_minor((base_amount - discount_amount).to_decimal() * GST_RATE);
    let total_amount = base_amount - discount_amount + tax_amount;

    PricingResult {
        nights,
        base_amount,
        discount_amount,
        tax_amount,
        total_amount,
        breakdown: PriceBreakdown {
            per_night: room.base_rate,
            seasonal_multiplier,
            long_term_discount: long_term,
            promo_discount: promo,
            tax_rate: GST_RATE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::room::RoomType;

    fn room(rate: i64) -> Room {
        Room::new("pune", RoomType::Single, Money(rate), 1)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_long_stay_off_season() {
        // 30 nights at 10,000 off-season: no discount, 18% GST.
        let result = calculate_price(&room(10_000), date(2026, 6, 1), date(2026, 7, 1), None);
        assert_eq!(result.nights, 30);
        assert_eq!(result.base_amount, Money(300_000));
        assert_eq!(result.discount_amount, Money(0));
        assert_eq!(result.tax_amount, Money(54_000));
        assert_eq!(result.total_amount, Money(354_000));
    }

    #[test]
    fn test_exam_season_uplift() {
        let result = calculate_price(&room(10_000), date(2026, 3, 1), date(2026, 3, 2), None);
        assert_eq!(result.base_amount, Money(11_000));
        assert_eq!(result.breakdown.seasonal_multiplier, dec!(1.10));
    }

    #[test]
    fn test_seasonal_multiplier_months() {
        for month in 1..=12u32 {
            let result =
                calculate_price(&room(10_000), date(2026, month, 1), date(2026, month, 2), None);
            let expected = if [3, 4, 10, 11].contains(&month) {
                dec!(1.10)
            } else {
                Decimal::ONE
            };
            assert_eq!(result.breakdown.seasonal_multiplier, expected, "month {month}");
        }
    }

    #[test]
    fn test_promo_code_discount() {
        let result = calculate_price(
            &room(10_000),
            date(2026, 6, 1),
            date(2026, 6, 2),
            Some("VIRAMAH10"),
        );
        assert_eq!(result.base_amount, Money(10_000));
        assert_eq!(result.discount_amount, Money(1_000));
        assert_eq!(result.tax_amount, Money(1_620));
        assert_eq!(result.total_amount, Money(10_620));
    }

    #[test]
    fn test_promo_code_case_insensitive() {
        let lower = calculate_price(
            &room(10_000),
            date(2026, 6, 1),
            date(2026, 6, 2),
            Some("viramah10"),
        );
        assert_eq!(lower.discount_amount, Money(1_000));
    }

    #[test]
    fn test_unknown_promo_code_is_zero() {
        let result = calculate_price(
            &room(10_000),
            date(2026, 6, 1),
            date(2026, 6, 2),
            Some("NOSUCHCODE"),
        );
        assert_eq!(result.discount_amount, Money(0));
        assert_eq!(result.breakdown.promo_discount, Decimal::ZERO);
    }

    #[test]
    fn test_long_term_discount_tiers() {
        // 365 nights hits the 10% tier.
        let year = calculate_price(&room(10_000), date(2026, 1, 1), date(2027, 1, 1), None);
        assert_eq!(year.nights, 365);
        assert_eq!(year.breakdown.long_term_discount, dec!(0.10));

        // 180 nights hits the 5% tier.
        let half = calculate_price(&room(10_000), date(2026, 1, 1), date(2026, 6, 30), None);
        assert_eq!(half.nights, 180);
        assert_eq!(half.breakdown.long_term_discount, dec!(0.05));

        // 179 nights gets nothing.
        let short = calculate_price(&room(10_000), date(2026, 1, 1), date(2026, 6, 29), None);
        assert_eq!(short.nights, 179);
        assert_eq!(short.breakdown.long_term_discount, Decimal::ZERO);
    }

    #[test]
    fn test_same_day_checkout_bills_one_night() {
        let result = calculate_price(&room(10_000), date(2026, 6, 1), date(2026, 6, 1), None);
        assert_eq!(result.nights, 1);
        assert_eq!(result.base_amount, Money(10_000));
    }

    #[test]
    fn test_total_invariant_holds() {
        let result = calculate_price(
            &room(9_999),
            date(2026, 3, 1),
            date(2027, 3, 1),
            Some("STUDENT15"),
        );
        assert_eq!(
            result.total_amount,
            result.base_amount - result.discount_amount + result.tax_amount
        );
    }
}
