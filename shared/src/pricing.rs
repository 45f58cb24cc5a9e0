//! Checkout price arithmetic shared by the server and the browser

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::CartItem;

/// Orders strictly above this subtotal ship free
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Flat shipping fee below the threshold
pub const FLAT_SHIPPING_PRICE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Sales tax rate (15%)
pub const TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Largest order total an order row can hold (`NUMERIC(12, 2)`)
pub const MAX_ORDER_TOTAL: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Pricing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Order total is too large")]
    TotalTooLarge,
}

/// Price breakdown for a set of line items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute the checkout totals.
///
/// `discount_percent` applies to items + shipping + tax and is clamped to 0..=100.
/// Totals above [`MAX_ORDER_TOTAL`] are rejected, as is any arithmetic overflow.
pub fn price_items(
    items: &[CartItem],
    discount_percent: Decimal,
) -> Result<PriceBreakdown, PricingError> {
    let items_price = items
        .iter()
        .try_fold(Decimal::ZERO, |sum, i| {
            i.price
                .checked_mul(Decimal::from(i.qty))
                .and_then(|line| sum.checked_add(line))
        })
        .ok_or(PricingError::TotalTooLarge)?;

    let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_PRICE
    };

    let tax_price = TAX_RATE
        .checked_mul(items_price)
        .map(round2)
        .ok_or(PricingError::TotalTooLarge)?;
    let before_discount = items_price
        .checked_add(shipping_price)
        .and_then(|v| v.checked_add(tax_price))
        .ok_or(PricingError::TotalTooLarge)?;

    if before_discount > MAX_ORDER_TOTAL {
        return Err(PricingError::TotalTooLarge);
    }

    let pct = discount_percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let discount_amount = round2(before_discount * pct / Decimal::ONE_HUNDRED);

    Ok(PriceBreakdown {
        items_price,
        shipping_price,
        tax_price,
        discount_amount,
        total_price: before_discount - discount_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(price: &str, qty: i32) -> CartItem {
        CartItem {
            product: format!("p-{}-{}", price, qty),
            name: "Item".to_string(),
            image: "/i.jpg".to_string(),
            price: dec(price),
            qty,
        }
    }

    #[test]
    fn test_small_order_pays_shipping() {
        let p = price_items(&[line("29.99", 2)], Decimal::ZERO).unwrap();
        assert_eq!(p.items_price, dec("59.98"));
        assert_eq!(p.shipping_price, dec("10"));
        assert_eq!(p.tax_price, dec("9.00"));
        assert_eq!(p.discount_amount, Decimal::ZERO);
        assert_eq!(p.total_price, dec("78.98"));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let at = price_items(&[line("100", 1)], Decimal::ZERO).unwrap();
        assert_eq!(at.shipping_price, dec("10"));
        let above = price_items(&[line("100.01", 1)], Decimal::ZERO).unwrap();
        assert_eq!(above.shipping_price, Decimal::ZERO);
    }

    #[test]
    fn test_discount_applies_to_grand_total() {
        let p = price_items(&[line("200", 1)], dec("10")).unwrap();
        // 200 + 0 shipping + 30 tax = 230, 10% off = 23
        assert_eq!(p.tax_price, dec("30.00"));
        assert_eq!(p.discount_amount, dec("23.00"));
        assert_eq!(p.total_price, dec("207.00"));
    }

    #[test]
    fn test_discount_is_clamped() {
        let p = price_items(&[line("50", 1)], dec("150")).unwrap();
        assert_eq!(p.total_price, Decimal::ZERO);
        let p = price_items(&[line("50", 1)], dec("-5")).unwrap();
        assert_eq!(p.discount_amount, Decimal::ZERO);
    }

    #[test]
    fn test_empty_items() {
        let p = price_items(&[], Decimal::ZERO).unwrap();
        assert_eq!(p.items_price, Decimal::ZERO);
        assert_eq!(p.total_price, dec("10"));
    }

    #[test]
    fn test_overflowing_line_is_an_error() {
        let mut huge = line("1", 2);
        huge.price = Decimal::MAX;
        assert_eq!(
            price_items(&[huge], Decimal::ZERO),
            Err(PricingError::TotalTooLarge)
        );

        let mut max = line("1", 1);
        max.price = Decimal::MAX;
        assert_eq!(
            price_items(&[max.clone(), max], Decimal::ZERO),
            Err(PricingError::TotalTooLarge)
        );
    }

    #[test]
    fn test_total_must_fit_an_order_row() {
        // 1e9 * 8 = 8e9 items, plus 15% tax = 9.2e9: fits
        assert!(price_items(&[line("1000000000", 8)], Decimal::ZERO).is_ok());
        // 1e9 * 9 = 9e9 items, plus 15% tax = 1.035e10: too large
        assert_eq!(
            price_items(&[line("1000000000", 9)], Decimal::ZERO),
            Err(PricingError::TotalTooLarge)
        );
        assert_eq!(MAX_ORDER_TOTAL, dec("9999999999.99"));
    }
}
