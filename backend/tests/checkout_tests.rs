//! Cart merging, checkout pricing and pagination properties

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    merge_and_check, merge_cart_items, price_items, CartItem, Pagination, FLAT_SHIPPING_PRICE,
    FREE_SHIPPING_THRESHOLD, MAX_PAGE_SIZE,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Prices between 0.01 and 999.99
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Lines drawn from a small set of products so duplicates are common
fn line_strategy() -> impl Strategy<Value = CartItem> {
    ("p[0-4]", price_strategy(), 1i32..20).prop_map(|(product, price, qty)| CartItem {
        name: format!("Product {}", product),
        image: "/images/sample.jpg".to_string(),
        product,
        price,
        qty,
    })
}

fn cart_strategy() -> impl Strategy<Value = Vec<CartItem>> {
    prop::collection::vec(line_strategy(), 0..12)
}

fn discount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=100).prop_map(Decimal::from)
}

// ============================================================================
// Cart merge
// ============================================================================

proptest! {
    #[test]
    fn test_merge_leaves_one_line_per_product(items in cart_strategy()) {
        let merged = merge_cart_items(items.clone());

        let mut seen = std::collections::HashSet::new();
        for line in &merged {
            prop_assert!(seen.insert(line.product.clone()));
        }

        for line in &merged {
            let expected: i32 = items
                .iter()
                .filter(|i| i.product == line.product)
                .map(|i| i.qty)
                .sum();
            prop_assert_eq!(line.qty, expected);
        }
    }

    #[test]
    fn test_merge_is_idempotent(items in cart_strategy()) {
        let once = merge_cart_items(items);
        let twice = merge_cart_items(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_positive_quantities_always_pass_check(items in cart_strategy()) {
        prop_assert!(merge_and_check(items).is_ok());
    }
}

// ============================================================================
// Checkout pricing
// ============================================================================

proptest! {
    #[test]
    fn test_totals_add_up(items in cart_strategy(), discount in discount_strategy()) {
        let p = price_items(&items, discount).unwrap();

        prop_assert_eq!(
            p.total_price,
            p.items_price + p.shipping_price + p.tax_price - p.discount_amount
        );
        prop_assert!(p.total_price >= Decimal::ZERO);
        prop_assert!(p.discount_amount >= Decimal::ZERO);
        prop_assert!(p.tax_price.scale() <= 2);
    }

    #[test]
    fn test_shipping_depends_only_on_threshold(items in cart_strategy()) {
        let p = price_items(&items, Decimal::ZERO).unwrap();
        if p.items_price > FREE_SHIPPING_THRESHOLD {
            prop_assert_eq!(p.shipping_price, Decimal::ZERO);
        } else {
            prop_assert_eq!(p.shipping_price, FLAT_SHIPPING_PRICE);
        }
    }

    #[test]
    fn test_merging_keeps_unit_count(items in cart_strategy()) {
        let merged = merge_cart_items(items.clone());
        let units: i32 = items.iter().map(|i| i.qty).sum();
        let merged_units: i32 = merged.iter().map(|i| i.qty).sum();
        prop_assert_eq!(units, merged_units);
    }

    #[test]
    fn test_full_discount_is_free(items in cart_strategy()) {
        let p = price_items(&items, Decimal::ONE_HUNDRED).unwrap();
        prop_assert_eq!(p.total_price, Decimal::ZERO);
    }
}

// ============================================================================
// Pagination
// ============================================================================

proptest! {
    #[test]
    fn test_pagination_is_always_sane(page in any::<Option<i64>>(), size in any::<Option<i64>>()) {
        let page = page.map(|v| v.to_string());
        let size = size.map(|v| v.to_string());
        let p = Pagination::from_query(page.as_deref(), size.as_deref());

        prop_assert!(p.page >= 1);
        prop_assert!(p.page_size >= 1 && p.page_size <= MAX_PAGE_SIZE);
        prop_assert!(p.offset() >= 0);
    }

    #[test]
    fn test_pages_cover_every_row(count in 0i64..10_000, size in 1i64..=MAX_PAGE_SIZE) {
        let p = Pagination { page: 1, page_size: size };
        let pages = p.total_pages(count);
        prop_assert!(pages * size >= count);
        prop_assert!(pages == 0 || (pages - 1) * size < count);
    }
}
