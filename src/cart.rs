//! Cart
//!
//! The single cart aggregate for one client: an ordered sequence of lines
//! keyed by merchandise id, with derived totals. The serialized field names
//! and nesting are preserved verbatim from the storefront's persisted
//! layout, so existing carts keep loading.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    merchandise::{Merchandise, ProductSummary, Variant},
    money::{DEFAULT_CURRENCY, Money, round2},
};

/// Fixed sentinel id for the single local cart.
pub const LOCAL_CART_ID: &str = "local-cart";

/// Placeholder checkout URL; checkout is not part of this crate.
pub const CHECKOUT_URL_PLACEHOLDER: &str = "#";

/// Cost of a single cart line. Only the running total is stored; the unit
/// price is reconstructed from it when a quantity changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCost {
    pub total_amount: Money,
}

/// One merchandise entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Opaque unique id, assigned at line creation and never reused.
    pub id: String,
    /// Always `>= 1` for a stored line; quantity 0 deletes the line.
    pub quantity: u32,
    pub cost: LineCost,
    pub merchandise: Merchandise,
}

impl CartLine {
    /// Creates a new line for a variant, with a fresh id and a running
    /// total of `variant.price × quantity`.
    #[must_use]
    pub fn new(
        merchandise_id: &str,
        quantity: u32,
        product: ProductSummary,
        variant: Variant,
    ) -> Self {
        CartLine {
            id: Uuid::new_v4().to_string(),
            quantity,
            cost: LineCost {
                total_amount: variant.price.times(quantity),
            },
            merchandise: Merchandise {
                id: merchandise_id.to_string(),
                title: variant.title,
                selected_options: variant.selected_options,
                product,
            },
        }
    }
}

/// Derived cart-level totals. Never independently settable: recomputed
/// after every structural change to the lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCost {
    pub subtotal_amount: Money,
    pub total_amount: Money,
    pub total_tax_amount: Money,
}

/// The cart aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub checkout_url: String,
    pub cost: CartCost,
    /// Insertion order is first-add order; quantity updates keep position.
    pub lines: Vec<CartLine>,
    pub total_quantity: u32,
}

impl Cart {
    /// The canonical empty cart: no lines, zero totals in USD.
    #[must_use]
    pub fn empty() -> Self {
        Cart {
            id: LOCAL_CART_ID.to_string(),
            checkout_url: CHECKOUT_URL_PLACEHOLDER.to_string(),
            cost: CartCost {
                subtotal_amount: Money::zero(DEFAULT_CURRENCY),
                total_amount: Money::zero(DEFAULT_CURRENCY),
                total_tax_amount: Money::zero(DEFAULT_CURRENCY),
            },
            lines: Vec::new(),
            total_quantity: 0,
        }
    }

    /// Returns the line for the given merchandise id, if present.
    #[must_use]
    pub fn line(&self, merchandise_id: &str) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.merchandise.id == merchandise_id)
    }

    pub(crate) fn line_mut(&mut self, merchandise_id: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.merchandise.id == merchandise_id)
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Recomputes the derived totals from the lines.
    ///
    /// Invariants enforced: subtotal equals the 2dp-rounded sum of line
    /// totals, the cart total equals the subtotal (no tax logic), tax is
    /// always `0.00`, the currency is the first line's currency or USD when
    /// empty, and `total_quantity` is the sum of line quantities.
    pub(crate) fn recompute_totals(&mut self) {
        let subtotal = round2(
            self.lines
                .iter()
                .map(|line| line.cost.total_amount.amount())
                .sum(),
        );

        let currency = self
            .lines
            .first()
            .map_or(DEFAULT_CURRENCY, |line| {
                line.cost.total_amount.currency_code()
            })
            .to_string();

        self.cost = CartCost {
            subtotal_amount: Money::new(subtotal, currency.clone()),
            total_amount: Money::new(subtotal, currency.clone()),
            total_tax_amount: Money::new(Decimal::ZERO, currency),
        };

        self.total_quantity = self.lines.iter().map(|line| line.quantity).sum();
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::merchandise::SelectedOption;

    use super::*;

    fn variant(id: &str, amount: &str, currency: &str) -> Variant {
        Variant {
            id: id.to_string(),
            title: "Default".to_string(),
            selected_options: vec![SelectedOption::new("Size", "M")],
            price: Money::parse(amount, currency).expect("test amount should parse"),
        }
    }

    fn product(id: &str) -> ProductSummary {
        ProductSummary {
            id: id.to_string(),
            handle: format!("{id}-handle"),
            title: format!("{id} title"),
            featured_image: None,
        }
    }

    #[test]
    fn empty_cart_has_zero_totals() {
        let cart = Cart::empty();

        assert_eq!(cart.id, LOCAL_CART_ID);
        assert_eq!(cart.checkout_url, CHECKOUT_URL_PLACEHOLDER);
        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity, 0);
        assert_eq!(cart.cost.total_amount, Money::zero("USD"));
        assert_eq!(cart.cost.total_tax_amount, Money::zero("USD"));
    }

    #[test]
    fn new_line_extends_unit_price_over_quantity() {
        let line = CartLine::new("v1", 3, product("p1"), variant("v1", "2.50", "USD"));

        assert_eq!(line.quantity, 3);
        let expected = Money::parse("7.50", "USD").expect("test amount should parse");
        assert_eq!(line.cost.total_amount, expected);
        assert_eq!(line.merchandise.id, "v1");
        assert_eq!(line.merchandise.product.handle, "p1-handle");
    }

    #[test]
    fn lines_get_distinct_ids() {
        let line_1 = CartLine::new("v1", 1, product("p1"), variant("v1", "1.00", "USD"));
        let line_2 = CartLine::new("v1", 1, product("p1"), variant("v1", "1.00", "USD"));

        assert_ne!(line_1.id, line_2.id);
    }

    #[test]
    fn recompute_sums_lines_and_quantities() -> TestResult {
        let mut cart = Cart::empty();
        cart.lines.push(CartLine::new(
            "v1",
            2,
            product("p1"),
            variant("v1", "1.25", "USD"),
        ));
        cart.lines.push(CartLine::new(
            "v2",
            1,
            product("p2"),
            variant("v2", "3.00", "USD"),
        ));

        cart.recompute_totals();

        assert_eq!(cart.total_quantity, 3);
        assert_eq!(cart.cost.subtotal_amount, Money::parse("5.50", "USD")?);
        assert_eq!(cart.cost.total_amount, cart.cost.subtotal_amount);
        assert_eq!(cart.cost.total_tax_amount, Money::zero("USD"));

        Ok(())
    }

    #[test]
    fn recompute_takes_currency_from_first_line() {
        let mut cart = Cart::empty();
        cart.lines.push(CartLine::new(
            "v1",
            1,
            product("p1"),
            variant("v1", "2.00", "GBP"),
        ));

        cart.recompute_totals();

        assert_eq!(cart.cost.total_amount.currency_code(), "GBP");
        assert_eq!(cart.cost.total_tax_amount.currency_code(), "GBP");
    }

    #[test]
    fn recompute_on_empty_cart_falls_back_to_usd() {
        let mut cart = Cart::empty();

        cart.recompute_totals();

        assert_eq!(cart.cost.total_amount.currency_code(), "USD");
        assert_eq!(cart.total_quantity, 0);
    }

    #[test]
    fn persisted_layout_field_names() -> TestResult {
        let mut cart = Cart::empty();
        cart.lines.push(CartLine::new(
            "v1",
            1,
            product("p1"),
            variant("v1", "2.00", "USD"),
        ));
        cart.recompute_totals();

        let json = serde_json::to_value(&cart)?;

        assert_eq!(json["id"], "local-cart");
        assert_eq!(json["checkoutUrl"], "#");
        assert_eq!(json["cost"]["subtotalAmount"]["amount"], "2.00");
        assert_eq!(json["cost"]["totalTaxAmount"]["amount"], "0.00");
        assert_eq!(json["totalQuantity"], 1);
        assert_eq!(json["lines"][0]["cost"]["totalAmount"]["currencyCode"], "USD");
        assert_eq!(json["lines"][0]["merchandise"]["id"], "v1");

        Ok(())
    }
}
