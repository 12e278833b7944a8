//! Cart submission parsing and total reconciliation
//!
//! Clients send amounts they computed themselves. Unit prices must equal
//! the live menu price; derived amounts may be off by at most [`TOLERANCE`].
//! What gets stored is always recomputed from the menu.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use shared::models::{
    AmountInput, CreateOrderRequest, MenuItem, OrderDraft, OrderItemDraft,
};

use super::OrderError;
use crate::utils::validation::MAX_NOTE_LEN;

/// Largest accepted quantity per line
pub const MAX_QUANTITY: i32 = 999;

/// Largest accepted single amount
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Allowed difference between submitted and recomputed amounts
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Turn the wire payload into typed drafts.
///
/// Only presence and syntax are checked here; ranges are left to
/// [`validate_drafts`].
pub fn parse_request(
    request: &CreateOrderRequest,
) -> Result<(OrderDraft, Vec<OrderItemDraft>), OrderError> {
    let order = &request.order;

    let table_number = order
        .table_number
        .ok_or_else(|| OrderError::missing("order.tableNumber"))?;
    let table_number = i32::try_from(table_number).map_err(|_| {
        OrderError::invalid("order.tableNumber", "order.tableNumber is out of range")
    })?;

    let draft = OrderDraft {
        table_number,
        subtotal: required_amount(order.subtotal.as_ref(), "order.subtotal")?,
        tax: required_amount(order.tax.as_ref(), "order.tax")?,
        total: required_amount(order.total.as_ref(), "order.total")?,
        notes: order
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
    };

    let items = request
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<OrderItemDraft, OrderError> {
            let field = |name: &str| format!("items[{i}].{name}");

            let menu_item_id = item
                .menu_item_id
                .ok_or_else(|| OrderError::missing(field("menuItemId")))?;
            let quantity = item
                .quantity
                .ok_or_else(|| OrderError::missing(field("quantity")))?;
            let quantity = i32::try_from(quantity).map_err(|_| {
                OrderError::invalid(field("quantity"), format!("{} is out of range", field("quantity")))
            })?;

            Ok(OrderItemDraft {
                menu_item_id,
                quantity,
                unit_price: required_amount(item.unit_price.as_ref(), &field("unitPrice"))?,
                total_price: required_amount(item.total_price.as_ref(), &field("totalPrice"))?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((draft, items))
}

fn required_amount(input: Option<&AmountInput>, field: &str) -> Result<Decimal, OrderError> {
    let input = input.ok_or_else(|| OrderError::missing(field))?;
    let text = input.as_text();
    Decimal::from_str(&text)
        .map_err(|_| OrderError::invalid(field, format!("{field} is not a decimal amount: {text:?}")))
}

/// Range checks on typed drafts
pub fn validate_drafts(draft: &OrderDraft, items: &[OrderItemDraft]) -> Result<(), OrderError> {
    if draft.table_number <= 0 {
        return Err(OrderError::invalid(
            "order.tableNumber",
            format!("order.tableNumber must be positive, got {}", draft.table_number),
        ));
    }
    check_amount(draft.subtotal, "order.subtotal")?;
    check_amount(draft.tax, "order.tax")?;
    check_amount(draft.total, "order.total")?;

    if let Some(notes) = &draft.notes
        && notes.chars().count() > MAX_NOTE_LEN
    {
        return Err(OrderError::invalid(
            "order.notes",
            format!("order.notes is too long (max {MAX_NOTE_LEN} chars)"),
        ));
    }

    if items.is_empty() {
        return Err(OrderError::Empty);
    }

    for (i, item) in items.iter().enumerate() {
        if item.menu_item_id <= 0 {
            return Err(OrderError::invalid(
                format!("items[{i}].menuItemId"),
                format!("items[{i}].menuItemId must be positive"),
            ));
        }
        if !(1..=MAX_QUANTITY).contains(&item.quantity) {
            return Err(OrderError::invalid(
                format!("items[{i}].quantity"),
                format!(
                    "items[{i}].quantity must be between 1 and {MAX_QUANTITY}, got {}",
                    item.quantity
                ),
            ));
        }
        check_amount(item.unit_price, &format!("items[{i}].unitPrice"))?;
        check_amount(item.total_price, &format!("items[{i}].totalPrice"))?;
    }

    Ok(())
}

fn check_amount(amount: Decimal, field: &str) -> Result<(), OrderError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(OrderError::invalid(field, format!("{field} must not be negative")));
    }
    if amount.normalize().scale() > 2 {
        return Err(OrderError::invalid(
            field,
            format!("{field} has more than two decimal places"),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(OrderError::invalid(
            field,
            format!("{field} exceeds {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

/// Compare the submitted amounts against the current menu.
///
/// `menu` must hold every referenced item that exists; absent ids are
/// reported as unavailable. Unit prices must equal the menu price exactly;
/// line totals and the subtotal are compared against menu-derived values.
///
/// Returns the amounts to persist: menu prices, menu-derived line totals
/// and subtotal, and `total = subtotal + tax`.
pub fn reconcile_totals(
    draft: &OrderDraft,
    items: &[OrderItemDraft],
    menu: &HashMap<i64, MenuItem>,
) -> Result<(OrderDraft, Vec<OrderItemDraft>), OrderError> {
    let mut priced = Vec::with_capacity(items.len());
    let mut computed_subtotal = Decimal::ZERO;

    for (i, item) in items.iter().enumerate() {
        let field = format!("items[{i}].menuItemId");
        let menu_item = menu.get(&item.menu_item_id).ok_or(OrderError::MenuItemUnavailable {
            field: field.clone(),
            menu_item_id: item.menu_item_id,
            reason: "does not exist",
        })?;
        if !menu_item.is_active {
            return Err(OrderError::MenuItemUnavailable {
                field,
                menu_item_id: item.menu_item_id,
                reason: "is not available",
            });
        }

        if item.unit_price != menu_item.price {
            return Err(OrderError::mismatch(
                format!("items[{i}].unitPrice"),
                format!(
                    "items[{i}].unitPrice {} does not match the menu price {}",
                    item.unit_price, menu_item.price
                ),
            ));
        }

        let line_total = menu_item.price * Decimal::from(item.quantity);
        if !within_tolerance(item.total_price, line_total) {
            return Err(OrderError::mismatch(
                format!("items[{i}].totalPrice"),
                format!(
                    "items[{i}].totalPrice {} should be {line_total}",
                    item.total_price
                ),
            ));
        }

        computed_subtotal += line_total;
        priced.push(OrderItemDraft {
            menu_item_id: item.menu_item_id,
            quantity: item.quantity,
            unit_price: menu_item.price,
            total_price: line_total,
        });
    }

    if !within_tolerance(draft.subtotal, computed_subtotal) {
        return Err(OrderError::mismatch(
            "order.subtotal",
            format!(
                "order.subtotal {} should be {computed_subtotal}",
                draft.subtotal
            ),
        ));
    }

    let expected_total = computed_subtotal + draft.tax;
    if !within_tolerance(draft.total, expected_total) {
        return Err(OrderError::mismatch(
            "order.total",
            format!("order.total {} should be {expected_total}", draft.total),
        ));
    }

    let reconciled = OrderDraft {
        subtotal: computed_subtotal,
        total: expected_total,
        ..draft.clone()
    };
    Ok((reconciled, priced))
}

fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MenuCategory, OrderInput, OrderItemInput};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn menu() -> HashMap<i64, MenuItem> {
        let item = |id: i64, price: &str, is_active: bool| MenuItem {
            id,
            name: format!("item {id}"),
            description: None,
            price: dec(price),
            category: MenuCategory::Coffee,
            is_active,
            image: None,
            created_at: 0,
            updated_at: 0,
        };
        [item(1, "3.50", true), item(2, "2.25", true), item(3, "9.00", false)]
            .into_iter()
            .map(|m| (m.id, m))
            .collect()
    }

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            order: OrderInput {
                table_number: Some(5),
                subtotal: Some("9.25".into()),
                tax: Some(AmountInput::Number(serde_json::Number::from_f64(0.93).unwrap())),
                total: Some("10.18".into()),
                notes: Some("  extra hot  ".into()),
            },
            items: vec![
                OrderItemInput {
                    menu_item_id: Some(1),
                    quantity: Some(2),
                    unit_price: Some("3.50".into()),
                    total_price: Some("7.00".into()),
                },
                OrderItemInput {
                    menu_item_id: Some(2),
                    quantity: Some(1),
                    unit_price: Some("2.25".into()),
                    total_price: Some("2.25".into()),
                },
            ],
        }
    }

    #[test]
    fn test_parse_and_reconcile_happy_path() {
        let (draft, items) = parse_request(&request()).unwrap();
        assert_eq!(draft.tax, dec("0.93"));
        assert_eq!(draft.notes.as_deref(), Some("extra hot"));
        assert_eq!(items.len(), 2);

        validate_drafts(&draft, &items).unwrap();
        reconcile_totals(&draft, &items, &menu()).unwrap();
    }

    #[test]
    fn test_missing_fields_name_the_field() {
        let mut req = request();
        req.order.table_number = None;
        let err = parse_request(&req).unwrap_err();
        assert!(matches!(err, OrderError::Missing { ref field } if field == "order.tableNumber"));

        let mut req = request();
        req.items[1].unit_price = None;
        let err = parse_request(&req).unwrap_err();
        assert!(matches!(err, OrderError::Missing { ref field } if field == "items[1].unitPrice"));
    }

    #[test]
    fn test_non_decimal_amount() {
        let mut req = request();
        req.order.subtotal = Some("ten".into());
        assert!(matches!(
            parse_request(&req),
            Err(OrderError::Invalid { ref field, .. }) if field == "order.subtotal"
        ));
    }

    #[test]
    fn test_range_checks() {
        let (draft, items) = parse_request(&request()).unwrap();

        let mut bad = draft.clone();
        bad.table_number = 0;
        assert!(validate_drafts(&bad, &items).is_err());

        assert!(matches!(validate_drafts(&draft, &[]), Err(OrderError::Empty)));

        let mut lines = items.clone();
        lines[0].quantity = 0;
        assert!(validate_drafts(&draft, &lines).is_err());
        lines[0].quantity = MAX_QUANTITY + 1;
        assert!(validate_drafts(&draft, &lines).is_err());

        let mut bad = draft.clone();
        bad.tax = dec("-0.01");
        assert!(validate_drafts(&bad, &items).is_err());

        let mut bad = draft.clone();
        bad.tax = dec("0.935");
        assert!(validate_drafts(&bad, &items).is_err());

        // trailing zeros are not extra precision
        let mut ok = draft.clone();
        ok.tax = dec("0.930");
        assert!(validate_drafts(&ok, &items).is_ok());

        let mut bad = draft;
        bad.notes = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_drafts(&bad, &items).is_err());
    }

    #[test]
    fn test_price_mismatch_is_rejected() {
        let (draft, mut items) = parse_request(&request()).unwrap();
        items[0].unit_price = dec("3.00");
        let err = reconcile_totals(&draft, &items, &menu()).unwrap_err();
        assert!(matches!(err, OrderError::TotalsMismatch { ref field, .. } if field == "items[0].unitPrice"));
    }

    #[test]
    fn test_total_mismatch_is_rejected() {
        let (mut draft, items) = parse_request(&request()).unwrap();
        draft.total = dec("12.00");
        let err = reconcile_totals(&draft, &items, &menu()).unwrap_err();
        assert!(matches!(err, OrderError::TotalsMismatch { ref field, .. } if field == "order.total"));

        // one cent of slack, the stored total is recomputed
        draft.total = dec("10.19");
        let (reconciled, _) = reconcile_totals(&draft, &items, &menu()).unwrap();
        assert_eq!(reconciled.total, dec("10.18"));
    }

    #[test]
    fn test_unit_price_must_match_exactly() {
        let (draft, mut items) = parse_request(&request()).unwrap();
        items[0].unit_price = dec("3.49");
        let err = reconcile_totals(&draft, &items, &menu()).unwrap_err();
        assert!(matches!(err, OrderError::TotalsMismatch { ref field, .. } if field == "items[0].unitPrice"));
    }

    #[test]
    fn test_large_quantity_underpayment_is_rejected() {
        // 999 x 3.50 is 3496.50; pricing each unit a cent low drops 9.99
        let draft = OrderDraft {
            table_number: 1,
            subtotal: dec("3486.51"),
            tax: dec("0"),
            total: dec("3486.51"),
            notes: None,
        };
        let mut items = vec![OrderItemDraft {
            menu_item_id: 1,
            quantity: MAX_QUANTITY,
            unit_price: dec("3.49"),
            total_price: dec("3486.51"),
        }];
        assert!(matches!(
            reconcile_totals(&draft, &items, &menu()),
            Err(OrderError::TotalsMismatch { ref field, .. }) if field == "items[0].unitPrice"
        ));

        // the right unit price with a short line total is still caught
        items[0].unit_price = dec("3.50");
        assert!(matches!(
            reconcile_totals(&draft, &items, &menu()),
            Err(OrderError::TotalsMismatch { ref field, .. }) if field == "items[0].totalPrice"
        ));
    }

    #[test]
    fn test_reconciled_amounts_come_from_the_menu() {
        let (mut draft, mut items) = parse_request(&request()).unwrap();
        // within a cent on the line, subtotal and total
        items[0].total_price = dec("6.99");
        draft.subtotal = dec("9.24");
        draft.total = dec("10.17");

        let (reconciled, priced) = reconcile_totals(&draft, &items, &menu()).unwrap();
        assert_eq!(priced[0].unit_price, dec("3.50"));
        assert_eq!(priced[0].total_price, dec("7.00"));
        assert_eq!(reconciled.subtotal, dec("9.25"));
        assert_eq!(reconciled.total, dec("10.18"));
        assert_eq!(reconciled.tax, dec("0.93"));
    }

    #[test]
    fn test_unknown_or_inactive_menu_item() {
        let (draft, mut items) = parse_request(&request()).unwrap();
        items[1].menu_item_id = 3;
        assert!(matches!(
            reconcile_totals(&draft, &items, &menu()),
            Err(OrderError::MenuItemUnavailable { menu_item_id: 3, .. })
        ));

        items[1].menu_item_id = 99;
        assert!(matches!(
            reconcile_totals(&draft, &items, &menu()),
            Err(OrderError::MenuItemUnavailable { menu_item_id: 99, .. })
        ));
    }
}
