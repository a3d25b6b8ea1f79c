//! 账单计算
//!
//! 账单不落库，每次读取时由订单明细快照价计算:
//! `tax = round2(subtotal × TAX_RATE)`，`total = subtotal + tax − discount`。

use rust_decimal::Decimal;
use shared::models::{BillLine, OrderBill, OrderItem, SessionBill};

use super::money::{line_total, tax_for, to_decimal, to_f64, validate_amount};
use crate::utils::{AppError, AppResult, ErrorCode};

struct Totals {
    subtotal: Decimal,
    tax: Decimal,
    discount: Decimal,
    total: Decimal,
}

fn totals(subtotal: Decimal, tax_rate: f64, discount: f64) -> AppResult<Totals> {
    validate_amount(discount, "discount")?;
    let tax = tax_for(subtotal, tax_rate);
    let discount = to_decimal(discount);
    if discount > subtotal + tax {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "Discount exceeds the bill amount",
        )
        .with_detail("field", "discount"));
    }
    Ok(Totals {
        subtotal,
        tax,
        discount,
        total: subtotal + tax - discount,
    })
}

fn lines(items: &[OrderItem]) -> (Vec<BillLine>, Decimal) {
    let mut subtotal = Decimal::ZERO;
    let lines = items
        .iter()
        .map(|item| {
            let total = line_total(item.unit_price, item.quantity);
            subtotal += total;
            BillLine {
                item_id: item.id,
                name: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: to_f64(total),
            }
        })
        .collect();
    (lines, subtotal)
}

/// 单个订单的账单
pub fn order_bill(
    order_id: i64,
    items: &[OrderItem],
    tax_rate: f64,
    discount: f64,
) -> AppResult<OrderBill> {
    let (items, subtotal) = lines(items);
    let t = totals(subtotal, tax_rate, discount)?;
    Ok(OrderBill {
        order_id,
        items,
        subtotal: to_f64(t.subtotal),
        tax: to_f64(t.tax),
        discount: to_f64(t.discount),
        total: to_f64(t.total),
    })
}

/// 会话账单: 各订单单独列出 (不含折扣)，税在会话小计上统一计算
pub fn session_bill(
    session_id: i64,
    orders: &[(i64, Vec<OrderItem>)],
    tax_rate: f64,
    discount: f64,
) -> AppResult<SessionBill> {
    let mut bills = Vec::with_capacity(orders.len());
    let mut subtotal = Decimal::ZERO;
    for (order_id, items) in orders {
        let bill = order_bill(*order_id, items, tax_rate, 0.0)?;
        subtotal += to_decimal(bill.subtotal);
        bills.push(bill);
    }

    let t = totals(subtotal, tax_rate, discount)?;
    Ok(SessionBill {
        session_id,
        orders: bills,
        subtotal: to_f64(t.subtotal),
        tax: to_f64(t.tax),
        discount: to_f64(t.discount),
        total: to_f64(t.total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderItemStatus;

    fn item(id: i64, name: &str, unit_price: f64, quantity: i32) -> OrderItem {
        OrderItem {
            id,
            order_id: 1,
            menu_item_id: id,
            name: name.into(),
            unit_price,
            quantity,
            notes: None,
            status: OrderItemStatus::Served,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_order_bill() {
        let items = vec![item(1, "Pho", 12.5, 2), item(2, "Tea", 1.99, 3)];
        let bill = order_bill(1, &items, 0.10, 0.0).unwrap();

        assert_eq!(bill.items.len(), 2);
        assert_eq!(bill.items[0].line_total, 25.0);
        assert_eq!(bill.items[1].line_total, 5.97);
        assert_eq!(bill.subtotal, 30.97);
        assert_eq!(bill.tax, 3.1);
        assert_eq!(bill.total, 34.07);
    }

    #[test]
    fn test_discount_applied_and_bounded() {
        let items = vec![item(1, "Set menu", 50.0, 1)];
        let bill = order_bill(1, &items, 0.10, 5.0).unwrap();
        assert_eq!(bill.total, 50.0);

        let err = order_bill(1, &items, 0.10, 60.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert!(order_bill(1, &items, 0.10, -1.0).is_err());
    }

    #[test]
    fn test_empty_order_bill() {
        let bill = order_bill(3, &[], 0.10, 0.0).unwrap();
        assert_eq!(bill.subtotal, 0.0);
        assert_eq!(bill.total, 0.0);
    }

    #[test]
    fn test_session_bill_sums_orders() {
        let orders = vec![
            (1, vec![item(1, "Pho", 10.0, 1)]),
            (2, vec![item(2, "Rice", 5.55, 1), item(3, "Tea", 2.0, 2)]),
        ];
        let bill = session_bill(9, &orders, 0.10, 1.0).unwrap();

        assert_eq!(bill.orders.len(), 2);
        assert_eq!(bill.orders[1].subtotal, 9.55);
        assert_eq!(bill.subtotal, 19.55);
        // 1.955 → 1.96
        assert_eq!(bill.tax, 1.96);
        assert_eq!(bill.total, 20.51);
    }
}
