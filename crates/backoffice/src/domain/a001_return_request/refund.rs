use contracts::domain::a001_return_request::aggregate::ReturnLineItem;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefundError {
    #[error("refund percentage {0} is outside 0..=100")]
    InvalidPercentage(i32),
}

/// Считает сумму возврата по строкам заявки:
/// `Σ(price * returnQuantity) * percentage / 100`,
/// округление до центов half-up.
///
/// Строки с отрицательной ценой или неположительным количеством -
/// испорченные данные; они дают 0 в сумму и попадают в лог,
/// чтобы предпросмотр не падал на битой заявке.
pub fn calculate_refund(items: &[ReturnLineItem], percentage: i32) -> Result<Decimal, RefundError> {
    if !(0..=100).contains(&percentage) {
        return Err(RefundError::InvalidPercentage(percentage));
    }

    let mut total = Decimal::ZERO;
    for item in items {
        if item.price < Decimal::ZERO || item.return_quantity <= 0 {
            tracing::warn!(
                "return item '{}' has invalid price/quantity (price={}, returnQuantity={}), counted as 0",
                item.title,
                item.price,
                item.return_quantity
            );
            continue;
        }
        total += item.price * Decimal::from(item.return_quantity);
    }

    let refund = total * Decimal::from(percentage) / Decimal::from(100);
    Ok(refund.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: &str, return_quantity: i32) -> ReturnLineItem {
        ReturnLineItem {
            title: "item".to_string(),
            price: price.parse().unwrap(),
            selected_quantity: return_quantity.max(1),
            return_quantity,
            ..ReturnLineItem::default()
        }
    }

    #[test]
    fn half_refund_over_two_lines() {
        let items = vec![item("50", 2), item("20", 1)];
        let refund = calculate_refund(&items, 50).unwrap();
        assert_eq!(refund, "60.00".parse().unwrap());
    }

    #[test]
    fn empty_items_give_zero() {
        assert_eq!(calculate_refund(&[], 100).unwrap(), Decimal::ZERO);
        assert_eq!(calculate_refund(&[], 0).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn rounds_half_up_to_cents() {
        let items = vec![item("33.335", 1)];
        let refund = calculate_refund(&items, 100).unwrap();
        assert_eq!(refund, "33.34".parse().unwrap());
    }

    #[test]
    fn rejects_percentage_out_of_range() {
        let items = vec![item("10", 1)];
        assert_eq!(
            calculate_refund(&items, 101),
            Err(RefundError::InvalidPercentage(101))
        );
        assert_eq!(
            calculate_refund(&items, -1),
            Err(RefundError::InvalidPercentage(-1))
        );
    }

    #[test]
    fn corrupt_lines_count_as_zero() {
        let items = vec![item("-5", 1), item("10", 0), item("25", 2)];
        let refund = calculate_refund(&items, 100).unwrap();
        assert_eq!(refund, "50.00".parse().unwrap());
    }

    #[test]
    fn full_and_zero_percentages() {
        let items = vec![item("99.99", 1)];
        assert_eq!(
            calculate_refund(&items, 100).unwrap(),
            "99.99".parse::<Decimal>().unwrap()
        );
        assert_eq!(calculate_refund(&items, 0).unwrap(), Decimal::ZERO);
    }
}
