use rust_decimal::Decimal;

use crate::domain::job::JobId;
use crate::domain::line_item::ItemType;
use crate::errors::DomainError;
use crate::money::round_money;
use crate::pricing::matrix::MatrixResolver;

/// Caller-submitted fields for a new line item, before type-specific
/// validation and pricing. `price` carries the explicit override for labor
/// and parts, the required unit price for fees, and the amount for
/// discounts.
#[derive(Clone, Debug, Default)]
pub struct LineItemRequest {
    pub description: String,
    pub job_id: Option<JobId>,
    pub qty: Option<Decimal>,
    pub taxable: bool,
    pub hours: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
}

/// A fully priced line item ready for persistence. Ids and timestamps are
/// assigned by the persistence layer; pricing itself never triggers a totals
/// recompute.
#[derive(Clone, Debug, PartialEq)]
pub struct PricedLineItem {
    pub item_type: ItemType,
    pub description: String,
    pub job_id: Option<JobId>,
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub taxable: bool,
    pub labor_hours: Option<Decimal>,
    pub cost: Option<Decimal>,
}

/// Validate and price one line item according to its type. Fails fast on a
/// missing required field; the caller's state is untouched on error.
pub fn price_line_item(
    item_type: ItemType,
    request: LineItemRequest,
    matrix: &MatrixResolver,
) -> Result<PricedLineItem, DomainError> {
    let qty = request.qty.unwrap_or(Decimal::ONE);

    match item_type {
        ItemType::Labor => {
            let hours = request.hours.ok_or(DomainError::ValidationFailed {
                item_type: "labor".to_string(),
                field: "hours",
            })?;
            let unit_price = match request.price {
                Some(price) => price,
                None => matrix.labor_rate(hours),
            };

            Ok(PricedLineItem {
                item_type,
                description: request.description,
                job_id: request.job_id,
                // Labor quantity is redefined as hours billed.
                qty: hours,
                unit_price,
                taxable: false,
                labor_hours: Some(hours),
                cost: None,
            })
        }
        ItemType::Part => {
            let cost = request.cost.ok_or(DomainError::ValidationFailed {
                item_type: "part".to_string(),
                field: "cost",
            })?;
            let unit_price = match request.price {
                Some(price) => price,
                None => round_money(cost * matrix.parts_multiplier(cost)),
            };

            Ok(PricedLineItem {
                item_type,
                description: request.description,
                job_id: request.job_id,
                qty,
                unit_price,
                taxable: true,
                labor_hours: None,
                cost: Some(cost),
            })
        }
        ItemType::Fee => {
            let unit_price = request.price.ok_or(DomainError::ValidationFailed {
                item_type: "fee".to_string(),
                field: "price",
            })?;

            Ok(PricedLineItem {
                item_type,
                description: request.description,
                job_id: request.job_id,
                qty,
                unit_price,
                taxable: request.taxable,
                labor_hours: None,
                cost: request.cost,
            })
        }
        ItemType::Discount => {
            let amount = request.price.ok_or(DomainError::ValidationFailed {
                item_type: "discount".to_string(),
                field: "amount",
            })?;

            Ok(PricedLineItem {
                item_type,
                description: request.description,
                job_id: request.job_id,
                qty,
                // Discounts are stored sign-normalized, always non-positive.
                unit_price: -amount.abs(),
                taxable: false,
                labor_hours: None,
                cost: request.cost,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::config::PricingConfig;
    use crate::domain::line_item::ItemType;
    use crate::domain::matrix::{LaborMatrixTier, PartsMatrixTier, TierId};
    use crate::errors::DomainError;
    use crate::pricing::matrix::MatrixResolver;

    use super::{price_line_item, LineItemRequest};

    fn dec(value: &str) -> Decimal {
        value.parse().expect("decimal literal")
    }

    fn matrix() -> MatrixResolver {
        MatrixResolver::new(
            vec![
                LaborMatrixTier {
                    id: TierId("lt-1".to_string()),
                    min_hours: dec("0"),
                    max_hours: Some(dec("2")),
                    rate_per_hour: dec("100.00"),
                },
                LaborMatrixTier {
                    id: TierId("lt-2".to_string()),
                    min_hours: dec("2"),
                    max_hours: None,
                    rate_per_hour: dec("85.00"),
                },
            ],
            vec![
                PartsMatrixTier {
                    id: TierId("pt-1".to_string()),
                    min_cost: dec("0"),
                    max_cost: Some(dec("100")),
                    multiplier: dec("1.5"),
                },
                PartsMatrixTier {
                    id: TierId("pt-2".to_string()),
                    min_cost: dec("100"),
                    max_cost: None,
                    multiplier: dec("1.3"),
                },
            ],
            &PricingConfig::default(),
        )
    }

    #[test]
    fn labor_prices_from_the_matrix_and_mirrors_hours_into_qty() {
        let item = price_line_item(
            ItemType::Labor,
            LineItemRequest { hours: Some(dec("3")), taxable: true, ..LineItemRequest::default() },
            &matrix(),
        )
        .expect("labor item");

        assert_eq!(item.qty, dec("3"));
        assert_eq!(item.unit_price, dec("85.00"));
        assert_eq!(item.labor_hours, Some(dec("3")));
        // Labor is never taxable, whatever the caller sent.
        assert!(!item.taxable);
    }

    #[test]
    fn labor_rate_override_beats_the_matrix() {
        let item = price_line_item(
            ItemType::Labor,
            LineItemRequest {
                hours: Some(dec("1")),
                price: Some(dec("150.00")),
                ..LineItemRequest::default()
            },
            &matrix(),
        )
        .expect("labor item");

        assert_eq!(item.unit_price, dec("150.00"));
    }

    #[test]
    fn labor_without_hours_is_rejected() {
        let error =
            price_line_item(ItemType::Labor, LineItemRequest::default(), &matrix()).unwrap_err();
        assert!(matches!(error, DomainError::ValidationFailed { field: "hours", .. }));
    }

    #[test]
    fn part_marks_up_cost_through_the_matrix() {
        let item = price_line_item(
            ItemType::Part,
            LineItemRequest { cost: Some(dec("50.00")), ..LineItemRequest::default() },
            &matrix(),
        )
        .expect("part item");

        assert_eq!(item.unit_price, dec("75.00"));
        assert_eq!(item.cost, Some(dec("50.00")));
        // Parts are always taxable.
        assert!(item.taxable);
    }

    #[test]
    fn part_without_cost_is_rejected() {
        let error =
            price_line_item(ItemType::Part, LineItemRequest::default(), &matrix()).unwrap_err();
        assert!(matches!(error, DomainError::ValidationFailed { field: "cost", .. }));
    }

    #[test]
    fn fee_requires_an_explicit_price_and_keeps_caller_taxability() {
        let item = price_line_item(
            ItemType::Fee,
            LineItemRequest {
                price: Some(dec("12.50")),
                taxable: true,
                ..LineItemRequest::default()
            },
            &matrix(),
        )
        .expect("fee item");

        assert_eq!(item.unit_price, dec("12.50"));
        assert!(item.taxable);

        let error =
            price_line_item(ItemType::Fee, LineItemRequest::default(), &matrix()).unwrap_err();
        assert!(matches!(error, DomainError::ValidationFailed { field: "price", .. }));
    }

    #[test]
    fn discount_amount_is_sign_normalized() {
        for raw in ["25.00", "-25.00"] {
            let item = price_line_item(
                ItemType::Discount,
                LineItemRequest { price: Some(dec(raw)), ..LineItemRequest::default() },
                &matrix(),
            )
            .expect("discount item");

            assert_eq!(item.unit_price, dec("-25.00"));
            assert!(!item.taxable);
        }
    }

    #[test]
    fn quantity_defaults_to_one() {
        let item = price_line_item(
            ItemType::Fee,
            LineItemRequest { price: Some(dec("10.00")), ..LineItemRequest::default() },
            &matrix(),
        )
        .expect("fee item");

        assert_eq!(item.qty, Decimal::ONE);
    }
}
