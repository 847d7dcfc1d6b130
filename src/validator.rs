use crate::models::Transaction;

pub const TRANSACTION_PREFIX: &str = "T";
pub const PRODUCT_PREFIX: &str = "P";
pub const CUSTOMER_PREFIX: &str = "C";

/// Optional user-supplied filters. Amount bounds are inclusive and apply to
/// `quantity * unit_price`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub region: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl FilterCriteria {
    pub fn has_amount_bounds(&self) -> bool {
        self.min_amount.is_some() || self.max_amount.is_some()
    }

    fn accepts(&self, tx: &Transaction) -> bool {
        if let Some(region) = &self.region {
            if &tx.region != region {
                return false;
            }
        }
        let amount = tx.amount();
        if self.min_amount.is_some_and(|min| amount < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| amount > max) {
            return false;
        }
        true
    }
}

/// Counts reported after validation.
///
/// `filtered_by_region` and `filtered_by_amount` hold the number of records
/// left after filtering when that filter was supplied, and 0 otherwise. They
/// are not removal counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSummary {
    pub total_input: usize,
    pub invalid: usize,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub final_count: usize,
}

pub struct ValidationResult {
    pub valid: Vec<Transaction>,
    pub invalid: usize,
    pub summary: FilterSummary,
}

/// Structural check: required fields present, ID prefixes, positive numbers.
pub fn is_valid(tx: &Transaction) -> bool {
    let required = [&tx.transaction_id, &tx.product_id, &tx.customer_id, &tx.region];
    if required.iter().any(|f| f.is_empty()) {
        return false;
    }
    if !tx.transaction_id.starts_with(TRANSACTION_PREFIX)
        || !tx.product_id.starts_with(PRODUCT_PREFIX)
        || !tx.customer_id.starts_with(CUSTOMER_PREFIX)
    {
        return false;
    }
    // NaN fails the comparison, so it is rejected here as well.
    tx.quantity > 0 && tx.unit_price > 0.0 && tx.amount().is_finite()
}

pub fn validate_and_filter(candidates: &[Transaction], criteria: &FilterCriteria) -> ValidationResult {
    let mut valid = Vec::new();
    let mut invalid = 0usize;

    for tx in candidates {
        if !is_valid(tx) {
            invalid += 1;
            continue;
        }
        if !criteria.accepts(tx) {
            continue;
        }
        valid.push(tx.clone());
    }

    let final_count = valid.len();
    let summary = FilterSummary {
        total_input: candidates.len(),
        invalid,
        filtered_by_region: if criteria.region.is_some() { final_count } else { 0 },
        filtered_by_amount: if criteria.has_amount_bounds() { final_count } else { 0 },
        final_count,
    };
    log::info!(
        "Validated {} candidates: {} valid, {} invalid",
        summary.total_input,
        summary.final_count,
        summary.invalid
    );

    ValidationResult {
        valid,
        invalid,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::parse_line;

    fn tx(line: &str) -> Transaction {
        parse_line(line).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("T001|2024-12-01|P101|Laptop|1|500.00|C001|North"),
            tx("T002|2024-12-01|P102|Mouse|10|20.00|C002|South"),
            tx("T003|2024-12-02|P103|Monitor|2|150.00|C001|North"),
            tx("X004|2024-12-02|P103|Monitor|2|150.00|C001|North"),
        ]
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let candidates = vec![
            tx("T001|2024-01-01|P001|Widget|5|10.00|C001|North"),
            tx("T002|2024-01-01|P002|Gadget|0|5.00|C002|South"),
        ];
        let result = validate_and_filter(&candidates, &FilterCriteria::default());
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.invalid, 1);
        assert_eq!(result.summary.total_input, 2);
        assert_eq!(result.summary.final_count, 1);
    }

    #[test]
    fn test_rejects_overflowing_amount() {
        let candidates = vec![
            tx("T001|2024-12-01|P101|Laptop|10|1e308|C001|North"),
            tx("T002|2024-12-01|P102|Mouse|1|inf|C002|North"),
            tx("T003|2024-12-01|P103|Cable|1|10.00|C003|South"),
        ];
        let result = validate_and_filter(&candidates, &FilterCriteria::default());
        assert_eq!(result.invalid, 2);
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.valid[0].transaction_id, "T003");

        let regions = crate::analytics::region_wise_sales(&result.valid);
        let share: f64 = regions.iter().map(|r| r.percentage).sum();
        assert!(regions.iter().all(|r| r.total_sales.is_finite()));
        assert_eq!(share, 100.0);
    }

    #[test]
    fn test_rejects_bad_prefixes_and_missing_fields() {
        let candidates = vec![
            tx("X001|2024-01-01|P001|Widget|1|1.00|C001|North"),
            tx("T002|2024-01-01|Q001|Widget|1|1.00|C001|North"),
            tx("T003|2024-01-01|P001|Widget|1|1.00|D001|North"),
            tx("T004|2024-01-01|P001|Widget|1|1.00|C001|"),
            tx("|2024-01-01|P001|Widget|1|1.00|C001|North"),
            tx("T006|2024-01-01|P001|Widget|1|-3.00|C001|North"),
            tx("T007||P001||1|1.00|C001|North"),
        ];
        let result = validate_and_filter(&candidates, &FilterCriteria::default());
        assert_eq!(result.invalid, 6);
        assert_eq!(result.valid.len(), 1);
        assert_eq!(result.valid[0].transaction_id, "T007");
    }

    #[test]
    fn test_rejects_nan_price() {
        let mut t = tx("T001|2024-01-01|P001|Widget|1|1.00|C001|North");
        t.unit_price = f64::NAN;
        assert!(!is_valid(&t));
    }

    #[test]
    fn test_region_filter_is_not_counted_as_invalid() {
        let criteria = FilterCriteria {
            region: Some("North".to_string()),
            ..Default::default()
        };
        let result = validate_and_filter(&sample(), &criteria);
        assert_eq!(result.invalid, 1);
        assert_eq!(result.valid.len(), 2);
        assert!(result.valid.iter().all(|t| t.region == "North"));
        assert_eq!(result.summary.filtered_by_region, 2);
        assert_eq!(result.summary.filtered_by_amount, 0);
    }

    #[test]
    fn test_amount_bounds_are_inclusive() {
        let criteria = FilterCriteria {
            region: None,
            min_amount: Some(200.0),
            max_amount: Some(300.0),
        };
        let result = validate_and_filter(&sample(), &criteria);
        let ids: Vec<&str> = result.valid.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["T002", "T003"]);
        assert_eq!(result.summary.filtered_by_region, 0);
        assert_eq!(result.summary.filtered_by_amount, 2);
        assert_eq!(result.summary.final_count, 2);
    }

    #[test]
    fn test_no_filters_leaves_counters_zero() {
        let result = validate_and_filter(&sample(), &FilterCriteria::default());
        assert_eq!(result.summary.filtered_by_region, 0);
        assert_eq!(result.summary.filtered_by_amount, 0);
        assert_eq!(result.summary.final_count, 3);
        let ids: Vec<&str> = result.valid.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["T001", "T002", "T003"]);
    }
}
