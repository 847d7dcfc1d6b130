use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::fmt::round2;
use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RegionStats {
    pub region: String,
    pub total_sales: f64,
    pub transaction_count: usize,
    /// Share of grand total, rounded to 2 decimals.
    pub percentage: f64,
}

impl RegionStats {
    pub fn average_transaction_value(&self) -> f64 {
        if self.transaction_count > 0 {
            self.total_sales / self.transaction_count as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyStats {
    pub date: String,
    pub revenue: f64,
    pub transaction_count: usize,
    pub unique_customers: usize,
}

/// Best revenue day. `date` is `None` when there were no records.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakDay {
    pub date: Option<String>,
    pub revenue: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductStats {
    pub name: String,
    pub quantity: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerStats {
    pub customer_id: String,
    pub total_spent: f64,
    pub purchase_count: usize,
    pub avg_order_value: f64,
    pub products_bought: Vec<String>,
}

/// What the user can filter on, computed from the parsed candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub min_amount: f64,
    pub max_amount: f64,
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Group records by key, keeping groups in first-seen order.
fn group_by<T, K, F>(records: &[Transaction], key: K, mut fold: F) -> Vec<(String, T)>
where
    T: Default,
    K: Fn(&Transaction) -> &str,
    F: FnMut(&mut T, &Transaction),
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, T)> = Vec::new();
    for tx in records {
        let k = key(tx);
        let i = match index.get(k) {
            Some(&i) => i,
            None => {
                index.insert(k.to_string(), groups.len());
                groups.push((k.to_string(), T::default()));
                groups.len() - 1
            }
        };
        fold(&mut groups[i].1, tx);
    }
    groups
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Sum of `quantity * unit_price`. Non-finite amounts are skipped.
pub fn calculate_total_revenue(records: &[Transaction]) -> f64 {
    records
        .iter()
        .map(Transaction::amount)
        .filter(|a| a.is_finite())
        .sum()
}

/// Per-region totals sorted by sales descending. Equal totals keep
/// first-seen order.
pub fn region_wise_sales(records: &[Transaction]) -> Vec<RegionStats> {
    let grand_total = calculate_total_revenue(records);
    let groups = group_by(
        records,
        |tx| tx.region.as_str(),
        |acc: &mut (f64, usize), tx| {
            acc.0 += tx.amount();
            acc.1 += 1;
        },
    );

    let mut regions: Vec<RegionStats> = groups
        .into_iter()
        .map(|(region, (total_sales, transaction_count))| {
            let percentage = if grand_total > 0.0 {
                round2(total_sales / grand_total * 100.0)
            } else {
                0.0
            };
            RegionStats {
                region,
                total_sales,
                transaction_count,
                percentage,
            }
        })
        .collect();
    regions.sort_by(|a, b| b.total_sales.total_cmp(&a.total_sales));
    regions
}

/// Per-date revenue, ordered by date key ascending.
pub fn daily_sales_trend(records: &[Transaction]) -> Vec<DailyStats> {
    let mut days: BTreeMap<&str, (f64, usize, BTreeSet<&str>)> = BTreeMap::new();
    for tx in records {
        let day = days.entry(tx.date.as_str()).or_default();
        day.0 += tx.amount();
        day.1 += 1;
        day.2.insert(tx.customer_id.as_str());
    }
    days.into_iter()
        .map(|(date, (revenue, transaction_count, customers))| DailyStats {
            date: date.to_string(),
            revenue,
            transaction_count,
            unique_customers: customers.len(),
        })
        .collect()
}

/// Highest-revenue day. On ties the earliest date wins.
pub fn find_peak_sales_day(records: &[Transaction]) -> PeakDay {
    peak_of_trend(&daily_sales_trend(records))
}

fn peak_of_trend(trend: &[DailyStats]) -> PeakDay {
    let best = trend.iter().fold(None::<&DailyStats>, |best, day| match best {
        Some(b) if b.revenue >= day.revenue => Some(b),
        _ => Some(day),
    });
    match best {
        Some(day) => PeakDay {
            date: Some(day.date.clone()),
            revenue: day.revenue,
            transaction_count: day.transaction_count,
        },
        None => PeakDay {
            date: None,
            revenue: 0.0,
            transaction_count: 0,
        },
    }
}

/// Per-product quantity and revenue in first-seen order.
pub fn product_stats(records: &[Transaction]) -> Vec<ProductStats> {
    group_by(
        records,
        |tx| tx.product_name.as_str(),
        |acc: &mut (i64, f64), tx| {
            acc.0 += tx.quantity;
            acc.1 += tx.amount();
        },
    )
    .into_iter()
    .map(|(name, (quantity, revenue))| ProductStats {
        name,
        quantity,
        revenue,
    })
    .collect()
}

/// First `n` products by quantity sold, descending. Equal quantities keep
/// first-seen order.
pub fn top_selling_products(records: &[Transaction], n: usize) -> Vec<ProductStats> {
    let mut products = product_stats(records);
    products.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    products.truncate(n);
    products
}

/// Products whose total quantity is below `threshold`, ascending by quantity.
pub fn low_performing_products(records: &[Transaction], threshold: i64) -> Vec<ProductStats> {
    let mut products: Vec<ProductStats> = product_stats(records)
        .into_iter()
        .filter(|p| p.quantity < threshold)
        .collect();
    products.sort_by_key(|p| p.quantity);
    products
}

/// Per-customer spend, sorted by total spent descending.
pub fn customer_analysis(records: &[Transaction]) -> Vec<CustomerStats> {
    let groups = group_by(
        records,
        |tx| tx.customer_id.as_str(),
        |acc: &mut (f64, usize, BTreeSet<String>), tx| {
            acc.0 += tx.amount();
            acc.1 += 1;
            acc.2.insert(tx.product_name.clone());
        },
    );

    let mut customers: Vec<CustomerStats> = groups
        .into_iter()
        .map(|(customer_id, (total_spent, purchase_count, products))| {
            let avg = if purchase_count > 0 {
                total_spent / purchase_count as f64
            } else {
                0.0
            };
            CustomerStats {
                customer_id,
                total_spent,
                purchase_count,
                avg_order_value: round2(avg),
                products_bought: products.into_iter().collect(),
            }
        })
        .collect();
    customers.sort_by(|a, b| b.total_spent.total_cmp(&a.total_spent));
    customers
}

pub fn average_order_value(records: &[Transaction]) -> f64 {
    if records.is_empty() {
        0.0
    } else {
        calculate_total_revenue(records) / records.len() as f64
    }
}

/// Earliest and latest date keys, if any.
pub fn date_range(records: &[Transaction]) -> Option<(String, String)> {
    let min = records.iter().map(|t| t.date.as_str()).min()?;
    let max = records.iter().map(|t| t.date.as_str()).max()?;
    Some((min.to_string(), max.to_string()))
}

pub fn filter_options(records: &[Transaction]) -> FilterOptions {
    let regions: BTreeSet<&str> = records.iter().map(|t| t.region.as_str()).collect();
    let amounts = records.iter().map(Transaction::amount);
    let min_amount = amounts.clone().reduce(f64::min).unwrap_or(0.0);
    let max_amount = amounts.reduce(f64::max).unwrap_or(0.0);
    FilterOptions {
        regions: regions.into_iter().map(String::from).collect(),
        min_amount,
        max_amount,
    }
}

// ---------------------------------------------------------------------------
// All views at once
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SalesAnalysis {
    pub total_revenue: f64,
    pub regions: Vec<RegionStats>,
    pub daily_trend: Vec<DailyStats>,
    pub peak_day: PeakDay,
    pub top_products: Vec<ProductStats>,
    pub low_products: Vec<ProductStats>,
    pub customers: Vec<CustomerStats>,
    pub average_order_value: f64,
    pub date_range: Option<(String, String)>,
    pub top_n: usize,
    pub low_stock_threshold: i64,
}

impl SalesAnalysis {
    pub fn compute(records: &[Transaction], top_n: usize, low_stock_threshold: i64) -> Self {
        Self {
            total_revenue: calculate_total_revenue(records),
            regions: region_wise_sales(records),
            daily_trend: daily_sales_trend(records),
            peak_day: find_peak_sales_day(records),
            top_products: top_selling_products(records, top_n),
            low_products: low_performing_products(records, low_stock_threshold),
            customers: customer_analysis(records),
            average_order_value: average_order_value(records),
            date_range: date_range(records),
            top_n,
            low_stock_threshold,
        }
    }
}
