/// One sales transaction as read from the input file.
///
/// Produced by the parser as an unvalidated candidate; once it has passed
/// `validator::validate_and_filter` it is treated as immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub customer_id: String,
    pub region: String,
}

impl Transaction {
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Metadata for one catalog product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogEntry {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
}

/// A transaction with catalog metadata attached.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTransaction {
    pub transaction: Transaction,
    pub api_category: Option<String>,
    pub api_brand: Option<String>,
    pub api_rating: Option<f64>,
    pub api_match: bool,
}
