//! Product catalog enrichment.
//!
//! Products come from a remote catalog (a single blocking GET, no retries).
//! Any fetch failure degrades to an empty product list, which in turn leaves
//! every transaction unmatched.
//!
//! Catalog entries are assigned to transactions round-robin by position:
//! transaction `i` receives entry `i % catalog.len()`. The transaction's own
//! product ID is not consulted.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{Result, SalesError};
use crate::fmt::decimal;
use crate::models::{CatalogEntry, EnrichedTransaction, Transaction};

pub const ENRICHED_HEADER: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "APICategory",
    "APIBrand",
    "APIRating",
    "APIMatch",
];

// ---------------------------------------------------------------------------
// Product source
// ---------------------------------------------------------------------------

/// One product as returned by the catalog API. Metadata fields of an
/// unexpected type read as `None` instead of failing the product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiProduct {
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,
}

fn lenient_text<'de, D>(de: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_rating<'de, D>(de: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(de)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Products are kept as raw values so one malformed entry is dropped on its
/// own rather than failing the whole response.
#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<serde_json::Value>,
}

impl ProductsResponse {
    fn into_products(self) -> Vec<ApiProduct> {
        self.products
            .into_iter()
            .filter_map(|raw| match serde_json::from_value(raw) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("Skipping malformed catalog product: {e}");
                    None
                }
            })
            .collect()
    }
}

/// Where catalog products come from. Implementations never fail: errors
/// are logged and an empty list returned.
pub trait ProductSource {
    fn fetch_products(&self, limit: usize) -> Vec<ApiProduct>;
}

/// Catalog served over HTTP as `GET {base_url}?limit=N`.
pub struct HttpCatalog {
    base_url: String,
    timeout: Duration,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    fn try_fetch(&self, limit: usize) -> Result<Vec<ApiProduct>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(format!("sales-analytics/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        let resp = client
            .get(&self.base_url)
            .query(&[("limit", limit)])
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SalesError::Http(format!("{} returned {status}", self.base_url)));
        }
        let body: ProductsResponse = resp.json()?;
        Ok(body.into_products())
    }
}

impl ProductSource for HttpCatalog {
    fn fetch_products(&self, limit: usize) -> Vec<ApiProduct> {
        log::info!("Fetching products from {}?limit={limit}", self.base_url);
        match self.try_fetch(limit) {
            Ok(products) => {
                log::info!("Fetched {} products", products.len());
                products
            }
            Err(e) => {
                log::warn!("Error fetching products: {e}");
                Vec::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog mapping
// ---------------------------------------------------------------------------

/// Catalog entries keyed by integer product ID, in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    index: HashMap<i64, usize>,
    entries: Vec<CatalogEntry>,
}

fn catalog_id(raw: &serde_json::Value) -> Option<i64> {
    match raw {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl ProductCatalog {
    /// Build the mapping. Products without an integer ID are skipped; a
    /// repeated ID overwrites the earlier entry in place.
    pub fn from_products(products: &[ApiProduct]) -> Self {
        let mut catalog = Self::default();
        for p in products {
            let Some(id) = catalog_id(&p.id) else {
                continue;
            };
            let entry = CatalogEntry {
                category: p.category.clone(),
                brand: p.brand.clone(),
                rating: p.rating,
            };
            match catalog.index.get(&id) {
                Some(&i) => catalog.entries[i] = entry,
                None => {
                    catalog.index.insert(id, catalog.entries.len());
                    catalog.entries.push(entry);
                }
            }
        }
        log::info!("Product mapping size: {}", catalog.len());
        catalog
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at position `i`, wrapping around the catalog.
    pub fn cycle(&self, i: usize) -> Option<&CatalogEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(&self.entries[i % self.entries.len()])
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

pub fn enrich_sales_data(records: &[Transaction], catalog: &ProductCatalog) -> Vec<EnrichedTransaction> {
    records
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            let entry = catalog.cycle(i);
            EnrichedTransaction {
                transaction: tx.clone(),
                api_category: entry.and_then(|e| e.category.clone()),
                api_brand: entry.and_then(|e| e.brand.clone()),
                api_rating: entry.and_then(|e| e.rating),
                api_match: entry.is_some(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentStats {
    pub total: usize,
    pub matched: usize,
    /// Percentage of records with a catalog match, 0 when there are none.
    pub success_rate: f64,
    /// Distinct product IDs without a match, sorted.
    pub unmatched_product_ids: Vec<String>,
}

pub fn enrichment_stats(enriched: &[EnrichedTransaction]) -> EnrichmentStats {
    let total = enriched.len();
    let matched = enriched.iter().filter(|e| e.api_match).count();
    let success_rate = if total > 0 {
        matched as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let unmatched: BTreeSet<&str> = enriched
        .iter()
        .filter(|e| !e.api_match)
        .map(|e| e.transaction.product_id.as_str())
        .collect();
    EnrichmentStats {
        total,
        matched,
        success_rate,
        unmatched_product_ids: unmatched.into_iter().map(String::from).collect(),
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

fn enriched_row(e: &EnrichedTransaction) -> [String; 12] {
    let tx = &e.transaction;
    [
        tx.transaction_id.clone(),
        tx.date.clone(),
        tx.product_id.clone(),
        tx.product_name.clone(),
        tx.quantity.to_string(),
        decimal(tx.unit_price),
        tx.customer_id.clone(),
        tx.region.clone(),
        e.api_category.clone().unwrap_or_default(),
        e.api_brand.clone().unwrap_or_default(),
        e.api_rating.map(decimal).unwrap_or_default(),
        if e.api_match { "True" } else { "False" }.to_string(),
    ]
}

/// Write enriched records as a pipe-delimited file with a header row.
pub fn save_enriched_data(enriched: &[EnrichedTransaction], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'|')
        .quote_style(csv::QuoteStyle::Never)
        .from_path(path)?;
    wtr.write_record(ENRICHED_HEADER)?;
    for e in enriched {
        wtr.write_record(enriched_row(e))?;
    }
    wtr.flush()?;
    log::info!("Enriched data saved to {}", path.display());
    Ok(())
}
