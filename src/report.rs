use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::analytics::SalesAnalysis;
use crate::catalog::EnrichmentStats;
use crate::error::Result;
use crate::fmt::currency;

/// Everything the text report renders. All numbers are computed upstream.
pub struct ReportInput<'a> {
    pub generated_at: NaiveDateTime,
    pub records_processed: usize,
    pub analysis: &'a SalesAnalysis,
    pub enrichment: &'a EnrichmentStats,
}

fn section(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.chars().count()));
    out.push('\n');
}

fn table_header(out: &mut String, header: &str) {
    out.push_str(header);
    out.push('\n');
    out.push_str(&"-".repeat(header.chars().count()));
    out.push('\n');
}

// `write!` into a String cannot fail, so its result is discarded throughout.

/// Render the fixed-layout sales report.
pub fn format_report(input: &ReportInput) -> String {
    let a = input.analysis;
    let mut out = String::new();

    section(&mut out, "SALES ANALYTICS REPORT");
    let _ = writeln!(out, "Generated: {}", input.generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Records Processed: {}\n", input.records_processed);

    section(&mut out, "OVERALL SUMMARY");
    let (date_min, date_max) = a
        .date_range
        .clone()
        .unwrap_or_else(|| ("N/A".to_string(), "N/A".to_string()));
    let _ = writeln!(out, "Total Revenue: {}", currency(a.total_revenue));
    let _ = writeln!(out, "Total Transactions: {}", input.records_processed);
    let _ = writeln!(out, "Average Order Value: {}", currency(a.average_order_value));
    let _ = writeln!(out, "Date Range: {date_min} to {date_max}\n");

    section(&mut out, "REGION-WISE PERFORMANCE");
    table_header(&mut out, "Region        Sales          % of Total   Transactions");
    for r in &a.regions {
        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>10.2}% {:>12}",
            r.region,
            currency(r.total_sales),
            r.percentage,
            r.transaction_count
        );
    }
    out.push('\n');

    section(&mut out, &format!("TOP {} PRODUCTS", a.top_n));
    table_header(&mut out, "Rank  Product Name                 Quantity   Revenue");
    for (idx, p) in a.top_products.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<28} {:>8}   {:>10}",
            idx + 1,
            p.name,
            p.quantity,
            currency(p.revenue)
        );
    }
    out.push('\n');

    section(&mut out, &format!("TOP {} CUSTOMERS", a.top_n));
    table_header(&mut out, "Rank  CustomerID  Total Spent   Orders");
    for (idx, c) in a.customers.iter().take(a.top_n).enumerate() {
        let _ = writeln!(
            out,
            "{:<4} {:<10} {:>12}   {:>4}",
            idx + 1,
            c.customer_id,
            currency(c.total_spent),
            c.purchase_count
        );
    }
    out.push('\n');

    section(&mut out, "DAILY SALES TREND");
    table_header(&mut out, "Date         Revenue        Transactions  Unique Customers");
    for d in &a.daily_trend {
        let _ = writeln!(
            out,
            "{:<12} {:>12} {:>12} {:>17}",
            d.date,
            currency(d.revenue),
            d.transaction_count,
            d.unique_customers
        );
    }
    out.push('\n');

    section(&mut out, "PRODUCT PERFORMANCE ANALYSIS");
    let _ = writeln!(
        out,
        "Best selling day: {} (Revenue: {}, Transactions: {})",
        a.peak_day.date.as_deref().unwrap_or("N/A"),
        currency(a.peak_day.revenue),
        a.peak_day.transaction_count
    );
    let _ = writeln!(out, "Low performing products (qty < {}):", a.low_stock_threshold);
    if a.low_products.is_empty() {
        out.push_str("  - None\n");
    }
    for p in &a.low_products {
        let _ = writeln!(
            out,
            "  - {}: quantity={}, revenue={}",
            p.name,
            p.quantity,
            currency(p.revenue)
        );
    }
    out.push_str("\nAverage transaction value per region:\n");
    for r in &a.regions {
        let _ = writeln!(
            out,
            "  - {}: {} per transaction",
            r.region,
            currency(r.average_transaction_value())
        );
    }
    out.push('\n');

    let e = input.enrichment;
    section(&mut out, "API ENRICHMENT SUMMARY");
    let _ = writeln!(out, "Total products enriched: {}", e.total);
    let _ = writeln!(out, "Success rate: {:.2}%", e.success_rate);
    out.push_str("Products that couldn't be enriched:\n");
    if e.unmatched_product_ids.is_empty() {
        out.push_str("  - None\n");
    }
    for pid in &e.unmatched_product_ids {
        let _ = writeln!(out, "  - {pid}");
    }

    out
}

pub fn write_report(contents: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    log::info!("Sales report saved to {}", path.display());
    Ok(())
}
