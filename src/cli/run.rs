use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use comfy_table::{Cell, Table};
use dialoguer::{Confirm, Input};

use crate::analytics::{filter_options, FilterOptions, SalesAnalysis};
use crate::catalog::{
    enrich_sales_data, enrichment_stats, save_enriched_data, HttpCatalog, ProductCatalog,
    ProductSource,
};
use crate::cli::RunArgs;
use crate::error::Result;
use crate::fmt::currency;
use crate::importer::{parse_transactions, read_sales_data, resolve_encodings};
use crate::report::{format_report, write_report, ReportInput};
use crate::settings::Settings;
use crate::validator::{validate_and_filter, FilterCriteria};

const STAGES: usize = 10;

fn stage(n: usize, label: &str) {
    println!("{} {label}", format!("[{n}/{STAGES}]").cyan().bold());
}

fn done(msg: impl AsRef<str>) {
    println!("{} {}\n", "\u{2713}".green(), msg.as_ref());
}

pub fn run(args: RunArgs, settings: Settings) -> Result<()> {
    let settings = args.apply(settings);

    println!("{}", "===================================".bold());
    println!("{}", "        SALES ANALYTICS SYSTEM     ".bold());
    println!("{}\n", "===================================".bold());

    stage(1, "Reading sales data...");
    let encodings = resolve_encodings(&settings.encodings);
    let raw_lines = read_sales_data(Path::new(&settings.input_path), &encodings);
    done(format!("Successfully read {} raw lines", raw_lines.len()));

    stage(2, "Parsing and cleaning data...");
    let candidates = parse_transactions(&raw_lines);
    done(format!("Parsed {} records", candidates.len()));

    stage(3, "Filter Options Available:");
    let options = filter_options(&candidates);
    println!("  Regions: {}", options.regions.join(", "));
    println!("  Amount Range: {} to {}", options.min_amount, options.max_amount);
    let criteria = choose_filters(&args, &options);
    println!();

    stage(4, "Validating transactions...");
    let validation = validate_and_filter(&candidates, &criteria);
    let summary = &validation.summary;
    println!(
        "{} Valid: {} | Invalid: {}",
        "\u{2713}".green(),
        summary.final_count,
        validation.invalid
    );
    println!("  Filtered by region: {}", summary.filtered_by_region);
    println!("  Filtered by amount: {}\n", summary.filtered_by_amount);
    let valid = validation.valid;

    stage(5, "Analyzing sales data...");
    let analysis = SalesAnalysis::compute(&valid, settings.top_n, settings.low_stock_threshold);
    done("Analysis complete");
    print_sales_summary(&analysis);

    stage(6, "Fetching product data from API...");
    let products = if args.offline {
        println!("  Offline: skipping catalog fetch");
        Vec::new()
    } else {
        HttpCatalog::new(
            settings.catalog_url.clone(),
            Duration::from_secs(settings.catalog_timeout_secs),
        )
        .fetch_products(settings.catalog_limit)
    };
    let catalog = ProductCatalog::from_products(&products);
    if catalog.is_empty() {
        println!("  {}", "No catalog products available; records will be unmatched".yellow());
    }
    done(format!("Fetched {} products", products.len()));

    stage(7, "Enriching sales data...");
    let enriched = enrich_sales_data(&valid, &catalog);
    let stats = enrichment_stats(&enriched);
    done(format!(
        "Enriched {}/{} transactions ({:.1}%)",
        stats.matched, stats.total, stats.success_rate
    ));

    stage(8, "Saving enriched data...");
    save_enriched_data(&enriched, Path::new(&settings.enriched_path))?;
    done(format!("Saved to: {}", settings.enriched_path));

    stage(9, "Generating report...");
    let report = format_report(&ReportInput {
        generated_at: chrono::Local::now().naive_local(),
        records_processed: valid.len(),
        analysis: &analysis,
        enrichment: &stats,
    });
    write_report(&report, Path::new(&settings.report_path))?;
    done(format!("Report saved to: {}", settings.report_path));

    stage(10, "Process Complete!");
    println!("{}", "All steps finished successfully.".green());
    Ok(())
}

/// Filters come from the command line when any filter flag is given;
/// otherwise the user is asked, unless prompting is disabled or stdin is
/// not a terminal.
fn choose_filters(args: &RunArgs, options: &FilterOptions) -> FilterCriteria {
    if args.has_filter_flags() || args.no_interactive || !std::io::stdin().is_terminal() {
        return FilterCriteria {
            region: args.region.clone(),
            min_amount: args.min_amount,
            max_amount: args.max_amount,
        };
    }
    prompt_filters(options)
}

fn prompt_filters(options: &FilterOptions) -> FilterCriteria {
    let wants_filter = Confirm::new()
        .with_prompt("Do you want to filter data?")
        .default(false)
        .interact()
        .unwrap_or(false);
    if !wants_filter {
        return FilterCriteria::default();
    }

    let region: String = Input::new()
        .with_prompt(format!(
            "Region to filter ({}; Enter to skip)",
            options.regions.join("/")
        ))
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();
    let min_in: String = Input::new()
        .with_prompt("Minimum amount (Enter to skip)")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();
    let max_in: String = Input::new()
        .with_prompt("Maximum amount (Enter to skip)")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();

    let region = region.trim();
    FilterCriteria {
        region: (!region.is_empty()).then(|| region.to_string()),
        min_amount: parse_bound(&min_in),
        max_amount: parse_bound(&max_in),
    }
}

/// Blank or non-numeric input means "no bound".
fn parse_bound(raw: &str) -> Option<f64> {
    raw.trim().parse().ok()
}

fn print_sales_summary(analysis: &SalesAnalysis) {
    let peak = &analysis.peak_day;
    println!(
        "{} Peak sales day: {} (revenue {}, {} transactions)\n",
        "[Sales Summary]".bold(),
        peak.date.as_deref().unwrap_or("N/A"),
        currency(peak.revenue),
        peak.transaction_count
    );

    let mut products = Table::new();
    products.set_header(vec!["Product", "Quantity", "Revenue"]);
    for p in &analysis.top_products {
        products.add_row(vec![
            Cell::new(&p.name),
            Cell::new(p.quantity),
            Cell::new(currency(p.revenue)),
        ]);
    }
    println!("Top Selling Products\n{products}\n");

    let mut customers = Table::new();
    customers.set_header(vec!["Customer", "Total Spent", "Orders", "Avg Order", "Products"]);
    for c in analysis.customers.iter().take(5) {
        customers.add_row(vec![
            Cell::new(&c.customer_id),
            Cell::new(currency(c.total_spent)),
            Cell::new(c.purchase_count),
            Cell::new(currency(c.avg_order_value)),
            Cell::new(c.products_bought.join(", ")),
        ]);
    }
    println!("Top Customers\n{customers}\n");

    if analysis.low_products.is_empty() {
        println!("No low performing products (qty < {}).\n", analysis.low_stock_threshold);
        return;
    }
    let mut low = Table::new();
    low.set_header(vec!["Product", "Quantity", "Revenue"]);
    for p in analysis.low_products.iter().take(5) {
        low.add_row(vec![
            Cell::new(&p.name),
            Cell::new(p.quantity.to_string().red()),
            Cell::new(currency(p.revenue)),
        ]);
    }
    println!(
        "Low Performing Products (qty < {})\n{low}\n",
        analysis.low_stock_threshold
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bound_ignores_bad_input() {
        assert_eq!(parse_bound(" 250.5 "), Some(250.5));
        assert_eq!(parse_bound(""), None);
        assert_eq!(parse_bound("lots"), None);
    }

    #[test]
    fn test_choose_filters_uses_flags() {
        let args = RunArgs {
            region: Some("East".to_string()),
            max_amount: Some(1000.0),
            ..Default::default()
        };
        let options = FilterOptions {
            regions: vec!["East".to_string()],
            min_amount: 0.0,
            max_amount: 0.0,
        };
        let criteria = choose_filters(&args, &options);
        assert_eq!(criteria.region.as_deref(), Some("East"));
        assert_eq!(criteria.min_amount, None);
        assert_eq!(criteria.max_amount, Some(1000.0));
    }

    #[test]
    fn test_choose_filters_non_interactive_is_unfiltered() {
        let args = RunArgs {
            no_interactive: true,
            ..Default::default()
        };
        let options = FilterOptions {
            regions: Vec::new(),
            min_amount: 0.0,
            max_amount: 0.0,
        };
        assert_eq!(choose_filters(&args, &options), FilterCriteria::default());
    }

    #[test]
    fn test_offline_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sales.txt");
        std::fs::write(
            &input,
            "TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region\n\
             T001|2024-01-01|P001|Widget|5|10.00|C001|North\n\
             T002|2024-01-01|P002|Gadget|0|5.00|C002|South\n",
        )
        .unwrap();
        let enriched = dir.path().join("out").join("enriched.txt");
        let report = dir.path().join("out").join("report.txt");
        let args = RunArgs {
            input: Some(input.to_string_lossy().to_string()),
            enriched_output: Some(enriched.to_string_lossy().to_string()),
            report_output: Some(report.to_string_lossy().to_string()),
            no_interactive: true,
            offline: true,
            ..Default::default()
        };
        run(args, Settings::default()).unwrap();

        let enriched_text = std::fs::read_to_string(&enriched).unwrap();
        assert_eq!(enriched_text.lines().count(), 2);
        assert!(enriched_text.contains("T001|2024-01-01|P001|Widget|5|10.0|C001|North||||False"));

        let report_text = std::fs::read_to_string(&report).unwrap();
        assert!(report_text.contains("Total Revenue: 50.00"));
        assert!(report_text.contains("North               50.00     100.00%            1"));
        assert!(report_text.contains("  - P001"));
    }
}
