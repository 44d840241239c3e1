//! Console reporting of a finished harvest run

use crate::output::traits::CrawlSummary;

/// Prints the run summary to stdout
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Pages:");
    println!("  Attempted: {}", summary.pages_attempted);
    println!("  Succeeded: {}", summary.pages_succeeded);
    println!("  Failed: {}", summary.pages_failed);
    if !summary.failed_pages.is_empty() {
        let pages: Vec<String> = summary.failed_pages.iter().map(|p| p.to_string()).collect();
        println!("  Failed pages: {}", pages.join(", "));
    }
    println!();

    println!("Items:");
    println!("  Raw entries: {}", summary.raw_items);
    println!("  Unique entries: {}", summary.unique_items);
    println!("  Duplicates removed: {}", summary.duplicates_removed());
    println!();

    if summary.output_written {
        println!("Output: {}", summary.destination);
    } else {
        println!("Output: nothing written (no entries collected)");
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages) in {:.2}s",
        summary.success_rate(),
        summary.pages_succeeded,
        summary.pages_attempted,
        summary.duration_seconds
    );
}
