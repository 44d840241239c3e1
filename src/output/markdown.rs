//! Markdown summary generation
//!
//! This module renders a human-readable markdown report of a harvest run,
//! including page statistics, failed pages, and item counts.

use crate::output::traits::{CrawlSummary, SinkResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a harvest run
///
/// # Arguments
///
/// * `summary` - The run summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(SinkError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> SinkResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Page Harvest Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        summary.duration_seconds
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push_str(&format!(
        "- **Concurrency Limit**: {}\n\n",
        summary.concurrency_limit
    ));

    // Pages
    md.push_str("## Pages\n\n");
    md.push_str(&format!("- **Attempted**: {}\n", summary.pages_attempted));
    md.push_str(&format!("- **Succeeded**: {}\n", summary.pages_succeeded));
    md.push_str(&format!("- **Failed**: {}\n", summary.pages_failed));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    if !summary.failed_pages.is_empty() {
        md.push_str("### Failed Pages\n\n");
        let pages: Vec<String> = summary.failed_pages.iter().map(|p| p.to_string()).collect();
        md.push_str(&format!("{}\n\n", pages.join(", ")));
    }

    // Items
    md.push_str("## Items\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Raw entries | {} |\n", summary.raw_items));
    md.push_str(&format!("| Unique entries | {} |\n", summary.unique_items));
    md.push_str(&format!(
        "| Duplicates removed | {} |\n\n",
        summary.duplicates_removed()
    ));

    // Output
    md.push_str("## Output\n\n");
    if summary.output_written {
        md.push_str(&format!("Written to `{}`\n", summary.destination));
    } else {
        md.push_str(&format!(
            "Nothing written to `{}` (no entries collected)\n",
            summary.destination
        ));
    }

    md
}
