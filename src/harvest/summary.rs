//! Run summary reporting

use chrono::NaiveDate;
use std::time::Duration;

/// Outcome of one harvest run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Category that was harvested
    pub category: String,

    /// Earliest publication date requested
    pub start_date: NaiveDate,

    /// Resources resolved under the category
    pub resources_total: usize,

    /// Resources whose batch reached the sink
    pub resources_succeeded: usize,

    /// Resources abandoned after a fetch or sink failure
    pub resources_failed: usize,

    /// Resources abandoned because the run was cancelled
    pub resources_cancelled: usize,

    /// Rows appended over the whole run
    pub total_rows: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(category: &str, start_date: NaiveDate, resources_total: usize) -> Self {
        Self {
            category: category.to_string(),
            start_date,
            resources_total,
            resources_succeeded: 0,
            resources_failed: 0,
            resources_cancelled: 0,
            total_rows: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Percentage of resolved resources that completed
    pub fn success_rate(&self) -> f64 {
        if self.resources_total == 0 {
            return 0.0;
        }
        (self.resources_succeeded as f64 / self.resources_total as f64) * 100.0
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("  Category: {}", summary.category);
    println!("  From date: {}", summary.start_date.format("%Y-%m-%d"));
    println!("  Resources resolved: {}", summary.resources_total);
    println!("  Resources completed: {}", summary.resources_succeeded);
    if summary.resources_failed > 0 {
        println!("  Resources failed: {}", summary.resources_failed);
    }
    if summary.resources_cancelled > 0 {
        println!("  Resources cancelled: {}", summary.resources_cancelled);
    }
    println!("  Rows written: {}", summary.total_rows);
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} resources)",
        summary.success_rate(),
        summary.resources_succeeded,
        summary.resources_total
    );
}
