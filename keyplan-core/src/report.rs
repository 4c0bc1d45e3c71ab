// Console reports for a planning run

use crate::aggregate::SummaryTable;
use colored::Colorize;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Format an integer with `,` thousands separators.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Main page and the merged page list, shown before keyword fetching starts.
pub fn generate_topic_overview(topic: &str, main_page: &str, pages: &[String]) -> String {
    let mut report = String::new();
    report.push_str(&format!("{}\n", RULE.bright_blue()));
    report.push_str(&format!("{} {}\n", "Topic:".bold(), topic));
    report.push_str(&format!("{} {}\n", "Main page:".bold(), main_page.cyan().bold()));
    report.push_str(&format!("{} ({})\n", "Child pages:".bold(), pages.len()));
    if pages.is_empty() {
        report.push_str("  (none)\n");
    }
    for page in pages {
        report.push_str(&format!("  • {}\n", page));
    }
    report.push_str(&format!("{}\n", RULE.bright_blue()));
    report
}

/// Final totals and the output path.
pub fn generate_summary_report(summary: &SummaryTable, outfile: &Path) -> String {
    let totals = &summary.totals;

    let mut report = String::new();
    report.push_str(&format!("{}\n", RULE.magenta()));
    report.push_str(&format!("{}\n", "# SEO Keyword Summary".bold()));
    report.push_str(&format!(
        "  Total Child Pages:       {}\n",
        summary.page_count().to_string().bold()
    ));
    report.push_str(&format!(
        "  Total Search Volume:     {}\n",
        format_thousands(totals.search_volume).bold()
    ));
    report.push_str(&format!(
        "  Potential Traffic (10%): {}\n",
        format_thousands(totals.potential_traffic).cyan()
    ));
    report.push_str(&format!(
        "  Estimated Signups (4%):  {}\n",
        format_thousands(totals.est_signups).green()
    ));

    if !summary.rows.is_empty() {
        report.push_str("\n## Pages by search volume\n");
        for row in &summary.rows {
            report.push_str(&format!(
                "  {:>12}  {}\n",
                format_thousands(row.search_volume),
                row.page_type
            ));
        }
    }

    report.push_str(&format!("{}\n", RULE.magenta()));
    report.push_str(&format!(
        "Results exported to {}\n",
        outfile.display().to_string().italic()
    ));
    report.push_str(&format!(
        "Generated {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report
}
