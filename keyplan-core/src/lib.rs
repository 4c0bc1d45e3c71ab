pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod pages;
pub mod plan;
pub mod report;

use colored::Colorize;

pub use error::PlanError;

pub fn print_banner() {
    let rule = "═".repeat(60);
    println!("{}", rule.bright_blue().bold());
    println!("{}", "  SEO KEYWORD PLANNER".bright_white().bold());
    println!("{}", rule.bright_blue().bold());
    println!(
        "Uses an OpenAI model and a keyword volume API to build SEO keyword plans."
    );
    println!(
        "You'll be asked for a topic, the number of child pages, and any manual pages."
    );
    println!("Each page fetches live keyword data.");
    println!();
}
