// Run configuration

pub use keyplan_client::{FetcherConfig, PlannerConfig};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_FILE: &str = "seo_keywords.xlsx";
pub const DEFAULT_CHILD_PAGES: usize = 10;

/// Volume column names, checked in order.
pub const DEFAULT_VOLUME_ALIASES: [&str; 3] = ["volume", "Search Volume", "search_volume"];

#[derive(Debug, Clone)]
pub struct AggregateConfig {
    pub volume_aliases: Vec<String>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            volume_aliases: DEFAULT_VOLUME_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// How page names become sheet names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SheetNaming {
    /// Truncate to the sheet name limit; a later page whose name collides
    /// replaces the earlier page's sheet.
    #[default]
    Truncate,
    /// Truncate, then add " (2)", " (3)", ... until the name is unique.
    Disambiguate,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub path: PathBuf,
    pub sheet_naming: SheetNaming,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            sheet_naming: SheetNaming::default(),
        }
    }
}

/// Everything a run needs, built once before it starts.
#[derive(Debug, Clone)]
pub struct Settings {
    pub planner: PlannerConfig,
    pub fetcher: FetcherConfig,
    pub aggregate: AggregateConfig,
    pub export: ExportConfig,
}
