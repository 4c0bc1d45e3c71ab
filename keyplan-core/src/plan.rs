use crate::aggregate::{SummaryTable, aggregate};
use crate::config::{AggregateConfig, DEFAULT_CHILD_PAGES, ExportConfig, PlannerConfig};
use crate::error::{PlanError, Result};
use crate::export::export_workbook;
use crate::pages::{merge_pages, parse_pages_input};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use keyplan_client::{KeywordFetcher, KeywordTable, TopicPlan, TopicPlanner};
use std::num::IntErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Stages of a run, in the order they execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStage {
    CollectInputs,
    PlanTopic,
    MergePages,
    FetchAll,
    Aggregate,
    Export,
    Report,
}

/// Progress notifications emitted while a run executes
#[derive(Debug, Clone)]
pub enum PlanEvent {
    /// A stage is starting
    Stage(PlanStage),
    /// The planner answered and the page list is final
    PagesMerged {
        topic: String,
        main_page: String,
        pages: Vec<String>,
    },
    /// One page's keywords were fetched
    PageFetched {
        index: usize,
        total: usize,
        page: String,
        rows: usize,
    },
    /// One page's fetch failed; it continues with an empty table
    PageFailed {
        index: usize,
        total: usize,
        page: String,
        error: String,
    },
}

/// Callback for reporting run progress
pub type PlanProgressCallback = Arc<dyn Fn(PlanEvent) + Send + Sync>;

/// Keyword tables in merged page order
pub type PageTables = Vec<(String, KeywordTable)>;

/// Parse the child page limit.
///
/// Blank or non-numeric input gives the default; numbers are clamped to the
/// planner's bounds.
pub fn parse_child_limit(input: &str, config: &PlannerConfig) -> usize {
    let input = input.trim();
    if input.is_empty() {
        return config.clamp_children(DEFAULT_CHILD_PAGES as i64);
    }

    match input.parse::<i64>() {
        Ok(n) => config.clamp_children(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => config.max_children,
            IntErrorKind::NegOverflow => config.min_children,
            _ => {
                warn!("Child page limit '{}' is not a number, using {}", input, DEFAULT_CHILD_PAGES);
                config.clamp_children(DEFAULT_CHILD_PAGES as i64)
            }
        },
    }
}

/// Validated inputs for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanInputs {
    pub topic: String,
    pub max_children: usize,
    pub manual_pages: Vec<String>,
}

impl PlanInputs {
    pub fn collect(
        topic: &str,
        max_children: &str,
        manual_pages: &str,
        config: &PlannerConfig,
    ) -> Result<Self> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PlanError::EmptyTopic);
        }

        Ok(Self {
            topic: topic.to_string(),
            max_children: parse_child_limit(max_children, config),
            manual_pages: parse_pages_input(manual_pages),
        })
    }
}

/// Options for configuring a planning run
pub struct PlanOptions {
    pub inputs: PlanInputs,
    pub aggregate: AggregateConfig,
    pub export: ExportConfig,
    pub show_progress_bars: bool,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub topic: String,
    pub plan: TopicPlan,
    pub pages: Vec<String>,
    pub tables: PageTables,
    pub summary: SummaryTable,
    pub output: PathBuf,
}

fn emit(callback: &Option<PlanProgressCallback>, event: PlanEvent) {
    if let Some(callback) = callback {
        callback(event);
    }
}

/// Fetch every page in order, one request at a time.
///
/// Never fails: a page whose fetch fails gets an empty table and a warning.
pub async fn fetch_all(
    fetcher: &KeywordFetcher,
    pages: &[String],
    show_progress_bar: bool,
    progress_callback: Option<PlanProgressCallback>,
) -> PageTables {
    let total = pages.len();

    let progress_bar = if show_progress_bar {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template("{msg} [{bar:30.yellow/blue}] {pos}/{len} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Some(pb)
    } else {
        None
    };

    let mut tables = Vec::with_capacity(total);
    for (idx, page) in pages.iter().enumerate() {
        if let Some(ref pb) = progress_bar {
            pb.set_message(format!("Fetching: {}", page));
        }

        let (table, error) = fetcher.fetch_or_empty(page).await;
        match error {
            None => emit(
                &progress_callback,
                PlanEvent::PageFetched {
                    index: idx,
                    total,
                    page: page.clone(),
                    rows: table.len(),
                },
            ),
            Some(e) => {
                let line = format!("{} {}: {}", "⚠".yellow().bold(), page, e);
                match progress_bar {
                    Some(ref pb) => pb.println(line),
                    None => eprintln!("{}", line),
                }
                emit(
                    &progress_callback,
                    PlanEvent::PageFailed {
                        index: idx,
                        total,
                        page: page.clone(),
                        error: e.to_string(),
                    },
                );
            }
        }

        tables.push((page.clone(), table));
        if let Some(ref pb) = progress_bar {
            pb.inc(1);
        }
    }

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    tables
}

/// Run a plan: ask the planner, merge pages, fetch keywords, aggregate and
/// export. Planner and export failures end the run.
pub async fn execute_plan(
    options: PlanOptions,
    planner: &TopicPlanner,
    fetcher: &KeywordFetcher,
    progress_callback: Option<PlanProgressCallback>,
) -> Result<PlanOutcome> {
    let PlanOptions {
        inputs,
        aggregate: aggregate_config,
        export,
        show_progress_bars,
    } = options;
    let PlanInputs {
        topic,
        max_children,
        manual_pages,
    } = inputs;

    emit(&progress_callback, PlanEvent::Stage(PlanStage::PlanTopic));
    let plan = planner.plan(&topic, max_children).await?;

    emit(&progress_callback, PlanEvent::Stage(PlanStage::MergePages));
    let pages = merge_pages(&manual_pages, &plan.child_pages, None);
    info!(
        "Merged {} manual and {} generated pages into {}",
        manual_pages.len(),
        plan.child_pages.len(),
        pages.len()
    );
    emit(
        &progress_callback,
        PlanEvent::PagesMerged {
            topic: topic.clone(),
            main_page: plan.main_page.clone(),
            pages: pages.clone(),
        },
    );

    emit(&progress_callback, PlanEvent::Stage(PlanStage::FetchAll));
    let tables = fetch_all(fetcher, &pages, show_progress_bars, progress_callback.clone()).await;

    emit(&progress_callback, PlanEvent::Stage(PlanStage::Aggregate));
    let summary = aggregate(&tables, &aggregate_config);

    emit(&progress_callback, PlanEvent::Stage(PlanStage::Export));
    let output = export_workbook(&summary, &tables, &export)?;

    Ok(PlanOutcome {
        topic,
        plan,
        pages,
        tables,
        summary,
        output,
    })
}
