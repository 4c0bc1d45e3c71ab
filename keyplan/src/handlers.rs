use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use keyplan_client::{FetcherConfig, KeywordFetcher, PlannerConfig, TopicPlanner};
use keyplan_core::config::{AggregateConfig, ExportConfig, Settings, SheetNaming};
use keyplan_core::plan::{
    PlanEvent, PlanInputs, PlanOptions, PlanProgressCallback, PlanStage, execute_plan,
};
use keyplan_core::report::{generate_summary_report, generate_topic_overview};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

const TOPIC_PROMPT: &str = "Enter the main topic/keyword:";
const LIMIT_PROMPT: &str = "Max number of child pages (1-50) [default 10]:";
const PAGES_PROMPT: &str = "Extra pages to include (comma-separated) [optional]:";

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_green().bold());
}

fn print_prompt(msg: &str) -> io::Result<String> {
    print!("{} ", msg.bright_cyan().bold());
    io::stdout().flush()?;
    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    Ok(response.trim().to_string())
}

/// Value of `id` from flags or environment, otherwise asked for on stdin.
/// With `no_prompt` a missing value is empty.
fn input_or_prompt(matches: &ArgMatches, id: &str, prompt: &str, no_prompt: bool) -> Result<String> {
    match matches.get_one::<String>(id) {
        Some(value) => Ok(value.clone()),
        None if no_prompt => Ok(String::new()),
        None => print_prompt(prompt).with_context(|| format!("Failed to read {} from stdin", id)),
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str, env: &str) -> Result<&'a str> {
    match matches.get_one::<String>(id).map(|s| s.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => bail!("Missing --{} (or {} in the environment)", id, env),
    }
}

/// Expand `~` in the output path.
pub fn output_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Build the run configuration from parsed arguments.
///
/// Fails when a credential or the keyword endpoint is missing.
pub fn build_settings(matches: &ArgMatches) -> Result<Settings> {
    let openai_key = required(matches, "openai-api-key", "OPENAI_API_KEY")?;
    let keywords_key = required(matches, "keywords-api-key", "KWRDS_API_KEY")?;
    let keywords_url = matches
        .get_one::<Url>("keywords-url")
        .cloned()
        .context("Missing --keywords-url (or KWRDS_API_URL in the environment)")?;
    let base_url = matches
        .get_one::<Url>("openai-base-url")
        .cloned()
        .context("Missing --openai-base-url")?;
    let model = matches
        .get_one::<String>("model")
        .context("Missing --model")?;
    let locale = matches
        .get_one::<String>("locale")
        .context("Missing --locale")?;
    let output = matches
        .get_one::<String>("output")
        .context("Missing --output")?;

    let planner = PlannerConfig::new(openai_key)?
        .with_base_url(base_url)
        .with_model(model.as_str());
    let fetcher = FetcherConfig::new(keywords_key, keywords_url).with_locale(locale.as_str());

    let sheet_naming = if matches.get_flag("dedupe-sheet-names") {
        SheetNaming::Disambiguate
    } else {
        SheetNaming::Truncate
    };
    let export = ExportConfig {
        path: output_path(output),
        sheet_naming,
    };

    debug!(
        "Settings: model={} base_url={} keywords_url={} locale={} output={}",
        planner.model,
        planner.base_url,
        fetcher.endpoint,
        fetcher.locale,
        export.path.display()
    );

    Ok(Settings {
        planner,
        fetcher,
        aggregate: AggregateConfig::default(),
        export,
    })
}

fn console_progress(model: String) -> PlanProgressCallback {
    Arc::new(move |event| match event {
        PlanEvent::Stage(PlanStage::CollectInputs) => {
            print_divider();
            println!("{}", "  NEW KEYWORD PLAN".bright_white().bold());
            print_divider();
        }
        PlanEvent::Stage(PlanStage::PlanTopic) => {
            println!(
                "{} Generating keyword structure with {}...",
                "→".blue(),
                model.bright_white()
            );
        }
        PlanEvent::PagesMerged {
            topic,
            main_page,
            pages,
        } => {
            print!("{}", generate_topic_overview(&topic, &main_page, &pages));
        }
        PlanEvent::Stage(PlanStage::FetchAll) => {
            println!("{} Fetching keyword data for each child page...", "→".blue());
        }
        PlanEvent::PageFetched {
            index,
            total,
            page,
            rows,
        } => {
            debug!("[{}/{}] {}: {} rows", index + 1, total, page, rows);
        }
        PlanEvent::Stage(PlanStage::Export) => {
            println!("{} Writing spreadsheet...", "→".blue());
        }
        PlanEvent::Stage(PlanStage::Report) => {
            println!();
        }
        PlanEvent::PageFailed { .. }
        | PlanEvent::Stage(PlanStage::MergePages)
        | PlanEvent::Stage(PlanStage::Aggregate) => {}
    })
}

/// Run one keyword plan end to end.
pub async fn handle_plan(matches: &ArgMatches) -> Result<()> {
    let quiet = matches.get_flag("quiet");
    let no_prompt = matches.get_flag("no-prompt");
    let settings = build_settings(matches)?;

    let progress = if quiet {
        None
    } else {
        Some(console_progress(settings.planner.model.clone()))
    };
    let notify = |event: PlanEvent| {
        if let Some(ref callback) = progress {
            callback(event);
        }
    };

    notify(PlanEvent::Stage(PlanStage::CollectInputs));
    let topic = input_or_prompt(matches, "topic", TOPIC_PROMPT, no_prompt)?;
    let max_children = input_or_prompt(matches, "max-children", LIMIT_PROMPT, no_prompt)?;
    let manual_pages = input_or_prompt(matches, "pages", PAGES_PROMPT, no_prompt)?;
    let inputs = PlanInputs::collect(&topic, &max_children, &manual_pages, &settings.planner)?;

    let Settings {
        planner,
        fetcher,
        aggregate,
        export,
    } = settings;
    let planner = TopicPlanner::new(planner).context("Failed to create the planner client")?;
    let fetcher = KeywordFetcher::new(fetcher).context("Failed to create the keyword client")?;

    let options = PlanOptions {
        inputs,
        aggregate,
        export,
        show_progress_bars: !quiet,
    };
    let outcome = execute_plan(options, &planner, &fetcher, progress.clone()).await?;

    notify(PlanEvent::Stage(PlanStage::Report));
    print!("{}", generate_summary_report(&outcome.summary, &outcome.output));
    if !quiet {
        println!("{} All keyword research complete.", "✓".green().bold());
    }

    Ok(())
}
