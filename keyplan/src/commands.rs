use crate::CLAP_STYLING;
use clap::arg;
use keyplan_client::planner::{DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL};
use keyplan_client::keywords::DEFAULT_LOCALE;
use keyplan_core::config::DEFAULT_OUTPUT_FILE;
use url::Url;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("keyplan")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("keyplan")
        .about("Build an SEO keyword plan for a topic and export it to a spreadsheet")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-t --"topic" <TOPIC>)
                .required(false)
                .env("KEYPLAN_TOPIC")
                .help("Main topic or keyword (prompted when absent)"),
        )
        .arg(
            arg!(-m --"max-children" <N>)
                .required(false)
                .env("KEYPLAN_MAX_CHILDREN")
                .help("Max number of child pages, 1-50 (prompted when absent, default 10)"),
        )
        .arg(
            arg!(-p --"pages" <PAGES>)
                .required(false)
                .env("KEYPLAN_PAGES")
                .help("Extra pages to include, separated by ',' or ';' (prompted when absent)"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Spreadsheet to write")
                .default_value(DEFAULT_OUTPUT_FILE),
        )
        .arg(
            arg!(-l --"locale" <LOCALE>)
                .required(false)
                .help("Locale sent to the keyword API")
                .default_value(DEFAULT_LOCALE),
        )
        .arg(
            arg!(--"model" <MODEL>)
                .required(false)
                .env("KEYPLAN_MODEL")
                .help("Chat completion model used to plan pages")
                .default_value(DEFAULT_MODEL),
        )
        .arg(
            arg!(--"openai-api-key" <KEY>)
                .required(false)
                .env("OPENAI_API_KEY")
                .hide_env_values(true)
                .help("OpenAI API key"),
        )
        .arg(
            arg!(--"openai-base-url" <URL>)
                .required(false)
                .env("OPENAI_BASE_URL")
                .help("Base URL of the chat completion API")
                .value_parser(clap::value_parser!(Url))
                .default_value(DEFAULT_OPENAI_BASE_URL),
        )
        .arg(
            arg!(--"keywords-api-key" <KEY>)
                .required(false)
                .env("KWRDS_API_KEY")
                .hide_env_values(true)
                .help("Keyword volume API key"),
        )
        .arg(
            arg!(--"keywords-url" <URL>)
                .required(false)
                .env("KWRDS_API_URL")
                .help("Keyword volume API endpoint")
                .value_parser(clap::value_parser!(Url)),
        )
        .arg(
            arg!(--"dedupe-sheet-names")
                .required(false)
                .help("Add (2), (3), ... to page sheets whose names collide instead of overwriting")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-y --"no-prompt")
                .required(false)
                .help("Never prompt; inputs come from flags and environment only")
                .action(clap::ArgAction::SetTrue),
        )
}
