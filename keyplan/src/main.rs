use colored::Colorize;
use keyplan::{command_argument_builder, handle_plan, init_logging};
use keyplan_core::print_banner;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env is fine; flags and the real environment still apply.
    let _ = dotenvy::dotenv();

    let matches = command_argument_builder().get_matches();
    init_logging();

    if !matches.get_flag("quiet") {
        print_banner();
    }

    if let Err(e) = handle_plan(&matches).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        process::exit(1);
    }
}
