use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use domcascade::cli::args::Cli;
use domcascade::cli::commands::execute_command;
use domcascade::cli::output;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -d -d -d");
            LevelFilter::TRACE
        }
    };

    // Logs go to stderr so command output stays pipeable
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match filter {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domcascade::util::testing;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        testing::init_test_setup();
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn given_dispatch_args_when_parsing_then_handlers_collected() {
        let cli = Cli::try_parse_from([
            "domcascade",
            "dispatch",
            "page.json",
            "--at",
            "1.0.0",
            "-e",
            "click",
            "--on",
            "1.0.0:click",
            "--on",
            "1:click=stop",
        ])
        .expect("valid args");

        match cli.command {
            Some(domcascade::cli::Commands::Dispatch { handlers, at, .. }) => {
                assert_eq!(handlers.len(), 2);
                assert_eq!(at.to_string(), "1.0.0");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
