mod core;
mod logging;
mod ui;

use std::{env, path::PathBuf, process, sync::Arc};
use tracing::{error, info};

use crate::core::{
    api::HttpTransport,
    config::{Config, SERVER_ENV},
    handler::{Outcome, QueryHandler, ResponseSlot},
};

const USAGE: &str = "usage: askline [--server URL] [-S QUESTION | QUESTION]

  -S QUESTION     ask once, print the answer and exit
  QUESTION        start the interface with the question pre-filled
  --server URL    question server base url (also ASKLINE_SERVER)
  -h, --help      show this help";

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    server: Option<String>,
    single_shot: Option<String>,
    initial_query: Option<String>,
    help: bool,
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => parsed.help = true,
            "--server" => {
                parsed.server = Some(iter.next().ok_or("--server needs a url")?);
            }
            "-S" => {
                // An absent question still goes through the handler and gets the prompt.
                parsed.single_shot = Some(iter.next().unwrap_or_default());
            }
            _ if parsed.initial_query.is_none() => parsed.initial_query = Some(arg),
            _ => return Err(format!("unexpected argument: {}", arg)),
        }
    }

    Ok(parsed)
}

/// Prints each display state on its own line.
struct StdoutSlot;

impl ResponseSlot for StdoutSlot {
    fn show(&mut self, text: &str) {
        println!("{}", text);
    }
}

#[tokio::main]
async fn main() {
    // Set up panic handler to restore terminal
    std::panic::set_hook(Box::new(|info| {
        use crossterm::{execute, terminal};
        let _ = terminal::disable_raw_mode();
        let _ = execute!(std::io::stdout(), terminal::LeaveAlternateScreen);
        eprintln!("{}", info);
    }));

    let args = match parse_args(env::args().skip(1).collect()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            process::exit(2);
        }
    };
    if args.help {
        println!("{}", USAGE);
        return;
    }

    let data_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("askline");
    let _log_guard = logging::init_logging(&data_dir);
    info!(version = env!("CARGO_PKG_VERSION"), "askline starting");

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load config");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    config.apply_server_override(args.server, env::var(SERVER_ENV).ok());

    let transport = HttpTransport::new(
        &config.server.base_url,
        &config.server.ask_path,
        config.server.timeout(),
    );
    info!(url = transport.url(), "question server");
    let handler = Arc::new(QueryHandler::with_messages(transport, config.text.messages()));

    if let Some(question) = args.single_shot {
        let outcome = handler.handle(&question, &mut StdoutSlot).await;
        if !matches!(outcome, Outcome::Answered(_)) {
            process::exit(1);
        }
        return;
    }

    if let Err(e) = ui::run_tui(&config, handler, args.initial_query).await {
        error!(error = %e, "tui failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, String> {
        parse_args(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn single_shot_with_server() {
        let parsed = args(&["--server", "http://faq:5000", "-S", "What is 2+2?"]).unwrap();
        assert_eq!(parsed.server.as_deref(), Some("http://faq:5000"));
        assert_eq!(parsed.single_shot.as_deref(), Some("What is 2+2?"));
        assert_eq!(parsed.initial_query, None);
    }

    #[test]
    fn bare_argument_prefills_tui() {
        let parsed = args(&["hello"]).unwrap();
        assert_eq!(parsed.initial_query.as_deref(), Some("hello"));
        assert_eq!(parsed.single_shot, None);
    }

    #[test]
    fn single_shot_without_question_is_empty() {
        assert_eq!(args(&["-S"]).unwrap().single_shot.as_deref(), Some(""));
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(args(&["--server"]).is_err());
        assert!(args(&["one", "two"]).is_err());
        assert!(args(&["--help"]).unwrap().help);
    }
}
