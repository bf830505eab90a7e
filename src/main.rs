use std::io::Write as _;

use banter::config::Config;
use banter::session::ChatSession;
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line options.
#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    /// Print version and exit
    show_version: bool,
    /// Override the backend base URL
    base_url: Option<String>,
    /// Use the one-shot endpoint instead of streaming
    no_stream: bool,
}

fn parse_args<I>(args: I) -> CliOptions
where
    I: Iterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => options.show_version = true,
            "--url" => options.base_url = args.next(),
            "--no-stream" => options.no_stream = true,
            _ => {}
        }
    }
    options
}

fn print_help() {
    println!("Commands:");
    println!("  /models       list available models");
    println!("  /model <id>   switch model");
    println!("  /status       show backend status");
    println!("  /clear        clear the conversation");
    println!("  /quit         exit");
    println!("Anything else is sent to the assistant.");
}

async fn run_command(session: &mut ChatSession, input: &str) {
    match input {
        "/help" => print_help(),
        "/clear" => {
            session.clear();
            println!("Conversation cleared.");
        }
        "/models" => match session.client().fetch_models().await {
            Ok(listing) => {
                for model in listing.models {
                    match model.description {
                        Some(description) => println!("  {} - {}", model.id, description),
                        None => println!("  {}", model.id),
                    }
                }
            }
            Err(e) => println!("✗ Could not fetch models: {}", e),
        },
        "/status" => match session.client().status().await {
            Ok(status) => println!("  {}: {}", status.status, status.message),
            Err(e) => println!("✗ Could not fetch status: {}", e),
        },
        _ => {
            if let Some(model) = input.strip_prefix("/model ") {
                session.set_model(model.trim());
                println!("Model set to {}.", session.model());
            } else {
                println!("Unknown command: {} (try /help)", input);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let options = parse_args(std::env::args());
    if options.show_version {
        println!("banter {}", VERSION);
        return Ok(());
    }

    let mut config = Config::load();
    if let Some(url) = options.base_url {
        config.base_url = url;
    }

    let mut session = ChatSession::new(&config);

    println!("banter {} - {}", VERSION, config.base_url);
    match session.client().health_check().await {
        Ok(true) => println!("✓ Backend responding"),
        Ok(false) => println!("✗ Backend unhealthy, requests may fail"),
        Err(_) => println!("✗ Backend not reachable, requests may fail"),
    }
    println!("Type a message, /help for commands.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" || input == "/exit" {
            break;
        }
        if input.starts_with('/') {
            run_command(&mut session, input).await;
            continue;
        }

        if options.no_stream {
            match session.send(input).await {
                Ok(message) => {
                    println!("{}", message.content);
                    if let Some(model) = message.model_used {
                        println!("[{}]", model);
                    }
                }
                Err(e) => println!("✗ {}", e),
            }
        } else {
            let result = session
                .send_streaming(input, |fragment| {
                    print!("{}", fragment);
                    let _ = std::io::stdout().flush();
                })
                .await;
            match result {
                Ok(_) => println!(),
                Err(e) => println!("\n✗ {}", e),
            }
        }
    }

    Ok(())
}
