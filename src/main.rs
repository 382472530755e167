// Recovery Coach - Crisis-aware recovery support chat
// Main entry point

use anyhow::Result;
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::sync::Arc;
use tracing_subscriber::prelude::*;

use recovery_coach::cli::{format_helplines, ChatRepl, InputHandler};
use recovery_coach::coach::{load_detector, Coach};
use recovery_coach::config::{load_config, Config, ReplyMode};
use recovery_coach::crisis::ClassificationResult;
use recovery_coach::errors::api_key_missing_notice;
use recovery_coach::server::AppServer;
use recovery_coach::store::MemoryStore;

#[derive(Parser, Debug)]
#[command(name = "recovery-coach")]
#[command(about = "Crisis-aware recovery support chat", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Reply from the built-in template catalog instead of the AI service
    #[arg(long, global = true)]
    templates: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Bind address (default from config: 127.0.0.1:3001)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Classify a message and print the result
    Classify {
        text: String,
        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a single message and print the reply
    Query {
        text: String,
        #[arg(long, default_value = "cli")]
        user: String,
    },
    /// Interactive chat in the terminal
    Chat {
        #[arg(long, default_value = "local")]
        user: String,
    },
    /// List gambling helplines
    Helplines {
        /// ISO country code (US, UK, CA, AU)
        #[arg(long)]
        country: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::Serve { bind }) => {
            init_tracing("info");
            run_server(bind, args.templates).await
        }
        Some(Command::Classify { text, json }) => {
            init_tracing("warn");
            run_classify(&text, json)
        }
        Some(Command::Query { text, user }) => {
            init_tracing("warn");
            run_query(&text, &user, args.templates).await
        }
        Some(Command::Chat { user }) => {
            init_tracing("warn");
            run_chat(&user, args.templates).await
        }
        Some(Command::Helplines { country }) => {
            println!("{}", format_helplines(country.as_deref()));
            Ok(())
        }
        None => {
            init_tracing("warn");

            // Piped input is answered as a single message
            if !io::stdin().is_terminal() {
                let mut input = String::new();
                io::stdin().read_to_string(&mut input)?;
                if input.trim().is_empty() {
                    return Ok(());
                }
                return run_query(input.trim(), "cli", args.templates).await;
            }

            run_chat("local", args.templates).await
        }
    }
}

fn init_tracing(default_level: &str) {
    // Default level per command, overridable with RUST_LOG
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Bridge log crate → tracing (for dependencies using log crate)
    tracing_log::LogTracer::init().ok();
}

/// Load config, applying the --templates flag
fn load_runtime_config(templates: bool) -> Result<Config> {
    let mut config = load_config()?;
    if templates {
        config.chat.reply_mode = ReplyMode::Templates;
    }
    Ok(config)
}

fn build_coach(config: &Config) -> Result<Coach> {
    if config.chat.reply_mode == ReplyMode::Generative && config.ai.enabled && config.ai.api_key().is_none() {
        eprintln!("{}\n", api_key_missing_notice(&config.ai.provider));
    }

    let store = Arc::new(MemoryStore::new(config.chat.history_cap));
    Coach::from_config(config, store)
}

async fn run_server(bind: Option<String>, templates: bool) -> Result<()> {
    let mut config = load_runtime_config(templates)?;
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    config.validate()?;

    let coach = build_coach(&config)?;
    tracing::info!(
        reply_mode = ?config.chat.reply_mode,
        provider = coach.has_provider(),
        "Coach ready"
    );

    AppServer::new(coach, &config).serve().await
}

fn run_classify(text: &str, json: bool) -> Result<()> {
    let config = load_config()?;
    let result = load_detector(&config)?.classify(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_classification(&result);
    }
    Ok(())
}

fn print_classification(result: &ClassificationResult) {
    println!("risk level:       {}", result.risk_level);
    println!("suggested action: {}", display_or_dash(result.suggested_action.as_str()));
    println!("crisis:           {}", result.is_crisis);
    println!("urge:             {}", result.is_urge);
    if !result.matched_phrases.is_empty() {
        println!("matched phrases:  {}", result.matched_phrases.join(", "));
    }
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

async fn run_query(text: &str, user: &str, templates: bool) -> Result<()> {
    let config = load_runtime_config(templates)?;
    let coach = build_coach(&config)?;

    let reply = coach.respond(user, text).await;
    println!("{}", reply.reply);
    Ok(())
}

async fn run_chat(user: &str, templates: bool) -> Result<()> {
    let config = load_runtime_config(templates)?;
    let coach = build_coach(&config)?;

    let repl = ChatRepl::new(Arc::new(coach), user, config.chat.max_message_chars);
    let mut input = InputHandler::new()?;
    repl.run(&mut input).await
}
