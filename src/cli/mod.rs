//! Command-line interface parsing and handling
//!
//! This module parses arguments, sets up logging and dispatches to the
//! interactive chat, the one-shot `say` command or the config editors.

pub mod say;


use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::core::config::defaults::CONFIG_KEYS;
use crate::core::config::Config;
use crate::core::transport::{ChatTransport, HttpTransport};
use crate::logging::init_tracing;
use crate::ui::chat_loop::{bootstrap_session, run_chat};
use crate::utils::clipboard::SystemClipboard;
use crate::utils::url::validate_server_url;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", ",
    env!("VERGEN_GIT_SHA"),
    ")"
);

#[derive(Parser)]
#[command(name = "chatbox")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal chat front-end for form-based chat servers")]
#[command(
    long_about = "Chatbox is a full-screen terminal chat window for a server that accepts \
messages as form posts and answers with a bot reply. Replies may contain markup; code \
blocks get a language badge and a copy control.\n\n\
Controls:\n\
  Enter             Send the message\n\
  Alt+Enter         Insert a new line\n\
  Tab/Shift+Tab     Select a copy control; Enter copies it\n\
  Ctrl+Y            Copy the selected (or newest) block\n\
  Ctrl+L            Clear the conversation\n\
  PageUp/PageDown   Scroll the transcript\n\
  Ctrl+C            Quit\n\n\
Environment Variables:\n\
  CHATBOX_LOG       tracing filter for --debug-log output (default chatbox=info)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server base URL, overriding the config file
    #[arg(short = 's', long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Append the conversation to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub debug_log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send one message and print the reply
    Say {
        /// Message text (joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Ask the server to forget the conversation
    Clear,
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (multiple words are joined)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Option<Vec<String>>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Chat);
    init_tracing(
        args.debug_log.as_deref(),
        matches!(command, Commands::Chat),
    )?;

    match command {
        Commands::Chat => {
            let config = Config::load()?;
            let session = bootstrap_session(&config, args.server.as_deref(), args.log)?;
            run_chat(session, Arc::new(SystemClipboard)).await
        }
        Commands::Say { prompt } => say::run_say(prompt, args.server, args.log).await,
        Commands::Clear => {
            let config = Config::load()?;
            let endpoints = config.endpoints(args.server.as_deref());
            validate_server_url(&endpoints.base_url)?;
            let transport = HttpTransport::new(endpoints, config.request_timeout())?;
            match transport.clear().await {
                Ok(()) => {
                    println!("✅ Conversation cleared");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("❌ Clear failed: {err}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match value.filter(|parts| !parts.is_empty()) {
                Some(parts) => {
                    let value = parts.join(" ");
                    if let Err(err) = config.set_value(&key, &value) {
                        eprintln!("❌ {err}");
                        eprintln!("Known keys: {}", CONFIG_KEYS.join(", "));
                        std::process::exit(1);
                    }
                    config.save()?;
                    println!("✅ Set {key} to: {value}");
                }
                None => config.print_all(),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            if let Err(err) = config.unset_value(&key) {
                eprintln!("❌ {err}");
                eprintln!("Known keys: {}", CONFIG_KEYS.join(", "));
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Config => {
            Config::load()?.print_all();
            Ok(())
        }
    }
}
