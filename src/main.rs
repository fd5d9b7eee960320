use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chatstream::client::HttpBackend;
use chatstream::config::ClientConfig;
use chatstream::session::ChatSession;
use chatstream::store::{ConversationStore, FileStorage};

#[derive(Parser, Debug)]
#[command(name = "chatstream", about = "Streaming chat client", version)]
struct Args {
    /// Path to a TOML config file; falls back to environment variables
    #[arg(short, long)]
    config: Option<String>,

    /// Override the assistant endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Override the user identifier
    #[arg(long)]
    user: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint.url = endpoint;
    }
    if let Some(user) = args.user {
        config.user = user;
    }
    config.validate()?;

    let backend = Arc::new(HttpBackend::new(config.endpoint.clone())?);
    let store = ConversationStore::new(Box::new(FileStorage::new(&config.storage_path)));
    let mut session = ChatSession::new(backend, store, config.user.clone());

    println!("chatstream — /new, /list, /select <id>, /delete <id>, /quit");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" => break,
            "/new" => {
                session.start_new_chat();
                println!("Started a new chat");
            }
            "/list" => {
                let view = session.snapshot();
                for (id, title) in &view.conversations {
                    let marker = if view.active_id.as_deref() == Some(id) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {}  {}", marker, id, title);
                }
            }
            _ if input.starts_with("/select ") => {
                let id = input.trim_start_matches("/select ").trim();
                if let Err(e) = session.select_conversation(id) {
                    eprintln!("error: {}", e);
                }
            }
            _ if input.starts_with("/delete ") => {
                let id = input.trim_start_matches("/delete ").trim();
                session
                    .delete_conversation(id)
                    .context("failed to delete conversation")?;
            }
            _ => {
                // The view carries the user-facing error string
                let _ = session.submit(input).await;
                let view = session.snapshot();
                if let Some(err) = &view.error {
                    eprintln!("error: {}", err);
                } else if let Some(reply) = view.messages.last() {
                    println!("{}", reply.content);
                }
            }
        }
    }

    Ok(())
}
