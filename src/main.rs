use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chatterm::api::{ChatBackend, HttpChatApi};
use chatterm::app::ChatApp;
use chatterm::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS};
use chatterm::error::ChatError;
use chatterm::feed::MessageFeed;
use chatterm::render;
use chatterm::session::SessionGate;
use chatterm::store::{CredentialStore, FileCredentialStore};
use chatterm::surface::{Notice, Surface, TerminalSurface};
use clap::{Parser, Subcommand};
use dialoguer::Password;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chatterm", about = "Terminal client for the chat service")]
struct Cli {
    #[arg(long, env = "CHAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "CHAT_CREDENTIAL_FILE")]
    credential_file: Option<PathBuf>,

    #[arg(long, env = "CHAT_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    #[arg(long, env = "CHAT_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token.
    Login {
        user: String,
        #[arg(long, env = "CHAT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and log in.
    Signup {
        user: String,
        #[arg(long, env = "CHAT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Validate the stored session.
    Status,
    /// Fetch and print the message list once.
    Messages {
        #[arg(long, default_value_t = false)]
        html: bool,
    },
    /// Send one message.
    Send {
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Interactive session: live feed plus line input.
    Chat,
}

struct Context {
    config: ClientConfig,
    backend: Arc<dyn ChatBackend>,
    store: Arc<dyn CredentialStore>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = match ClientConfig::new(
        &cli.base_url,
        cli.credential_file,
        cli.poll_interval_ms,
        cli.request_timeout_secs,
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let backend: Arc<dyn ChatBackend> = match HttpChatApi::new(&config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let store: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(config.credential_path.clone()));
    let ctx = Context { config, backend, store };

    let result = match cli.command {
        Command::Login { user, password } => run_login(&ctx, &user, password, false).await,
        Command::Signup { user, password } => run_login(&ctx, &user, password, true).await,
        Command::Logout => run_logout(&ctx).await,
        Command::Status => run_status(&ctx).await,
        Command::Messages { html } => run_messages(&ctx, html).await,
        Command::Send { content } => run_send(&ctx, &content.join(" ")).await,
        Command::Chat => run_chat(&ctx).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Already shown on the surface; keep the detail in the log.
            tracing::debug!(code = e.code(), error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn session_gate(ctx: &Context, surface: Arc<dyn Surface>) -> SessionGate {
    SessionGate::new(ctx.backend.clone(), ctx.store.clone(), surface)
}

async fn run_login(ctx: &Context, user: &str, password: Option<String>, signup: bool) -> Result<(), ChatError> {
    let surface: Arc<dyn Surface> = Arc::new(TerminalSurface::new());
    let password = match password {
        Some(password) => password,
        None => read_password(surface.as_ref()).await?,
    };
    let mut gate = session_gate(ctx, surface);
    let credential = if signup {
        gate.signup(user, &password).await?
    } else {
        gate.login(user, &password).await?
    };
    println!("logged in as {}", credential.username);
    Ok(())
}

async fn run_logout(ctx: &Context) -> Result<(), ChatError> {
    session_gate(ctx, Arc::new(TerminalSurface::new())).logout().await
}

async fn run_status(ctx: &Context) -> Result<(), ChatError> {
    let mut gate = session_gate(ctx, Arc::new(TerminalSurface::new()));
    match gate.restore().await.credential() {
        Some(credential) => {
            println!("logged in as {}", credential.username);
            Ok(())
        }
        None => Err(ChatError::Auth("not logged in".to_owned())),
    }
}

async fn run_messages(ctx: &Context, html: bool) -> Result<(), ChatError> {
    let surface: Arc<dyn Surface> =
        Arc::new(if html { TerminalSurface::notices_only() } else { TerminalSurface::new() });
    require_session(ctx, surface.clone()).await?;

    let mut feed = MessageFeed::new(ctx.backend.clone(), ctx.store.clone(), surface.clone());
    if let Err(e) = feed.poll().await {
        surface.notify(&Notice::error(format!("Refresh failed: {e}")));
        return Err(e);
    }
    if html {
        println!("{}", render::render_html(feed.messages()));
    }
    Ok(())
}

async fn run_send(ctx: &Context, content: &str) -> Result<(), ChatError> {
    let surface: Arc<dyn Surface> = Arc::new(TerminalSurface::new());
    require_session(ctx, surface.clone()).await?;
    MessageFeed::new(ctx.backend.clone(), ctx.store.clone(), surface).send(content).await
}

async fn run_chat(ctx: &Context) -> Result<(), ChatError> {
    let surface: Arc<dyn Surface> = Arc::new(TerminalSurface::full_screen());
    let mut app = ChatApp::new(ctx.backend.clone(), ctx.store.clone(), surface, ctx.config.poll_interval);
    app.run(BufReader::new(tokio::io::stdin())).await
}

async fn require_session(ctx: &Context, surface: Arc<dyn Surface>) -> Result<(), ChatError> {
    if session_gate(ctx, surface).restore().await.is_authenticated() {
        Ok(())
    } else {
        Err(ChatError::Auth("not logged in".to_owned()))
    }
}

/// Prompt without echo on a terminal; read one line when stdin is piped.
async fn read_password(surface: &dyn Surface) -> Result<String, ChatError> {
    let read = if std::io::stdin().is_terminal() {
        tokio::task::spawn_blocking(|| Password::new().with_prompt("password").interact())
            .await
            .map_err(|e| ChatError::Input(e.to_string()))?
            .map_err(|e| ChatError::Input(e.to_string()))
    } else {
        read_password_line(BufReader::new(tokio::io::stdin())).await
    };
    read.inspect_err(|e| surface.notify(&Notice::error(format!("Could not read password: {e}"))))
}

async fn read_password_line<R: AsyncBufRead + Unpin>(mut reader: R) -> Result<String, ChatError> {
    let mut line = String::new();
    reader.read_line(&mut line).await.map_err(|e| ChatError::Input(e.to_string()))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
