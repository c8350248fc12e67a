use clap::{Parser, Subcommand};
use pressroom::auth::{CredentialVerifier, StaticCredentialVerifier};
use pressroom::config::Settings;
use pressroom::registry::{self, PriceUpdate};
use pressroom::storage::AssetUploader;
use pressroom::store::{ArticleStore, DisconnectedStore, SqliteStore};
use pressroom::{article, publish, server};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Release builds report the bare crate version; anything else carries a
/// `-dev@<hash>` suffix so a misbehaving deployment can be traced to a
/// commit. Leaked once at startup, called exactly once.
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    let hash = env!("GIT_HASH");
    if hash.is_empty() {
        concat!(env!("CARGO_PKG_VERSION"), "-dev@unknown")
    } else {
        Box::leak(format!("{}-dev@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "pressroom")]
#[command(about = "Publication backend for the news desk")]
#[command(long_about = "\
Publication backend for the news desk

Publishes articles (with AVIF lead images hosted in object storage) and keeps
the gold/silver price registry current. All deployment knobs are environment
variables:

  R2_ACCOUNT_ID / R2_ACCESS_KEY_ID / R2_SECRET_ACCESS_KEY
  R2_BUCKET_NAME / R2_PUBLIC_URL     object storage (sign + upload)
  DATABASE_PATH / DATABASE_AUTH_TOKEN  article store (absent = disconnected)
  ADMIN_ID / ADMIN_PASSWORD            publishing credentials

Missing storage credentials degrade the sign endpoint to HTTP 500; a missing
database path degrades the store to read-empty/write-fail. The process keeps
running either way — run 'pressroom status' to see what is wired up.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the sign-upload endpoint
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8787")]
        listen: SocketAddr,
    },
    /// Publish one article
    Publish(PublishArgs),
    /// Price registry operations
    Prices {
        #[command(subcommand)]
        command: PricesCommand,
    },
    /// Report store connectivity and configuration
    Status,
}

#[derive(clap::Args)]
struct PublishArgs {
    /// Headline
    #[arg(long)]
    title: String,
    /// Article body (text, read verbatim)
    #[arg(long)]
    body: String,
    /// Category label, e.g. "Market Analysis"
    #[arg(long, default_value = "Daily Updates")]
    category: String,
    #[arg(long)]
    summary: Option<String>,
    /// Comma-separated SEO keywords
    #[arg(long)]
    focus_keywords: Option<String>,
    /// Lead image file to transcode and upload
    #[arg(long)]
    image: Option<PathBuf>,
    /// Previously hosted image URL to reuse
    #[arg(long)]
    existing_image_url: Option<String>,
    /// Skip transcode + upload and persist directly (degraded-mode retry)
    #[arg(long)]
    skip_asset_upload: bool,
    /// Sign-upload endpoint to request upload credentials from
    #[arg(long, default_value = "http://127.0.0.1:8787/api/sign-upload")]
    sign_endpoint: String,
    /// Admin id (defaults to ADMIN_ID)
    #[arg(long)]
    id: Option<String>,
    /// Admin password (defaults to ADMIN_PASSWORD)
    #[arg(long)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum PricesCommand {
    /// Append today's prices to the registry
    Set {
        #[arg(long)]
        gold_24k: f64,
        #[arg(long)]
        gold_22k: f64,
        #[arg(long)]
        silver: f64,
    },
    /// Print the most recent snapshot
    Latest,
    /// Print the recent history window, oldest first
    History {
        #[arg(long, default_value_t = registry::DEFAULT_HISTORY_WINDOW)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Serve { listen } => {
            server::serve(settings, listen).await?;
        }
        Command::Publish(args) => {
            let store = open_store(&settings)?;
            let verifier = StaticCredentialVerifier::new(&settings.admin);
            let id = args
                .id
                .or_else(|| settings.admin.id.clone())
                .unwrap_or_default();
            let password = args
                .password
                .or_else(|| settings.admin.password.clone())
                .unwrap_or_default();
            let principal = verifier.verify(&id, &password)?;

            let image = match &args.image {
                Some(path) => Some(std::fs::read(path)?),
                None => None,
            };
            let request = publish::PublishRequest {
                title: args.title,
                summary: args.summary,
                body: args.body,
                category: article::Category::from_label(&args.category),
                focus_keywords: args.focus_keywords,
                image,
                existing_image_url: args.existing_image_url,
                skip_asset_upload: args.skip_asset_upload,
            };

            let uploader = AssetUploader::new(args.sign_endpoint);
            let article = publish::publish(store.as_ref(), &uploader, &principal, request).await?;
            println!("Published: {} ({})", article.title, article.slug);
            if let Some(url) = &article.featured_image {
                println!("Lead image: {url}");
            }
        }
        Command::Prices { command } => {
            let store = open_store(&settings)?;
            match command {
                PricesCommand::Set {
                    gold_24k,
                    gold_22k,
                    silver,
                } => {
                    registry::append(
                        store.as_ref(),
                        PriceUpdate {
                            gold_24k,
                            gold_22k,
                            silver,
                        },
                    )
                    .await?;
                    println!("Prices recorded");
                }
                PricesCommand::Latest => match registry::latest(store.as_ref()).await? {
                    Some(snapshot) => print_snapshot(&snapshot),
                    None => println!("No prices recorded yet"),
                },
                PricesCommand::History { limit } => {
                    let window = registry::history(store.as_ref(), limit).await?;
                    if window.is_empty() {
                        println!("No prices recorded yet");
                    }
                    for snapshot in &window {
                        print_snapshot(snapshot);
                    }
                }
            }
        }
        Command::Status => {
            let store = open_store(&settings)?;
            let status = store.status();
            println!(
                "Store:    {} ({})",
                if status.is_connected {
                    "connected"
                } else {
                    "disconnected"
                },
                status.provider
            );
            println!("  url:    {}", detected(status.url_detected));
            println!("  token:  {}", detected(status.token_detected));
            println!(
                "Storage:  {}",
                match settings.storage_credentials() {
                    Ok(creds) => format!("configured (bucket {})", creds.bucket),
                    Err(_) => "missing credentials".to_string(),
                }
            );
        }
    }

    Ok(())
}

/// Open the configured store, or a disconnected stand-in when no database
/// path is set. The stand-in still reports what the environment did provide.
fn open_store(settings: &Settings) -> Result<Box<dyn ArticleStore>, Box<dyn std::error::Error>> {
    let token_detected = settings.database.auth_token.is_some();
    match &settings.database.path {
        Some(path) => Ok(Box::new(SqliteStore::open(path, token_detected)?)),
        None => Ok(Box::new(DisconnectedStore::new(token_detected))),
    }
}

fn print_snapshot(snapshot: &article::PriceSnapshot) {
    println!(
        "{}  24k {}  22k {}  silver {}",
        snapshot.timestamp, snapshot.gold_24k, snapshot.gold_22k, snapshot.silver
    );
}

fn detected(flag: bool) -> &'static str {
    if flag { "detected" } else { "not set" }
}
