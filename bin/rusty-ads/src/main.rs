//! # Rusty-Ads Binary
//!
//! Loads configuration, opens the configured document store and media
//! storage, then either prints the ad feed (newest first) or publishes one ad.

use std::path::PathBuf;
use std::sync::Arc;

use ads_app::{AdForm, AdsContext, DocumentAdRepo, FeedController, FeedState};
use ads_config::AppConfig;
use ads_core::{AdRepo, ChatId, ChatService, LocalMediaRef, MediaPicker, StaticIdentity, UserId};
use anyhow::bail;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[cfg(feature = "db-sqlite")]
use ads_db_sqlite::SqliteDocumentStore;
#[cfg(feature = "storage-local")]
use ads_storage_local::{FsMediaSource, LocalBlobStore};

#[cfg(not(feature = "db-sqlite"))]
compile_error!("rusty-ads needs a document store backend; enable the `db-sqlite` feature");
#[cfg(not(feature = "storage-local"))]
compile_error!("rusty-ads needs a media backend; enable the `storage-local` feature");

/// Characters of the description shown per row.
const PREVIEW_CHARS: usize = 50;

/// Classifieds from the command line.
#[derive(Parser)]
#[command(name = "rusty-ads", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the ad feed, newest first. The default.
    Feed,
    /// Publish an ad.
    Post(PostArgs),
}

#[derive(clap::Args)]
struct PostArgs {
    /// Author of the ad.
    #[arg(long)]
    user: String,

    #[arg(long)]
    title: String,

    #[arg(long)]
    description: String,

    /// "Real estate", "Work and business" or "Mobile and computer".
    #[arg(long)]
    category: String,

    /// "sale" or "buy".
    #[arg(long = "type")]
    ad_type: String,

    #[arg(long)]
    city: String,

    /// Local file to upload and attach to the ad.
    #[arg(long)]
    media: Option<PathBuf>,
}

/// "Picks" the file given on the command line, if any.
struct ArgPicker(Option<LocalMediaRef>);

#[async_trait]
impl MediaPicker for ArgPicker {
    async fn pick(&self) -> anyhow::Result<Option<LocalMediaRef>> {
        Ok(self.0.clone())
    }
}

/// The command line has no chat backend.
struct NoChat;

#[async_trait]
impl ChatService for NoChat {
    async fn create_chat(&self, _participant: &UserId) -> anyhow::Result<ChatId> {
        bail!("chat is not available from the command line")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load()?;
    ads_config::try_init_tracing(&config.log)?;

    #[cfg(feature = "db-sqlite")]
    let store = Arc::new(SqliteDocumentStore::new(&config.database.url).await?);

    info!(
        database = %config.database.url,
        media_root = %config.media.root,
        country = %config.ads.country,
        "rusty-ads starting"
    );

    let ctx = context(&config, Arc::new(DocumentAdRepo::new(store)), args.command.as_ref());

    match args.command {
        Some(Command::Post(post)) => publish(&ctx, post).await,
        Some(Command::Feed) | None => print_feed(&ctx).await,
    }
}

/// Wires the configured storage and country into the controllers. `post`
/// signs in as its author and offers its `--media` file to the picker.
fn context(config: &AppConfig, repo: Arc<dyn AdRepo>, command: Option<&Command>) -> AdsContext {
    let (identity, picker) = match command {
        Some(Command::Post(post)) => (
            StaticIdentity::signed_in(post.user.as_str()),
            ArgPicker(
                post.media
                    .as_ref()
                    .map(|path| LocalMediaRef::new(path.display().to_string())),
            ),
        ),
        _ => (StaticIdentity::anonymous(), ArgPicker(None)),
    };

    AdsContext::new(
        repo,
        Arc::new(picker),
        Arc::new(FsMediaSource),
        Arc::new(LocalBlobStore::new(&config.media.root, &config.media.url_prefix)),
        Arc::new(NoChat),
        Arc::new(identity),
    )
    .with_country(&config.ads.country)
}

async fn publish(ctx: &AdsContext, args: PostArgs) -> anyhow::Result<()> {
    let creation = ctx.creation()?;

    if args.media.is_some() {
        creation.pick_media().await?;
        let url = creation.upload_media().await?;
        info!(url = %url, "media uploaded");
    }

    creation.update_form(|form| {
        *form = AdForm {
            title: args.title,
            description: args.description,
            category: args.category,
            ad_type: args.ad_type,
            city: args.city,
        }
    });
    let result = creation.submit().await;
    creation.dispose();

    let id = result?;
    println!("{id}");
    Ok(())
}

async fn print_feed(ctx: &AdsContext) -> anyhow::Result<()> {
    let feed = ctx.feed();
    feed.mount().await;
    let state = feed.state();
    feed.dispose();

    if let Some(message) = state.error() {
        error!("feed could not be loaded");
        bail!("{message}");
    }
    print!("{}", render(&feed, &state));
    Ok(())
}

fn render(feed: &FeedController, state: &FeedState) -> String {
    if state.is_empty() {
        return "No ads yet.\n".to_string();
    }

    let mut out = format!("{}\n", state.count_label());
    for ad in &state.ads {
        out.push_str(&format!(
            "{:>8}  {} [{} / {}] {}, {}\n          {}\n",
            feed.format_relative_age(ad.created_at),
            ad.title,
            ad.class_name,
            ad.type_name,
            ad.city,
            ad.country,
            ad.preview(PREVIEW_CHARS),
        ));
    }
    out
}
