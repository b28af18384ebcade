use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use onrepeat::{
    cli, config, error,
    types::{PkceToken, TimeRange},
};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Add new top tracks to the playlist, creating it if needed
    Sync(SyncArgs),

    /// Show your current top tracks
    Top(TopArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SyncArgs {
    /// Playlist to keep in sync (defaults to ONREPEAT_PLAYLIST_NAME or "On Repeat Forever")
    #[clap(long)]
    name: Option<String>,

    /// Description used when the playlist is created
    #[clap(long)]
    description: Option<String>,

    /// Top tracks to add on every run
    #[clap(long, value_enum, default_value = "medium-term")]
    time_range: TimeRange,

    /// Top tracks to seed a newly created playlist with
    #[clap(long, value_enum, default_value = "long-term")]
    seed_time_range: TimeRange,

    /// Index new tracks are inserted at
    #[clap(long, default_value_t = 0, conflicts_with = "append")]
    position: u32,

    /// Append new tracks to the end instead of inserting them
    #[clap(long)]
    append: bool,

    /// Do not upload cover art when creating the playlist
    #[clap(long)]
    no_cover: bool,

    /// Only show what would be added
    #[clap(long)]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TopArgs {
    #[clap(long, value_enum, default_value = "medium-term")]
    time_range: TimeRange,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

impl SyncArgs {
    fn into_options(self) -> cli::SyncOptions {
        let cover_url = config::cover_url();
        cli::SyncOptions {
            playlist_name: self.name.unwrap_or_else(config::playlist_name),
            playlist_description: self
                .description
                .unwrap_or_else(config::playlist_description),
            time_range: self.time_range,
            seed_time_range: self.seed_time_range,
            position: (!self.append).then_some(self.position),
            cover_url: (!self.no_cover && !cover_url.is_empty()).then_some(cover_url),
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await
        }
        Command::Sync(args) => cli::sync(args.into_options()).await,
        Command::Top(args) => cli::top(args.time_range).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}
