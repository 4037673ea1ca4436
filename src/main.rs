use clap::{
    Args, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporlplay::{
    cli::{self, PlayTarget},
    config, error, logging, utils, warning,
};

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
    /// Sign in with Spotify
    Auth,

    /// Forget the stored credential
    Logout,

    /// Show token expiry
    Token(TokenOptions),

    /// Play previews of a track, album, playlist or recommendations
    Play(PlayOptions),

    /// New releases, featured playlists and recommendations
    Home,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct TokenOptions {
    /// Obtain a valid token, refreshing it if it is about to expire
    #[clap(long)]
    pub check: bool,
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PlayOptions {
    /// Track id, URI or link
    #[clap(long)]
    pub track: Option<String>,

    /// Album id, URI or link
    #[clap(long)]
    pub album: Option<String>,

    /// Playlist id, URI or link
    #[clap(long)]
    pub playlist: Option<String>,

    /// Queue recommendations seeded with random genres
    #[clap(long)]
    pub recommended: bool,
}

impl PlayOptions {
    fn target(self) -> Option<PlayTarget> {
        if let Some(track) = self.track {
            return utils::parse_spotify_id(&track, "track").map(PlayTarget::Track);
        }
        if let Some(album) = self.album {
            return utils::parse_spotify_id(&album, "album").map(PlayTarget::Album);
        }
        if let Some(playlist) = self.playlist {
            return utils::parse_spotify_id(&playlist, "playlist").map(PlayTarget::Playlist);
        }
        self.recommended.then_some(PlayTarget::Recommended)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warning!("Logging disabled: {}", e);
            None
        }
    };

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Logout => cli::logout().await,
        Command::Token(opt) => cli::token(opt.check).await,
        Command::Play(opt) => match opt.target() {
            Some(target) => cli::play(target).await,
            None => error!("Not a valid Spotify id, URI or link."),
        },
        Command::Home => cli::home().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
