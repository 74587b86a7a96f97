use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "imf",
    about = "Inspect IMF packages: resolve Asset Maps and locate track files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with package settings
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open a package and list every asset of its Asset Map
    Assets(AssetsArgs),
    /// Resolve one asset id to its location
    Locate(LocateArgs),
    /// Parse an Asset Map on its own and report what it lists
    Check(CheckArgs),
}

#[derive(Args)]
pub struct AssetsArgs {
    /// Composition Playlist path or URL
    pub cpl: String,
    /// Asset Map to use instead of ASSETMAP.xml next to the CPL
    #[arg(long)]
    pub assetmap: Option<String>,
}

#[derive(Args)]
pub struct LocateArgs {
    pub cpl: String,
    /// Asset id (hyphenated, optionally prefixed with urn:uuid:)
    pub id: String,
    #[arg(long)]
    pub assetmap: Option<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Asset Map path or URL
    pub assetmap: String,
    /// Directory to resolve chunk paths against (default: the Asset Map's)
    #[arg(long)]
    pub base: Option<String>,
}
