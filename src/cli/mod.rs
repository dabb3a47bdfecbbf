pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::client::ProfileClient;

#[derive(Parser)]
#[command(name = "bento")]
#[command(about = "Bento CLI - manage a link-in-bio profile from the command line")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "BENTO_SERVER", default_value = "http://localhost:3000", help = "API base URL")]
    pub server: String,

    #[arg(long, global = true, env = "BENTO_TOKEN", hide_env_values = true, help = "Bearer token for write operations")]
    pub token: Option<String>,

    #[arg(long, short, global = true, env = "BENTO_USER", help = "Profile username")]
    pub user: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the profile and its blocks")]
    Show,

    #[command(about = "Add a link block")]
    AddLink {
        #[arg(help = "Block id")]
        id: String,
        #[arg(help = "Target URL")]
        url: String,
        #[arg(long, help = "Label shown on the block")]
        label: Option<String>,
        #[arg(long, help = "Logo URL")]
        logo: Option<String>,
        #[arg(long, help = "Background color")]
        color: Option<String>,
    },

    #[command(about = "Add a text block")]
    AddText {
        #[arg(help = "Block id")]
        id: String,
        #[arg(help = "Text content")]
        content: String,
    },

    #[command(about = "Add an image block from a local file")]
    AddImage {
        #[arg(help = "Block id")]
        id: String,
        #[arg(help = "Image file (png, jpg, gif, webp, svg, avif)")]
        file: std::path::PathBuf,
        #[arg(long, help = "Label shown on the block")]
        label: Option<String>,
    },

    #[command(about = "Remove a block by id")]
    Remove {
        #[arg(help = "Block id")]
        id: String,
    },

    #[command(about = "Set the display name (omit the value to clear it)")]
    DisplayName { value: Option<String> },

    #[command(about = "Set the bio (omit the value to clear it)")]
    Bio { value: Option<String> },

    #[command(about = "Upload an avatar from a local file")]
    Avatar {
        #[arg(help = "Image file")]
        file: std::path::PathBuf,
    },

    #[command(about = "Create the empty profile directly in the Postgres store (STORE_BACKEND=postgres)")]
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let username = cli
        .user
        .clone()
        .ok_or_else(|| anyhow::anyhow!("No username given, pass --user or set BENTO_USER"))?;

    if let Commands::Init = cli.command {
        return commands::init::handle(&username, cli.format).await;
    }

    let client = ProfileClient::new(&cli.server, username, cli.token.clone())?;
    commands::profile::handle(cli.command, client, cli.format).await
}
