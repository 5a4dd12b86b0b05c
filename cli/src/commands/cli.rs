use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    Text,
    Jsonl,
    /// Run events only go to the log.
    None,
}

impl StreamFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Jsonl => "jsonl",
            Self::None => "none",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dossier", version, about = "Multi-agent report pipelines")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.dossier/config.toml or ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides `executor.stream_format`.
    #[arg(long, value_enum, global = true)]
    pub stream_format: Option<StreamFormat>,

    /// Overrides `output.directory`.
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct MarketArgs {
    #[arg(long)]
    pub sector: String,

    #[arg(long)]
    pub region: String,

    #[arg(long)]
    pub company: String,

    /// Extra template variables (KEY=VALUE). Can be specified multiple times.
    #[arg(long = "var", action = clap::ArgAction::Append)]
    pub vars: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ContractArgs {
    /// Extracted contract text; pages separated by form feeds.
    #[arg(long)]
    pub text: PathBuf,

    /// Name shown in the title; defaults to the file name.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RenderArgs {
    /// Markdown file to render.
    pub input: PathBuf,

    /// Document title; defaults to the file stem.
    #[arg(long)]
    pub title: Option<String>,

    /// Append the charts configured under `report.charts`.
    #[arg(long, default_value_t = false)]
    pub charts: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    /// market | contract
    pub preset: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Market analysis report for a sector.
    Market(MarketArgs),
    /// Contract analysis report from extracted contract text.
    Contract(ContractArgs),
    /// Render an existing Markdown file without calling any service.
    Render(RenderArgs),
    /// Print the validated execution order of a preset.
    Plan(PlanArgs),
}
