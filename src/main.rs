use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use seasoning_face::{commands, config, logging, Gender, Language};

/// Which seasoning is your face? Upload a face photo, get the closest of
/// nine seasonings with a shareable top-three breakdown.
#[derive(Parser, Debug)]
#[command(name = "seasoning-face")]
#[command(about = "Classify a face photo into one of nine seasonings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a face photo and print the seasoning verdict
    Analyze {
        /// Path to a JPEG or PNG photo (5 MiB max)
        photo: PathBuf,

        /// Demographic model to use; persisted for next time
        #[arg(short, long, value_parser = Gender::from_str)]
        gender: Option<Gender>,

        /// Interface language for this run; persisted for next time
        #[arg(short, long, value_parser = Language::from_str)]
        lang: Option<Language>,
    },
    /// Show the stored result, or import one from a share link
    Result {
        /// Share link, query string, or raw `code:percent` payload
        #[arg(long)]
        link: Option<String>,
    },
    /// Model cache maintenance
    Model {
        #[command(subcommand)]
        command: ModelCommand,
    },
    /// Pick the interface language (ja, ko, en, zh)
    SetLanguage {
        #[arg(value_parser = Language::from_str)]
        language: Language,
    },
    /// Pick the demographic model (male, female)
    SetGender {
        #[arg(value_parser = Gender::from_str)]
        gender: Gender,
    },
    /// Print the stored settings and result
    Show,
}

#[derive(Subcommand, Debug)]
enum ModelCommand {
    /// Report cache state per demographic
    Status {
        #[arg(short, long, value_parser = Gender::from_str)]
        gender: Option<Gender>,
    },
    /// Fetch model files into the local cache ahead of time
    Download {
        #[arg(short, long, value_parser = Gender::from_str)]
        gender: Option<Gender>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_config()?;
    logging::init_tracing(&config)?;

    match cli.command {
        Command::Analyze { photo, gender, lang } => {
            commands::analyze::run(&config, &photo, gender, lang).await?
        }
        Command::Result { link } => commands::result::run(&config, link.as_deref())?,
        Command::Model { command } => match command {
            ModelCommand::Status { gender } => commands::model::status(&config, gender)?,
            ModelCommand::Download { gender } => commands::model::download(&config, gender).await?,
        },
        Command::SetLanguage { language } => commands::settings::set_language(&config, language)?,
        Command::SetGender { gender } => commands::settings::set_gender(&config, gender)?,
        Command::Show => commands::settings::show(&config)?,
    }

    Ok(())
}
