//! form-preview - click through a branching form in the terminal

use std::path::PathBuf;

use anyhow::Context;
use branching_form::{DirLoader, FormConfig, FormController, Interaction, PageRegion};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "form-preview")]
#[command(about = "Load a branching form from a directory and drive it from stdin")]
#[command(version)]
struct Cli {
    /// Directory holding `templates/` and `config/`
    dir: PathBuf,

    /// JSON file overriding the form configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host page to render into (defaults to a blank page)
    #[arg(short, long)]
    page: Option<PathBuf>,
}

/// A line typed on stdin.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Interact(Interaction),
    Show,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (verb, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();
        let command = match verb {
            "click" if !arg.is_empty() => Self::Interact(Interaction::Click(arg.to_string())),
            "input" => Self::Interact(Interaction::Input(arg.to_string())),
            "submit" => Self::Interact(Interaction::Submit(arg.to_string())),
            "confirm" => Self::Interact(Interaction::Confirm),
            "show" => Self::Show,
            "quit" | "exit" => Self::Quit,
            _ => return None,
        };
        Some(command)
    }
}

const HELP: &str = "commands: click <option> | input <text> | submit <text> | confirm | show | quit";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config {}", path.display()))?;
            FormConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => FormConfig::new(),
    };

    let region = match &cli.page {
        Some(path) => {
            let markup = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading page {}", path.display()))?;
            PageRegion::from_markup(&markup, &config)
        }
        None => PageRegion::blank(&config),
    };

    let mut form = FormController::new(config, region);
    let dropped = form.load(&DirLoader::new(cli.dir.clone())).await?.len();
    if dropped > 0 {
        warn!(dropped, "Some questions were dropped from the form");
    }

    if let Err(err) = form.start() {
        warn!(error = %err, "Form has no start question");
    }
    println!("{}", form.region().html());
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = Command::parse(&line) else {
            eprintln!("{HELP}");
            continue;
        };
        match command {
            Command::Quit => break,
            Command::Show => println!("{}", form.region().html()),
            Command::Interact(interaction) => {
                let before = form.current_id().cloned();
                let transitions = form.dispatch(interaction)?;
                if form.current_id() == before.as_ref() {
                    form.refresh();
                }
                for transition in &transitions {
                    match &transition.to {
                        Some(to) => info!(from = %transition.from, %to, "Transition"),
                        None => info!(from = %transition.from, "No transition for this answer"),
                    }
                }
                println!("{}", form.region().html());
            }
        }
    }

    Ok(())
}
