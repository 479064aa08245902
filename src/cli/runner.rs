//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::shell::{ShellCommand, HELP};
use crate::config::{load_config, Config, HttpSourceConfig, PaginatorConfig};
use crate::error::{Error, Result};
use crate::paginator::Paginator;
use crate::source::HttpSource;
use crate::types::{Snapshot, StateKind};
use crate::view::TracingView;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch { max_pages } => self.fetch(*max_pages).await,
            Commands::Shell => self.shell().await,
            Commands::Validate => self.validate(),
        }
    }

    /// Config file merged with command-line overrides
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match (&self.cli.config, &self.cli.url) {
            (Some(path), _) => load_config(path)?,
            (None, Some(url)) => Config {
                paginator: PaginatorConfig::default(),
                source: HttpSourceConfig::new(url.clone()),
            },
            (None, None) => {
                return Err(Error::config(
                    "No source configured (use --config or --url)",
                ))
            }
        };

        if let Some(url) = &self.cli.url {
            config.source.url.clone_from(url);
        }
        if let Some(limit) = self.cli.limit {
            config.paginator.limit = limit;
        }
        if let Some(path) = &self.cli.records_path {
            config.source.records_path = Some(path.clone());
        }

        config.validate()?;
        Ok(config)
    }

    fn paginator(config: &Config) -> Result<Paginator<Value>> {
        let source = HttpSource::<Value>::new(&config.source)?;
        Paginator::builder(source)
            .view(TracingView::new("cli"))
            .config(&config.paginator)
            .build()
    }

    /// Print the resolved configuration
    fn validate(&self) -> Result<()> {
        let config = self.resolve_config()?;
        self.output(&config);
        Ok(())
    }

    /// Load every page and print the items
    async fn fetch(&self, max_pages: Option<usize>) -> Result<()> {
        let config = self.resolve_config()?;
        let paginator = Self::paginator(&config)?;
        let started = Instant::now();

        paginator.start();
        let mut snapshot = paginator.settled().await;
        if let Some(error) = paginator.error() {
            return Err(Error::fetch(error.to_string()));
        }

        let mut pages = 1;
        while snapshot.state == StateKind::HasMore {
            if max_pages.is_some_and(|max| pages >= max) {
                info!(pages, "page limit reached");
                break;
            }

            let before = snapshot.len;
            paginator.load_more();
            snapshot = paginator.settled().await;

            // A failed next page falls back to HasMore with the same items
            if snapshot.state == StateKind::HasMore && snapshot.len == before {
                warn!(pages, "next page failed, stopping");
                break;
            }
            pages += 1;
        }

        for item in paginator.items() {
            self.output(&item);
        }

        info!(
            pages,
            items = snapshot.len,
            state = %snapshot.state,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetch finished"
        );
        paginator.stop();
        Ok(())
    }

    /// Read shell commands from stdin until EOF or `quit`
    async fn shell(&self) -> Result<()> {
        let config = self.resolve_config()?;
        let paginator = Self::paginator(&config)?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        eprintln!("pagewise shell on {}, 'help' lists commands", config.source.url);

        while let Some(line) = lines.next_line().await? {
            let command = match ShellCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            };

            match command {
                ShellCommand::Start => {
                    paginator.start();
                    self.report(&paginator, paginator.settled().await);
                }
                ShellCommand::Refresh { force } => {
                    paginator.refresh(force);
                    self.report(&paginator, paginator.settled().await);
                }
                ShellCommand::More => {
                    paginator.load_more();
                    self.report(&paginator, paginator.settled().await);
                }
                ShellCommand::Stop => {
                    paginator.stop();
                    self.report(&paginator, paginator.snapshot());
                }
                ShellCommand::Size => println!("{}", paginator.len()),
                ShellCommand::State => self.report(&paginator, paginator.snapshot()),
                ShellCommand::Get(index) => match paginator.get(index) {
                    Some(item) => self.output(&item),
                    None => eprintln!("No item at index {index} ({} loaded)", paginator.len()),
                },
                ShellCommand::List => {
                    for item in paginator.items() {
                        self.output(&item);
                    }
                }
                ShellCommand::Help => println!("{HELP}"),
                ShellCommand::Quit => break,
            }
        }

        paginator.stop();
        Ok(())
    }

    fn report(&self, paginator: &Paginator<Value>, snapshot: Snapshot) {
        self.output(&snapshot);
        if let Some(error) = paginator.error() {
            eprintln!("Error: {error}");
        }
    }

    /// Output a value
    fn output<S: Serialize>(&self, value: &S) {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value),
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
        };
        println!("{}", rendered.unwrap_or_default());
    }
}
