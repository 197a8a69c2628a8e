//! CLI entry point for git-stream.
//!
//! Manages named streams (local development branches tracked against one or
//! more upstream parent branches) recorded in `~/.git-streams.yml`.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use git_stream::context::StreamContext;
use git_stream::create::{CreateOptions, create_stream};
use git_stream::deliver::{DeliverOptions, deliver_stream};
use git_stream::exit_codes;
use git_stream::io::config_store::{config_path, ensure_config, load_config, write_config};
use git_stream::logging;
use git_stream::remove::{RemoveOptions, remove_stream};
use git_stream::update::update_stream;

#[derive(Parser)]
#[command(
    name = "git-stream",
    version,
    about = "Manage development branch streams tracked against upstream parents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a parent branch to the current stream.
    #[command(name = "add_parent")]
    AddParent { parent: String },
    /// Show tool defaults, or change one with --set.
    Config {
        /// Setting to change, as key=value.
        #[arg(short, long, value_name = "KEY=VALUE")]
        set: Option<String>,
    },
    /// Create a stream: clone the repository and set up its branch.
    Create {
        /// Parent branch (defaults to the configured default_parent).
        #[arg(short, long)]
        parent: Option<String>,
        /// Ticket reference recorded on the stream.
        #[arg(short, long)]
        ticket: Option<String>,
        /// Delivery branch (otherwise derived from the configured template).
        #[arg(short, long)]
        delivery_branch: Option<String>,
        name: String,
        repo: String,
    },
    /// Deliver the current stream to its delivery branch.
    Deliver {
        /// Also open a pull request against the first parent.
        #[arg(short = 'p', long)]
        create_pr: bool,
        commit_message: String,
    },
    /// List all streams.
    List,
    /// Remove a stream record.
    Rm {
        /// Delete the remote branch and local working copy too.
        #[arg(short, long)]
        cleanup: bool,
        name: String,
    },
    /// Remove a parent branch from the current stream.
    #[command(name = "rm_parent")]
    RmParent { parent: String },
    /// Set a field on the current stream; an empty value removes it.
    #[command(name = "set_value")]
    SetValue { parameter: String, value: String },
    /// Show the current stream.
    Show,
    /// Merge each parent into the current stream branch.
    Update,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config_path()?;
    ensure_config(&config)?;
    match cli.command {
        Command::AddParent { parent } => open_context(&config)?.add_parent(&parent),
        Command::Config { set } => cmd_config(&config, set.as_deref()),
        Command::Create {
            parent,
            ticket,
            delivery_branch,
            name,
            repo,
        } => {
            let opts = CreateOptions {
                parent,
                ticket,
                delivery_branch,
            };
            create_stream(&config, &name, &repo, &opts).map(|_| ())
        }
        Command::Deliver {
            create_pr,
            commit_message,
        } => {
            let ctx = open_context(&config)?;
            deliver_stream(&ctx, &commit_message, &DeliverOptions { create_pr }).map(|_| ())
        }
        Command::List => cmd_list(&config),
        Command::Rm { cleanup, name } => remove_stream(&config, &name, &RemoveOptions { cleanup }),
        Command::RmParent { parent } => open_context(&config)?.rm_parent(&parent),
        Command::SetValue { parameter, value } => {
            open_context(&config)?.set_value(&parameter, &value)
        }
        Command::Show => {
            println!("{}", open_context(&config)?.render()?);
            Ok(())
        }
        Command::Update => update_stream(&open_context(&config)?),
    }
}

fn open_context(config: &Path) -> Result<StreamContext> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    StreamContext::open(&cwd, config)
}

fn cmd_list(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    for (name, record) in &config.streams {
        println!("{}", record.render(name));
    }
    Ok(())
}

fn cmd_config(config_path: &Path, set: Option<&str>) -> Result<()> {
    let mut config = load_config(config_path)?;
    let Some(assignment) = set else {
        for (key, value) in config.settings() {
            println!("  {key}: {value}");
        }
        return Ok(());
    };
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{assignment}'"))?;
    config.set_setting(key, value)?;
    write_config(config_path, &config)
}
