//! # securefile
//!
//! Command-line driver for Cerberus secure files.
//!
//! ```text
//! securefile list [ROOT] [--json]
//! securefile get REMOTE [--dir DIR]
//! securefile put REMOTE LOCAL
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use securefile_client::{Config, SecureFileClient, SecureFilesResponse, Transport};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "securefile")]
#[command(about = "List, download and upload Cerberus secure files")]
#[command(version)]
pub struct Args {
    /// Cerberus URL
    #[arg(short, long, default_value = "http://localhost:8080", env = "CERBERUS_URL")]
    pub url: String,

    /// Cerberus client token
    #[arg(short, long, env = "CERBERUS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", env = "SECUREFILE_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long, env = "SECUREFILE_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List secure files
    List {
        /// Only list files under this path
        root: Option<String>,

        /// Print the raw listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a secure file; it is saved under the name the server sends
    Get {
        /// Remote secure file path
        remote: String,

        /// Directory to save into
        #[arg(short = 'o', long, default_value = ".")]
        dir: PathBuf,
    },

    /// Upload a local file
    Put {
        /// Remote secure file path
        remote: String,

        /// Local file to upload
        local: PathBuf,
    },
}

impl Args {
    /// Client configuration from the command line
    pub fn config(&self) -> Config {
        let mut config =
            Config::new(self.url.clone()).with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        config
    }
}

/// Run a command against the configured Cerberus endpoint
pub async fn run(args: Args, out: &mut impl Write) -> anyhow::Result<()> {
    let client = SecureFileClient::new(args.config())
        .with_context(|| format!("failed to set up client for {}", args.url))?;
    execute(&client, args.command, out).await
}

/// Run a command with an already built client
pub async fn execute<T: Transport>(
    client: &SecureFileClient<T>,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::List { root, json } => {
            let root = root.unwrap_or_default();
            let files = client
                .list(&root)
                .await
                .with_context(|| format!("failed to list secure files under {:?}", root))?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &files)?;
                writeln!(out)?;
            } else {
                print_listing(&files, out)?;
            }
        }
        Command::Get { remote, dir } => {
            let saved = client
                .get(&remote, &dir)
                .await
                .with_context(|| format!("failed to download {}", remote))?;
            writeln!(out, "{}", saved.display())?;
        }
        Command::Put { remote, local } => {
            client
                .put(&remote, &local)
                .await
                .with_context(|| format!("failed to upload {} to {}", local.display(), remote))?;
            writeln!(out, "uploaded {} to {}", local.display(), remote)?;
        }
    }
    Ok(())
}

fn print_listing(files: &SecureFilesResponse, out: &mut impl Write) -> std::io::Result<()> {
    for file in files.iter() {
        writeln!(
            out,
            "{:>10}  {}  {}",
            file.size_in_bytes,
            file.last_updated_ts.format("%Y-%m-%d %H:%M:%S"),
            file.path
        )?;
    }
    writeln!(
        out,
        "{} of {} secure files",
        files.file_count_in_result, files.total_file_count
    )?;
    if let Some(next) = files.next_offset {
        writeln!(out, "more results from offset {}", next)?;
    }
    Ok(())
}
