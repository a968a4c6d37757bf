use std::io::Read;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use fatemu_core::{DirectoryEntry, FileService};
use record_store::DirRecordStore;

mod config;

#[derive(Parser)]
#[command(version, about = "Manage files kept in a FAT-emulating record store")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// Store directory; overrides `store_dir` from the config file.
    #[arg(long, global = true)]
    store: Option<Utf8PathBuf>,

    /// Log engine activity (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a file (replacing one with the same name, unless configured not to).
    Create(ContentArgs),
    /// List active files, or trashed ones.
    List {
        #[arg(long)]
        trashed: bool,
    },
    /// Print a file with a metadata header.
    Cat { name: String },
    /// Replace the content of an active file.
    Rewrite(ContentArgs),
    /// Move an active file to the trash.
    Trash { name: String },
    /// Bring a file back from the trash.
    Restore { name: String },
}

#[derive(Args)]
struct ContentArgs {
    name: String,

    /// Content to store. Read from stdin if neither this nor --file is given.
    #[arg(long, conflicts_with = "file")]
    content: Option<String>,

    /// Read the content from a file.
    #[arg(long)]
    file: Option<Utf8PathBuf>,
}

impl ContentArgs {
    fn content(&self) -> anyhow::Result<String> {
        if let Some(content) = &self.content {
            return Ok(content.clone());
        }
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path).with_context(|| format!("reading '{path}'"));
        }

        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("reading stdin")?;
        Ok(content)
    }
}

/// Pick `name` out of the active (or trashed) listing.
fn select(fs: &mut FileService, name: &str, trashed: bool) -> anyhow::Result<DirectoryEntry> {
    let entry = fs
        .list_files(trashed)?
        .into_iter()
        .find(|entry| entry.name() == name);

    match entry {
        Some(entry) => Ok(entry),
        None if trashed => anyhow::bail!("No file named '{name}' in the trash."),
        None => anyhow::bail!("No active file named '{name}'."),
    }
}

fn print_listing(entries: &mut [DirectoryEntry], trashed: bool) {
    if entries.is_empty() {
        println!("{}", if trashed { "Trash is empty." } else { "No files." });
        return;
    }

    entries.sort_by(|a, b| a.name().cmp(b.name()));
    for (idx, entry) in entries.iter().enumerate() {
        match entry.deleted_at() {
            Some(deleted_at) if trashed => println!(
                "{:>3}. {}  {} chars  deleted {deleted_at}",
                idx + 1,
                entry.name(),
                entry.size_chars()
            ),
            _ => println!(
                "{:>3}. {}  {} chars  created {}  modified {}",
                idx + 1,
                entry.name(),
                entry.size_chars(),
                entry.created_at(),
                entry.modified_at()
            ),
        }
    }
}

fn open_service(cli: &Cli) -> anyhow::Result<FileService> {
    let mut config = match &cli.config {
        Some(path) => config::read_from_file(path)
            .with_context(|| format!("loading config from '{path}'"))?,
        None => config::Config::default(),
    };
    if let Some(store) = &cli.store {
        config.store_dir = store.clone();
    }

    let store = DirRecordStore::create(&config.store_dir)
        .with_context(|| format!("opening store '{}'", config.store_dir))?;
    log::debug!("store: '{}'", store.root());

    Ok(FileService::new(Box::new(store), config.engine))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut fs = open_service(&cli)?;

    match cli.command {
        Command::Create(args) => {
            let content = args.content()?;
            let entry = fs.create_file(&args.name, &content)?;
            println!("Created '{}' ({} chars).", entry.name(), entry.size_chars());
        }
        Command::List { trashed } => {
            let mut entries = fs.list_files(trashed)?;
            print_listing(&mut entries, trashed);
        }
        Command::Cat { name } => {
            let entry = select(&mut fs, &name, false)?;
            let content = fs.read_file(&entry)?;
            println!("Name:     {}", entry.name());
            println!("Size:     {} chars", entry.size_chars());
            println!("Created:  {}", entry.created_at());
            println!("Modified: {}", entry.modified_at());
            println!();
            println!("{content}");
        }
        Command::Rewrite(args) => {
            let content = args.content()?;
            let mut entry = select(&mut fs, &args.name, false)?;
            let old_size = entry.size_chars();
            fs.rewrite_file(&mut entry, &content)?;
            println!(
                "Rewrote '{}' ({old_size} -> {} chars).",
                entry.name(),
                entry.size_chars()
            );
        }
        Command::Trash { name } => {
            let mut entry = select(&mut fs, &name, false)?;
            fs.trash_file(&mut entry)?;
            println!("Moved '{}' to the trash.", entry.name());
        }
        Command::Restore { name } => {
            let mut entry = select(&mut fs, &name, true)?;
            fs.restore_file(&mut entry)?;
            println!("Restored '{}'.", entry.name());
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::builder()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args() {
        let cli = Cli::try_parse_from([
            "fatctl", "--store", "/tmp/s", "create", "note", "--content", "hello",
        ])
        .unwrap();
        assert_eq!(Some("/tmp/s"), cli.store.as_deref().map(|p| p.as_str()));
        match cli.command {
            Command::Create(args) => {
                assert_eq!("note", args.name);
                assert_eq!("hello", args.content().unwrap());
            }
            _ => panic!("expected create"),
        }

        let cli = Cli::try_parse_from(["fatctl", "list", "--trashed", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::List { trashed: true }));

        assert!(Cli::try_parse_from(["fatctl", "cat"]).is_err());
        assert!(
            Cli::try_parse_from(["fatctl", "rewrite", "x", "--content", "a", "--file", "b"])
                .is_err()
        );
    }

    #[test]
    fn select_respects_trash() {
        let mut fs = FileService::new(
            Box::new(record_store::MemRecordStore::new()),
            fatemu_core::Config::default(),
        );
        let mut entry = fs.create_file("memo", "remember").unwrap();
        assert!(select(&mut fs, "memo", true).is_err());
        assert_eq!("memo", select(&mut fs, "memo", false).unwrap().name());

        fs.trash_file(&mut entry).unwrap();
        assert!(select(&mut fs, "memo", false).is_err());
        assert!(select(&mut fs, "memo", true).unwrap().in_trash());
    }
}
