//! lease-backup - command line entry point
//!
//! Operator tooling around the backup catalog: list, create, restore,
//! delete, and the one-time journal migration.

use anyhow::Result;
use clap::{Parser, Subcommand};
use lease_backup::utils::format::{format_bytes, format_store_count, format_timestamp};
use lease_backup::{
    journal, utils, BackupConfig, BackupControl, BackupError, BackupService,
    CreateBackupRequest, SqliteFileStore,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Live database file (overrides config)
    #[arg(long, value_name = "FILE")]
    data_file: Option<PathBuf>,

    /// Backup directory (overrides config)
    #[arg(long, value_name = "DIR")]
    backup_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List cataloged backups, newest first
    List,
    /// Snapshot the live database
    Create {
        #[arg(long, default_value = "manual")]
        reason: String,
        /// Acting user id recorded in the catalog
        #[arg(long)]
        user: Option<i64>,
    },
    /// Replace the live database with a backup
    Restore {
        id: String,
        #[arg(long)]
        user: Option<i64>,
    },
    /// Remove a backup and its archive
    Delete {
        id: String,
        #[arg(long)]
        user: Option<i64>,
    },
    /// Backfill `storeCount = -1` on legacy catalog entries
    MigrateMetadata,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<BackupError>() {
                Some(backup_err) => eprintln!("error [{}]: {}", backup_err.code(), backup_err),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => BackupConfig::from_file(path)?,
        None => BackupConfig::new("data/arriendos.db", "output/arriendos_backups"),
    };
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }
    if let Some(backup_dir) = args.backup_dir {
        config.backup_dir = backup_dir;
    }

    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    utils::logger::init(log_level)?;

    match args.command {
        Command::MigrateMetadata => {
            let changed = journal::backfill_store_count(&config.journal_path())?;
            println!("Migrated {changed} backup record(s)");
        }
        Command::List => print_list(&open_service(config)?)?,
        Command::Create { reason, user } => {
            let record = open_service(config)?.create_backup(CreateBackupRequest::new(reason, user))?;
            println!(
                "Created {} ({} -> {}, {} stores)",
                record.id,
                format_bytes(record.size),
                format_bytes(record.compressed_size),
                format_store_count(record.store_count)
            );
        }
        Command::Restore { id, user } => {
            let outcome = open_service(config)?.restore_backup(&id, user)?;
            println!("Restored {}", outcome.restored.id);
            if let Some(pre) = outcome.pre_restore {
                println!("Previous state saved as {}", pre.id);
            }
        }
        Command::Delete { id, user } => {
            let record = open_service(config)?.delete_backup(&id, user)?;
            println!("Deleted {}", record.id);
        }
    }

    Ok(())
}

fn open_service(config: BackupConfig) -> Result<BackupService> {
    let store = Arc::new(SqliteFileStore::new(&config.data_file, &config.record_table));
    Ok(BackupService::new(config, store, BackupControl::new())?)
}

fn print_list(service: &BackupService) -> Result<()> {
    let list = service.list_backups()?;
    if list.backups.is_empty() {
        println!("No backups found in {}", service.config().backup_dir.display());
        return Ok(());
    }

    println!(
        "{:<34} {:<19} {:>10} {:>10} {:>8}  {}",
        "ID", "CREATED", "SIZE", "ARCHIVE", "STORES", "REASON"
    );
    for backup in &list.backups {
        println!(
            "{:<34} {:<19} {:>10} {:>10} {:>8}  {}",
            backup.id,
            format_timestamp(&backup.created_at),
            format_bytes(backup.size),
            format_bytes(backup.compressed_size),
            format_store_count(backup.store_count),
            backup.reason
        );
    }

    println!();
    println!(
        "{} backup(s), {} on disk",
        list.backups.len(),
        format_bytes(list.total_size)
    );
    if let Some(last) = list.last_backup {
        println!("Last backup: {}", format_timestamp(&last));
    }
    Ok(())
}
