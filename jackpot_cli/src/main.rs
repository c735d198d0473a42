use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use jackpot_core::registry;
use jackpot_core::{CoreError, StateDocument, StateStore};

#[derive(Parser)]
#[command(name = "jackpot-cli", about = "Operator CLI for the jackpot state file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Directory holding state.json, default ./data
    #[arg(long, value_parser, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List combinations with their hit counters
    List,
    /// View the last N spins
    ViewSpins {
        #[arg(default_value_t = 20)]
        n: usize,
    },
    /// Export the spin history to CSV path
    ExportCsv { path: PathBuf },
    /// Add a combination
    Add { combo: String },
    /// Remove a combination by its text
    Remove { combo: String },
    /// Zero hit counters and clear the spin history
    ResetStats,
    /// Restore the preset combinations and clear the spin history
    ResetDefaults,
}

fn print_combinations(doc: &StateDocument) {
    for c in &doc.combinations {
        let marker = if doc.last_combo_id == Some(c.id) { "*" } else { " " };
        println!(
            "{marker}#{:>4} {:<16} hits={:<5} enabled={:<5} winner={} last={}",
            c.id,
            c.combo,
            c.hits,
            c.enabled,
            c.winner,
            c.last_hit.as_deref().unwrap_or("-"),
        );
    }
}

fn print_spins(doc: &StateDocument, n: usize) {
    for s in doc.spins.iter().rev().take(n) {
        println!(
            "#{:>6} {} combo={} (id {}) winner={}",
            s.id,
            s.created_at.to_rfc3339(),
            s.combo,
            s.combination_id,
            s.winner_name_snapshot
        );
    }
}

fn export_csv(doc: &StateDocument, path: &Path) -> anyhow::Result<usize> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["id", "created_at", "combination_id", "combo", "winner"])?;
    for s in &doc.spins {
        wtr.write_record([
            s.id.to_string(),
            s.created_at.to_rfc3339(),
            s.combination_id.to_string(),
            s.combo.clone(),
            s.winner_name_snapshot.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(doc.spins.len())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let store = StateStore::in_dir(&cli.data_dir);
    let load = || {
        store
            .load()
            .with_context(|| format!("reading {}", store.path().display()))
    };

    match cli.command {
        Commands::List => print_combinations(&load()?),
        Commands::ViewSpins { n } => print_spins(&load()?, n),
        Commands::ExportCsv { path } => {
            let total = export_csv(&load()?, &path)?;
            println!("Exported {} spins to {}", total, path.display());
        }
        Commands::Add { combo } => {
            let created = store.update(|doc| registry::add(doc, &combo))?;
            println!("Added #{} {}", created.id, created.combo);
        }
        Commands::Remove { combo } => {
            store.update(|doc| registry::remove_by_text(doc, &combo))?;
            println!("Removed {}", registry::normalize_combo(&combo));
        }
        Commands::ResetStats => {
            store.update(|doc| {
                registry::reset_stats(doc);
                Ok::<_, CoreError>(())
            })?;
            println!("Statistics reset");
        }
        Commands::ResetDefaults => {
            store.update(|doc| {
                registry::reset_defaults(doc);
                Ok::<_, CoreError>(())
            })?;
            println!("Combinations reset to defaults");
        }
    }

    Ok(())
}
