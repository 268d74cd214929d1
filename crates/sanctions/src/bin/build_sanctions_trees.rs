//! Build the sanctions accumulators from a JSON list of entries.
//!
//! Usage: build-sanctions-trees <entries.json> [out_dir] [depth]
//!
//! Writes one layer snapshot per list and `roots.json` into `out_dir`
//! (default `trees`), then prints the roots.

use std::path::PathBuf;

use ordered_accumulator::PoseidonHasher;
use sanctions_builder::{SanctionEntry, SanctionsTrees, DEFAULT_DEPTH};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(entries_path) = args.next().map(PathBuf::from) else {
        eprintln!("Usage: build-sanctions-trees <entries.json> [out_dir] [depth]");
        std::process::exit(2);
    };
    let out_dir = args.next().map_or_else(|| PathBuf::from("trees"), PathBuf::from);
    let depth = match args.next() {
        Some(depth) => depth.parse::<usize>()?,
        None => DEFAULT_DEPTH,
    };

    println!("Reading entries from {:?}", entries_path);
    let entries: Vec<SanctionEntry> =
        serde_json::from_str(&tokio::fs::read_to_string(&entries_path).await?)?;
    println!("Building trees for {} entries at depth {}...", entries.len(), depth);

    let trees = SanctionsTrees::build(&entries, depth, PoseidonHasher::new()).await?;
    trees.save_to_directory(&out_dir).await?;
    println!("Trees saved to {:?}", out_dir);

    let roots = trees.roots();
    println!("\n=== Sanctions Roots ===\n");
    println!("name + date of birth:    {}", roots.name_dob);
    println!("name + year of birth:    {}", roots.name_yob);
    println!("passport + nationality:  {}", roots.passport_nationality);

    Ok(())
}
