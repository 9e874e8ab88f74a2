//! shelfplan CLI - pack and check store documents
//!
//! Reads the JSON store documents exported by a planning session.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelfplan::editor::validate_aisle_rect;
use shelfplan::ir::StoreDocument;
use shelfplan::packer::{find_aisle_vacancies, RackLayout};
use shelfplan::Session;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;

use config::PlannerConfig;

#[derive(Parser)]
#[command(name = "shelfplan")]
#[command(about = "Pack and validate retail store plans", long_about = None)]
struct Cli {
    /// TOML file with [rack] and [editor] settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack every aisle and report requested against placed boxes
    Pack {
        /// Store document (.json)
        file: PathBuf,
        /// Print the visible boxes as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Check aisle bounds, overlaps and allocations
    Validate {
        /// Store document (.json)
        file: PathBuf,
    },
    /// Display information about a store document
    Info {
        /// Store document (.json)
        file: PathBuf,
    },
    /// List vacant slots in one aisle for a box footprint
    Slots {
        /// Store document (.json)
        file: PathBuf,
        /// Aisle id
        #[arg(short, long)]
        aisle: String,
        /// Box width along the shelf front (metres)
        #[arg(short, long)]
        width: f64,
        /// Box depth into the shelf (metres)
        #[arg(short, long)]
        depth: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = PlannerConfig::load(cli.config.as_deref())?;
    debug!(?config, "loaded config");

    match cli.command {
        Commands::Pack { file, json } => pack_file(&file, &config, json)?,
        Commands::Validate { file } => validate_file(&file, &config)?,
        Commands::Info { file } => show_info(&file, &config)?,
        Commands::Slots {
            file,
            aisle,
            width,
            depth,
        } => list_slots(&file, &config, &aisle, width, depth)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_document(file: &Path) -> Result<StoreDocument> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let doc = StoreDocument::from_json(&json)
        .with_context(|| format!("parsing {}", file.display()))?;
    debug!(
        store = %doc.store.id,
        aisles = doc.aisles.len(),
        products = doc.inventory.len(),
        "read store document"
    );
    Ok(doc)
}

fn open_session(file: &Path, config: &PlannerConfig) -> Result<Session> {
    let doc = read_document(file)?;
    let owner = doc.store.owner_id.clone();
    Ok(Session::from_document(doc, owner, config.rack.clone()))
}

fn pack_file(file: &Path, config: &PlannerConfig, json: bool) -> Result<()> {
    let session = open_session(file, config)?;
    let scene = session.scene();

    if json {
        println!("{}", serde_json::to_string_pretty(&scene.boxes)?);
        return Ok(());
    }

    println!("Store: {}", session.store().name);
    for aisle in session.aisles() {
        println!("\n{} ({})", aisle.name, aisle.id);
        let labels = scene.labels.iter().filter(|l| l.aisle_id == aisle.id);
        for label in labels {
            let stock = session
                .inventory()
                .get(&label.product_id)
                .map(|p| p.total_boxes_stock)
                .unwrap_or(0);
            print!(
                "  L{} {}: {}/{} placed (stock {})",
                label.shelf_level, label.product_name, label.placed, label.requested, stock
            );
            if label.overflow() > 0 {
                print!("  [{} did not fit]", label.overflow());
            }
            println!();
        }
    }

    let manual = session.overrides().len();
    println!("\nVisible boxes: {} ({} placed by hand)", scene.boxes.len(), manual);
    Ok(())
}

fn validate_file(file: &Path, config: &PlannerConfig) -> Result<()> {
    let doc = read_document(file)?;
    let mut problems = Vec::new();

    for aisle in &doc.aisles {
        if let Err(why) = validate_aisle_rect(
            &aisle.rect(),
            config.editor.min_aisle_size,
            &doc.store,
            &doc.aisles,
            Some(&aisle.id),
        ) {
            problems.push(format!("{}: {}", aisle.name, why));
        }
        for allocation in &aisle.products {
            if allocation.shelf_level.get() > aisle.shelves {
                problems.push(format!(
                    "{}: allocation {} targets shelf {} of {}",
                    aisle.name, allocation.id, allocation.shelf_level, aisle.shelves
                ));
            }
            if !doc.inventory.iter().any(|p| p.id == allocation.product_id) {
                problems.push(format!(
                    "{}: allocation {} references unknown product {}",
                    aisle.name, allocation.id, allocation.product_id
                ));
            }
        }
    }
    for record in &doc.overrides {
        if doc.aisle(&record.aisle_id).is_none() {
            problems.push(format!(
                "override {} sits in unknown aisle {}",
                record.id, record.aisle_id
            ));
        }
    }

    if problems.is_empty() {
        println!("{}: ok ({} aisles)", file.display(), doc.aisles.len());
        return Ok(());
    }
    for problem in &problems {
        println!("{problem}");
    }
    anyhow::bail!("{} problem(s) in {}", problems.len(), file.display())
}

fn show_info(file: &Path, config: &PlannerConfig) -> Result<()> {
    let doc = read_document(file)?;
    let layout = RackLayout::new(&config.rack);

    println!("shelfplan document: {}", file.display());
    println!("  Version: {}", doc.version);
    println!("  Store: {} ({})", doc.store.name, doc.store.id);
    println!("  Floor: {} x {} m", doc.store.width, doc.store.depth);
    println!("  Aisles: {}", doc.aisles.len());
    println!("  Products: {}", doc.inventory.len());
    println!("  Manual placements: {}", doc.overrides.len());

    if !doc.aisles.is_empty() {
        println!("\nAisles:");
        for (i, aisle) in doc.aisles.iter().enumerate() {
            println!(
                "  {}: {} at ({}, {}) {} x {} m, {} unit(s), {} shelf/shelves, {} allocation(s)",
                i + 1,
                aisle.name,
                aisle.x,
                aisle.z,
                aisle.width,
                aisle.length,
                layout.num_units(aisle),
                aisle.shelves,
                aisle.products.len()
            );
        }
    }

    Ok(())
}

fn list_slots(
    file: &Path,
    config: &PlannerConfig,
    aisle_id: &str,
    width: f64,
    depth: f64,
) -> Result<()> {
    let session = open_session(file, config)?;
    let aisle = session
        .aisle(aisle_id)
        .ok_or_else(|| anyhow::anyhow!("Aisle not found: {}", aisle_id))?;
    let occupied = session.scene().boxes;
    let slots = find_aisle_vacancies(&config.rack, aisle, &occupied, width, depth);

    println!("{} vacant slot(s) in {} for {} x {} m", slots.len(), aisle.name, width, depth);
    for slot in &slots {
        println!(
            "  U{} {:?} L{} at ({:.3}, {:.3})",
            slot.unit_index, slot.side, slot.shelf_level, slot.local_x, slot.local_z
        );
    }
    Ok(())
}
