//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use ledgerdrive_file_manager::{
    AssetManager, BackendConnection, UploadCoordinator, directory_totals, find_asset,
    is_modifiable_by, scan_selection,
};
use ledgerdrive_protocol::{AssetRecord, AssetRef};
use ledgerdrive_transfer::{ProgressTracker, UploadProgress, UploadState};
use tracing::{info, warn};

use crate::cli::Commands;
use crate::config::{CliConfig, default_config_path};
use crate::http_backend::HttpBackend;

pub async fn run(
    command: Commands,
    config: &CliConfig,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::InitConfig => init_config(config, config_path),
        Commands::Upload { paths, parent } => {
            upload(&connect(config)?, config, &paths, parent).await
        }
        Commands::Ls { parent } => list(&connect(config)?, parent).await,
        Commands::Mkdir { name, parent } => {
            let backend = connect(config)?;
            let dir = AssetManager::new(&backend)
                .create_directory(&name, parent)
                .await?;
            println!("created directory {} ({})", dir.name, dir.id);
            Ok(())
        }
        Commands::Rm { id, dir } => {
            let asset = if dir {
                AssetRef::Directory(id)
            } else {
                AssetRef::File(id)
            };
            let backend = connect(config)?;
            AssetManager::new(&backend).delete_asset(asset).await?;
            println!("deleted {id}");
            Ok(())
        }
        Commands::Rename { id, name, dir } => rename(&connect(config)?, id, &name, dir).await,
        Commands::Stats => stats(&connect(config)?).await,
    }
}

fn connect(config: &CliConfig) -> anyhow::Result<HttpBackend> {
    HttpBackend::new(
        &config.backend_url,
        &config.principal,
        Duration::from_secs(config.request_timeout_secs),
    )
}

fn init_config(config: &CliConfig, config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    config.save(&path)?;
    println!("wrote {}", path.display());
    Ok(())
}

async fn list(backend: &dyn BackendConnection, parent: Option<u64>) -> anyhow::Result<()> {
    let tree = AssetManager::new(backend).get_assets_tree(parent).await?;
    if tree.is_empty() {
        println!("(empty)");
    }
    for line in render_tree(&tree, backend.principal()) {
        println!("{line}");
    }
    Ok(())
}

async fn rename(
    backend: &dyn BackendConnection,
    id: u64,
    name: &str,
    dir: bool,
) -> anyhow::Result<()> {
    let assets = AssetManager::new(backend);
    if dir {
        assets.rename_asset(AssetRef::Directory(id), name).await?;
        println!("renamed directory {id} to {name}");
        return Ok(());
    }

    // File renames keep the stored extension, so the record is needed.
    let tree = assets.get_assets_tree(None).await?;
    let Some(AssetRecord::File(file)) = find_asset(&tree, id) else {
        bail!("no file with id {id}");
    };
    assets.rename_file(file, name).await?;
    println!("renamed {} ({id})", file.name);
    Ok(())
}

async fn stats(backend: &dyn BackendConnection) -> anyhow::Result<()> {
    let meta = AssetManager::new(backend).get_metadata().await?;
    println!("files:       {}", meta.file_count);
    println!("directories: {}", meta.directory_count);
    println!("stored:      {}", format_bytes(meta.files_combined_bytes));
    println!("heap:        {}", format_bytes(meta.heap_memory));
    println!("cycles:      {}", meta.cycles);
    Ok(())
}

async fn upload(
    backend: &dyn BackendConnection,
    config: &CliConfig,
    paths: &[PathBuf],
    parent: Option<u64>,
) -> anyhow::Result<()> {
    let files = scan_selection(paths).context("failed to read selection")?;
    if files.is_empty() {
        warn!("nothing to upload");
        return Ok(());
    }
    info!(files = files.len(), "uploading selection");

    let mut coordinator = UploadCoordinator::new(backend, config.limits.clone());

    let tracker = ProgressTracker::new(coordinator.session(), None);
    tracker.on_progress(Box::new(|p: UploadProgress| eprintln!("{}", progress_line(&p))));
    tracker.start();

    let result = coordinator.begin_upload(parent, files).await;

    tracker.stop();
    tracker.notify();

    let summary = result?;
    println!(
        "uploaded {} of {} files in {} batches ({} chunks)",
        summary.files_bound, summary.files_created, summary.batches, summary.chunks
    );
    if summary.failed_batches > 0 {
        bail!(
            "{} of {} chunk batches failed; some files may be incomplete",
            summary.failed_batches,
            summary.batches
        );
    }
    Ok(())
}

fn progress_line(p: &UploadProgress) -> String {
    match p.state {
        UploadState::Dispatching => format!(
            "uploading: {} chunks in flight, {} to go",
            p.in_flight_chunks, p.total_chunks_to_process
        ),
        UploadState::Settled => "upload settled".to_string(),
        state => state.to_string(),
    }
}

/// One line per asset, indented by depth.
fn render_tree(assets: &[AssetRecord], principal: &str) -> Vec<String> {
    fn walk(assets: &[AssetRecord], principal: &str, depth: usize, out: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        for asset in assets {
            let lock = if is_modifiable_by(asset, principal) {
                ""
            } else {
                " [read-only]"
            };
            match asset {
                AssetRecord::File(f) => out.push(format!(
                    "{indent}{:>6}  {}  {}{lock}",
                    f.id,
                    f.name,
                    format_bytes(f.size)
                )),
                AssetRecord::Directory(d) => {
                    let totals = directory_totals(d);
                    out.push(format!(
                        "{indent}{:>6}  {}/  {} files, {}{lock}",
                        d.id,
                        d.name,
                        totals.total_files,
                        format_bytes(totals.total_bytes)
                    ));
                    walk(&d.children, principal, depth + 1, out);
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(assets, principal, 0, &mut out);
    out
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1000 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for u in UNITS {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = u;
    }
    format!("{value:.1} {unit}")
}
