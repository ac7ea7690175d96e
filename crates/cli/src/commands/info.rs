//! `info` command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use contracts::{is_supported_image, ArtifactStatus, Workspace};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Workspace status for JSON output
#[derive(Serialize)]
struct WorkspaceInfo {
    root: PathBuf,
    images: DirInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    images_original: Option<DirInfo>,
    database: bool,
    sparse: bool,
    locked: bool,
    artifacts: Vec<ArtifactStatus>,
}

#[derive(Serialize, Default)]
struct DirInfo {
    present: bool,
    supported: usize,
    unsupported: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    let workspace = Workspace::new(&args.workspace);
    info!(workspace = %workspace.root().display(), "Inspecting workspace");

    if !workspace.root().is_dir() {
        anyhow::bail!("Workspace not found: {}", workspace.root().display());
    }

    let info = inspect(&workspace)
        .with_context(|| format!("Failed to inspect {}", workspace.root().display()))?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize workspace info")?;
        println!("{}", json);
    } else {
        print_workspace_info(&info);
    }

    Ok(())
}

fn inspect(workspace: &Workspace) -> Result<WorkspaceInfo, CliError> {
    let backup = workspace.images_backup_dir();
    Ok(WorkspaceInfo {
        root: workspace.root().to_path_buf(),
        images: count_images(&workspace.images_dir())?,
        images_original: if backup.is_dir() {
            Some(count_images(&backup)?)
        } else {
            None
        },
        database: workspace.database_path().is_file(),
        sparse: workspace.sparse_dir().is_dir(),
        locked: workspace.lock_path().exists(),
        artifacts: workspace.artifact_status(),
    })
}

fn count_images(dir: &std::path::Path) -> Result<DirInfo, CliError> {
    if !dir.is_dir() {
        return Ok(DirInfo::default());
    }

    let mut info = DirInfo {
        present: true,
        ..Default::default()
    };
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if is_supported_image(&entry.path()) {
            info.supported += 1;
        } else {
            info.unsupported += 1;
        }
    }
    Ok(info)
}

fn print_workspace_info(info: &WorkspaceInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                   COLMAP Runner Workspace                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📁 {}", info.root.display());
    print_dir("images", &info.images, info.images_original.is_none());
    if let Some(ref backup) = info.images_original {
        print_dir("images_original", backup, true);
    }

    println!("\n🗄  Outputs");
    println!("   ├─ database.db: {}", present(info.database));
    println!("   ├─ sparse/: {}", present(info.sparse));
    for (i, artifact) in info.artifacts.iter().enumerate() {
        let prefix = if i == info.artifacts.len() - 1 { "└─" } else { "├─" };
        let name = artifact
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "   {} sparse/0/{}: {}",
            prefix,
            name,
            if artifact.found { "Found" } else { "Not found" }
        );
    }

    if info.locked {
        println!("\n🔒 Workspace is locked by another run");
    }

    println!();
}

fn print_dir(name: &str, dir: &DirInfo, is_last: bool) {
    let prefix = if is_last { "└─" } else { "├─" };
    if dir.present {
        println!(
            "   {} {}/: {} images, {} other files",
            prefix, name, dir.supported, dir.unsupported
        );
    } else {
        println!("   {} {}/: missing", prefix, name);
    }
}

fn present(flag: bool) -> &'static str {
    if flag {
        "present"
    } else {
        "missing"
    }
}
