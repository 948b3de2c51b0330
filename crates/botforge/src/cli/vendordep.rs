use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use botforge_manifest::{VendorDep, list_project_deps, split_versioned_name};
use botforge_tree::{RemoteTree, TreeFs};
use clap::Args;

use crate::state;

const MARKETPLACE_BASE_URL: &str = "https://frcmaven.wpi.edu/artifactory";
const VENDORDEP_DIR: &str = botforge_manifest::VENDORDEP_DIR;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Marketplace year to list.
    #[arg(long, short, default_value = "2025")]
    pub year: String,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Library name as listed on the marketplace.
    pub name: String,
    #[arg(long, short, default_value = "2025")]
    pub year: String,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Library names as recorded in the project manifest.
    #[arg(required = true)]
    pub names: Vec<String>,
    /// Delete the manifest instead of moving it aside.
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Clone, Debug)]
struct MarketplaceEntry {
    version: String,
    file_name: String,
}

fn marketplace_path(year: &str) -> String {
    format!("vendordeps/vendordep-marketplace/{year}")
}

/// Group the marketplace directory's files by library name. Files
/// outside the versioned-name convention are skipped with a warning.
async fn marketplace_listing(
    tree: &dyn TreeFs,
    year: &str,
) -> Result<BTreeMap<String, Vec<MarketplaceEntry>>> {
    let entries = tree.list_dir(&marketplace_path(year)).await?;

    let mut listing: BTreeMap<String, Vec<MarketplaceEntry>> = BTreeMap::new();
    for entry in entries.iter().filter(|e| !e.is_dir()) {
        match split_versioned_name(&entry.name) {
            Ok(split) => listing.entry(split.name).or_default().push(MarketplaceEntry {
                version: split.version,
                file_name: entry.name.clone(),
            }),
            Err(e) => tracing::warn!(file = %entry.name, error = %e, "skipping marketplace entry"),
        }
    }
    Ok(listing)
}

/// Dotted-numeric version order; falls back to string order for
/// non-numeric segments.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.').map(|seg| seg.parse().unwrap_or(0)).collect()
    };
    parse(a).cmp(&parse(b)).then_with(|| a.cmp(b))
}

pub async fn list(args: ListArgs) -> Result<()> {
    let tree = RemoteTree::new(MARKETPLACE_BASE_URL);
    let listing = marketplace_listing(&tree, &args.year).await?;
    for (name, mut versions) in listing {
        versions.sort_by(|a, b| compare_versions(&a.version, &b.version));
        let all: Vec<&str> = versions.iter().map(|v| v.version.as_str()).collect();
        println!("{name}: {}", all.join(", "));
    }
    Ok(())
}

pub fn local() -> Result<()> {
    let root = state::find_project_root(Path::new("."), VENDORDEP_DIR)?;
    for dep in list_project_deps(&root)? {
        let year = dep
            .frc_year
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        println!("{} {} (year {year})", dep.name, dep.version);
    }
    Ok(())
}

pub async fn add(args: AddArgs) -> Result<()> {
    let root = state::find_project_root(Path::new("."), VENDORDEP_DIR)?;
    let tree = RemoteTree::new(MARKETPLACE_BASE_URL);

    let listing = marketplace_listing(&tree, &args.year).await?;
    let Some(candidates) = listing.get(&args.name) else {
        bail!("'{}' is not on the {} marketplace", args.name, args.year);
    };
    let Some(newest) = candidates
        .iter()
        .max_by(|a, b| compare_versions(&a.version, &b.version))
    else {
        bail!("'{}' has no downloadable versions", args.name);
    };

    let remote_path = format!("{}/{}", marketplace_path(&args.year), newest.file_name);
    let content = tree.read_file(&remote_path).await?;
    let dep = VendorDep::parse(&content)?;

    let installed = list_project_deps(&root).unwrap_or_default();
    if installed.iter().any(|existing| existing.matches(&dep, false)) {
        println!("{} {} is already installed.", dep.name, dep.version);
        return Ok(());
    }

    let file_name = if dep.file_name.is_empty() {
        newest.file_name.clone()
    } else {
        dep.file_name.clone()
    };
    let dest = root.join(VENDORDEP_DIR).join(&file_name);
    fs::write(&dest, &content)
        .with_context(|| format!("failed to write '{}'", dest.display()))?;
    println!("Added {} {}.", dep.name, dep.version);
    Ok(())
}

pub fn remove(args: RemoveArgs) -> Result<()> {
    let root = state::find_project_root(Path::new("."), VENDORDEP_DIR)?;
    let trash = state::cache_dir()?.join(VENDORDEP_DIR);
    for name in &args.names {
        let dep = botforge_manifest::find_by_name(&root, name)?;
        remove_manifest(&root, &trash, &dep, args.force)?;
        println!("Removed {} {}.", dep.name, dep.version);
    }
    Ok(())
}

/// Drop one manifest from the project. Without `force` it is moved
/// aside into the cache, so an accidental remove is recoverable by hand.
fn remove_manifest(root: &Path, trash: &Path, dep: &VendorDep, force: bool) -> Result<()> {
    let source = root.join(VENDORDEP_DIR).join(&dep.file_name);
    if force {
        return fs::remove_file(&source)
            .with_context(|| format!("failed to delete '{}'", source.display()));
    }
    fs::create_dir_all(trash)?;
    let target = trash.join(&dep.file_name);
    if fs::rename(&source, &target).is_err() {
        // rename cannot cross filesystems; stage a copy instead
        fs::copy(&source, &target)
            .with_context(|| format!("failed to move '{}' aside", source.display()))?;
        fs::remove_file(&source)
            .with_context(|| format!("failed to delete '{}'", source.display()))?;
    }
    Ok(())
}
