use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use botforge_fetch::{ArchiveCache, Transfer, TransferOptions, progress_channel};
use botforge_tree::{ArchiveTree, TreeFs};
use clap::Args;

use crate::{release, state};

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Re-download even if the cached archive already matches.
    #[arg(long, short)]
    pub force: bool,
    /// Release tag to install, `latest`, or `keep` for the cached one.
    #[arg(long, short, default_value = "keep")]
    pub version: String,
}

#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// How many releases to list.
    #[arg(long, short = 'n', default_value_t = 10)]
    pub count: u8,
}

#[derive(Debug, Args)]
pub struct ProjectsArgs {
    /// Language directory inside the archive, e.g. `java`.
    pub language: String,
}

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Language directory inside the archive, e.g. `java`.
    #[arg(long)]
    pub lang: String,
    /// Project type within the language, e.g. `commandbased`.
    #[arg(long = "type")]
    pub kind: String,
    /// Directory to create the project in.
    #[arg(long)]
    pub dir: PathBuf,
}

pub async fn fetch(args: FetchArgs) -> Result<()> {
    let cache = ArchiveCache::new(state::cache_dir()?);

    let version = match args.version.as_str() {
        // keep the installed release; fall back to latest on a cold cache
        "keep" => cache.version_tag().unwrap_or_else(|| "latest".to_string()),
        v => v.to_string(),
    };
    let release = release::resolve(&version).await?;

    let (sink, reporter, _cancel) = progress_channel(format!("templates {}", release.tag));
    let reporter_task = tokio::spawn(reporter.run());
    let options = TransferOptions::default().on_progress(sink.callback());

    let result = cache
        .refresh(
            &Transfer::new(),
            &release.archive_url,
            &release.tag,
            args.force,
            &options,
        )
        .await;
    if let Err(e) = &result {
        sink.failed(e.to_string());
    }
    drop(options);
    drop(sink);
    let _ = reporter_task.await;

    if result? {
        println!("Downloaded template archive {}.", release.tag);
    } else {
        println!("Template archive {} is already installed.", release.tag);
        println!("Use --force or --version to install another release.");
    }
    Ok(())
}

pub async fn versions(args: VersionsArgs) -> Result<()> {
    for tag in release::list_versions(args.count).await? {
        println!("{tag}");
    }
    Ok(())
}

pub async fn languages() -> Result<()> {
    let tree = cached_archive()?;
    let entries = tree.list_dir(".").await.map_err(with_fetch_hint)?;
    for entry in entries.iter().filter(|e| e.is_dir()) {
        println!("{}", entry.name);
    }
    Ok(())
}

pub async fn projects(args: ProjectsArgs) -> Result<()> {
    let tree = cached_archive()?;
    let entries = tree.list_dir(&args.language).await.map_err(with_fetch_hint)?;
    for entry in entries.iter().filter(|e| e.is_dir()) {
        println!("{}", entry.name);
    }
    Ok(())
}

pub async fn new(args: NewArgs) -> Result<()> {
    let tree = cached_archive()?;
    ensure_absent_or_empty(&args.dir)?;

    let source = format!("{}/{}", args.lang, args.kind);
    let copied = copy_tree(&tree, &source, &args.dir)
        .await
        .map_err(with_fetch_hint)?;
    println!(
        "Created {} {} project in '{}' ({copied} files).",
        args.lang,
        args.kind,
        args.dir.display()
    );
    Ok(())
}

fn ensure_absent_or_empty(dir: &Path) -> Result<()> {
    if dir.exists() && fs::read_dir(dir)?.next().is_some() {
        bail!("'{}' already exists and is not empty", dir.display());
    }
    Ok(())
}

/// Copy the subtree rooted at `root` verbatim into `dest`, creating
/// directories as needed. Returns the number of files written.
async fn copy_tree(
    tree: &dyn TreeFs,
    root: &str,
    dest: &Path,
) -> botforge_tree::Result<usize> {
    let mut copied = 0usize;
    let mut pending = vec![(root.to_string(), dest.to_path_buf())];
    while let Some((path, target)) = pending.pop() {
        let entries = tree.list_dir(&path).await?;
        fs::create_dir_all(&target)?;
        for entry in entries {
            let child = format!("{path}/{}", entry.name);
            if entry.is_dir() {
                pending.push((child, target.join(&entry.name)));
            } else {
                let content = tree.read_file(&child).await?;
                fs::write(target.join(&entry.name), &content)?;
                copied += 1;
            }
        }
    }
    Ok(copied)
}

fn cached_archive() -> Result<ArchiveTree> {
    let cache = ArchiveCache::new(state::cache_dir()?);
    Ok(ArchiveTree::new(cache.archive_path()))
}

fn with_fetch_hint(err: botforge_tree::Error) -> anyhow::Error {
    match err {
        botforge_tree::Error::NoArchive => anyhow::anyhow!(
            "no template archive in the cache; run `botforge template fetch` first"
        ),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::tempdir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("templates.zip");
        let mut zip = ZipWriter::new(fs::File::create(&path).unwrap());
        let opts = SimpleFileOptions::default();
        for (name, body) in [
            ("java/commandbased/Main.java", "class Main {}\n"),
            ("java/commandbased/subsystems/Drive.java", "class Drive {}\n"),
            ("java/timedrobot/Robot.java", "class Robot {}\n"),
        ] {
            zip.start_file(name, opts).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    #[tokio::test]
    async fn copies_the_chosen_subtree_verbatim() {
        let dir = tempdir().unwrap();
        let tree = ArchiveTree::new(write_fixture(dir.path()));
        let dest = dir.path().join("robot");

        let copied = copy_tree(&tree, "java/commandbased", &dest).await.unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(dest.join("Main.java")).unwrap(),
            "class Main {}\n"
        );
        assert_eq!(
            fs::read_to_string(dest.join("subsystems").join("Drive.java")).unwrap(),
            "class Drive {}\n"
        );
        // nothing from the sibling project type leaks in
        assert!(!dest.join("Robot.java").exists());
    }

    #[tokio::test]
    async fn unknown_template_copies_nothing() {
        let dir = tempdir().unwrap();
        let tree = ArchiveTree::new(write_fixture(dir.path()));
        let dest = dir.path().join("robot");

        let err = copy_tree(&tree, "java/romi", &dest).await.unwrap_err();
        assert!(matches!(err, botforge_tree::Error::NotFound { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn occupied_destination_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("stale"), b"x").unwrap();
        assert!(ensure_absent_or_empty(dir.path()).is_err());
        assert!(ensure_absent_or_empty(&dir.path().join("fresh")).is_ok());
    }
}
