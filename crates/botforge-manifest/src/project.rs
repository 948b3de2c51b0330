use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::VendorDep;

/// Name of the manifest directory inside a robot project.
pub const VENDORDEP_DIR: &str = "vendordeps";

/// Parse every manifest in a project's `vendordeps/` directory.
///
/// Unparsable files are skipped with a warning rather than failing the
/// whole listing; a project with one stray file is still inspectable.
pub fn list_project_deps(project_dir: &Path) -> Result<Vec<VendorDep>> {
    let dir = project_dir.join(VENDORDEP_DIR);
    let entries = fs::read_dir(&dir).map_err(|e| Error::Read {
        path: dir.clone(),
        source: e,
    })?;

    let mut deps = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Read {
            path: dir.clone(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let bytes = fs::read(&path).map_err(|e| Error::Read {
            path: path.clone(),
            source: e,
        })?;
        match VendorDep::parse(&bytes) {
            Ok(mut dep) => {
                if dep.file_name.is_empty() {
                    if let Some(name) = path.file_name() {
                        dep.file_name = name.to_string_lossy().into_owned();
                    }
                }
                deps.push(dep);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unparsable vendordep");
            }
        }
    }
    Ok(deps)
}

/// Find a project manifest by library name.
pub fn find_by_name(project_dir: &Path, name: &str) -> Result<VendorDep> {
    list_project_deps(project_dir)?
        .into_iter()
        .find(|dep| dep.name == name)
        .ok_or_else(|| Error::NotFound { name: name.into() })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn write_dep(dir: &Path, file: &str, name: &str, uuid: &str) {
        fs::create_dir_all(dir.join(VENDORDEP_DIR)).unwrap();
        let body = format!(
            r#"{{"fileName": "{file}", "name": "{name}", "version": "2025.1.1", "uuid": "{uuid}"}}"#
        );
        fs::write(dir.join(VENDORDEP_DIR).join(file), body).unwrap();
    }

    #[test]
    fn lists_all_manifests() {
        let dir = tempdir().unwrap();
        write_dep(dir.path(), "a.json", "lib-a", "uuid-a");
        write_dep(dir.path(), "b.json", "lib-b", "uuid-b");

        let mut deps = list_project_deps(dir.path()).unwrap();
        deps.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "lib-a");
        assert_eq!(deps[1].name, "lib-b");
    }

    #[test]
    fn unparsable_files_are_skipped() {
        let dir = tempdir().unwrap();
        write_dep(dir.path(), "a.json", "lib-a", "uuid-a");
        fs::write(dir.path().join(VENDORDEP_DIR).join("junk.json"), "{nope").unwrap();

        let deps = list_project_deps(dir.path()).unwrap();
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn find_by_name_reports_missing() {
        let dir = tempdir().unwrap();
        write_dep(dir.path(), "a.json", "lib-a", "uuid-a");

        assert!(find_by_name(dir.path(), "lib-a").is_ok());
        assert!(matches!(
            find_by_name(dir.path(), "lib-z"),
            Err(Error::NotFound { name }) if name == "lib-z"
        ));
    }

    #[test]
    fn missing_directory_is_a_read_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            list_project_deps(dir.path()),
            Err(Error::Read { .. })
        ));
    }
}
