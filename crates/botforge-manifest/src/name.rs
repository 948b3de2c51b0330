use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

// breaks "name-of-library-v2025.9.28.json" into the library name and
// the version
static VERSIONED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)-v?(\d+\.\d+(?:\.\d+)?)").expect("versioned-name pattern"));

/// A marketplace file name split into its library name and version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionedName {
    pub name: String,
    pub version: String,
}

/// Split a versioned file name; fails for names outside the convention.
pub fn split_versioned_name(file_name: &str) -> Result<VersionedName> {
    let captures = VERSIONED
        .captures(file_name)
        .ok_or_else(|| Error::BadFileName {
            name: file_name.to_string(),
        })?;
    Ok(VersionedName {
        name: captures[1].to_string(),
        version: captures[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_v_prefixed_versions() {
        let split = split_versioned_name("photonlib-v2025.1.1.json").unwrap();
        assert_eq!(split.name, "photonlib");
        assert_eq!(split.version, "2025.1.1");
    }

    #[test]
    fn splits_bare_versions() {
        let split = split_versioned_name("wpilib-new-commands-2025.1.1.json").unwrap();
        assert_eq!(split.name, "wpilib-new-commands");
        assert_eq!(split.version, "2025.1.1");
    }

    #[test]
    fn accepts_two_component_versions() {
        let split = split_versioned_name("maple-sim-0.4.json").unwrap();
        assert_eq!(split.name, "maple-sim");
        assert_eq!(split.version, "0.4");
    }

    #[test]
    fn rejects_unversioned_names() {
        assert!(matches!(
            split_versioned_name("README.md"),
            Err(Error::BadFileName { .. })
        ));
    }
}
