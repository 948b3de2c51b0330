use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One vendor dependency manifest.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDep {
    #[serde(default)]
    pub file_name: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub frc_year: Option<FrcYear>,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub maven_urls: Vec<String>,
    #[serde(default)]
    pub json_url: String,
    #[serde(default)]
    pub java_dependencies: Vec<JavaDependency>,
    #[serde(default)]
    pub jni_dependencies: Vec<JniDependency>,
    #[serde(default)]
    pub cpp_dependencies: Vec<CppDependency>,
}

/// Vendors publish the year as either a string or a bare number.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FrcYear {
    Text(String),
    Number(i64),
}

impl fmt::Display for FrcYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrcYear::Text(s) => f.write_str(s),
            FrcYear::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JniDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default)]
    pub is_jar: bool,
    #[serde(default)]
    pub skip_invalid_platforms: bool,
    #[serde(default)]
    pub valid_platforms: Vec<String>,
    #[serde(default)]
    pub sim_mode: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CppDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default)]
    pub lib_name: String,
    #[serde(default)]
    pub header_classifier: String,
    #[serde(default)]
    pub shared_library: bool,
    #[serde(default)]
    pub skip_invalid_platforms: bool,
    #[serde(default)]
    pub binary_platforms: Vec<String>,
    #[serde(default)]
    pub sim_mode: String,
}

impl VendorDep {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Whether two manifests describe the same dependency in any useful
    /// way: same name and version, same uuid, or (non-strict only) the
    /// same source URL. Empty fields on `other` never match.
    pub fn matches(&self, other: &VendorDep, strict: bool) -> bool {
        if !other.name.is_empty()
            && self.name == other.name
            && !other.version.is_empty()
            && self.version == other.version
        {
            return true;
        }
        if !other.uuid.is_empty() && self.uuid == other.uuid {
            return true;
        }
        if !strict && !other.json_url.is_empty() && self.json_url == other.json_url {
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "fileName": "wpilib-new-commands-2025.1.1.json",
        "name": "wpilib-new-commands",
        "version": "2025.1.1",
        "frcYear": 2025,
        "uuid": "111e24db-3fcd-4323-8533-cab09ff3d63b",
        "mavenUrls": [],
        "jsonUrl": "https://example.com/wpilib-new-commands.json",
        "javaDependencies": [
            {"groupId": "edu.wpi.first", "artifactId": "commands", "version": "2025.1.1"}
        ],
        "jniDependencies": [],
        "cppDependencies": [
            {
                "groupId": "edu.wpi.first",
                "artifactId": "commands-cpp",
                "version": "2025.1.1",
                "libName": "commands",
                "headerClassifier": "headers",
                "sharedLibrary": true,
                "skipInvalidPlatforms": true,
                "binaryPlatforms": ["linuxathena"],
                "simMode": "swsim"
            }
        ]
    }"#;

    #[test]
    fn parses_real_shape() {
        let dep = VendorDep::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dep.name, "wpilib-new-commands");
        assert_eq!(dep.frc_year, Some(FrcYear::Number(2025)));
        assert_eq!(dep.java_dependencies.len(), 1);
        assert_eq!(dep.cpp_dependencies[0].lib_name, "commands");
    }

    #[test]
    fn frc_year_accepts_string_or_number() {
        let text: VendorDep =
            serde_json::from_str(r#"{"name": "a", "frcYear": "2025"}"#).unwrap();
        assert_eq!(text.frc_year.unwrap().to_string(), "2025");
        let number: VendorDep =
            serde_json::from_str(r#"{"name": "a", "frcYear": 2025}"#).unwrap();
        assert_eq!(number.frc_year.unwrap().to_string(), "2025");
    }

    #[test]
    fn matches_on_name_and_version() {
        let a = VendorDep::parse(SAMPLE.as_bytes()).unwrap();
        let mut probe = VendorDep::default();
        probe.name = "wpilib-new-commands".into();
        assert!(!a.matches(&probe, true), "name alone must not match");
        probe.version = "2025.1.1".into();
        assert!(a.matches(&probe, true));
    }

    #[test]
    fn matches_on_uuid() {
        let a = VendorDep::parse(SAMPLE.as_bytes()).unwrap();
        let probe = VendorDep {
            uuid: "111e24db-3fcd-4323-8533-cab09ff3d63b".into(),
            ..Default::default()
        };
        assert!(a.matches(&probe, true));
    }

    #[test]
    fn json_url_matches_only_when_not_strict() {
        let a = VendorDep::parse(SAMPLE.as_bytes()).unwrap();
        let probe = VendorDep {
            json_url: "https://example.com/wpilib-new-commands.json".into(),
            ..Default::default()
        };
        assert!(a.matches(&probe, false));
        assert!(!a.matches(&probe, true));
    }

    #[test]
    fn empty_probe_never_matches() {
        let a = VendorDep::parse(SAMPLE.as_bytes()).unwrap();
        assert!(!a.matches(&VendorDep::default(), false));
    }
}
