//! Vendor dependency manifest value model.
//!
//! A vendordep is a JSON manifest describing one third-party library for
//! a robot project: maven coordinates per language plus identity fields
//! (name, version, uuid, source URL). This crate owns parsing, the
//! value-comparison matching policy, and the versioned-filename
//! convention used by the online marketplace listing.

pub use error::{Error, Result};
pub use model::{CppDependency, FrcYear, JavaDependency, JniDependency, VendorDep};
pub use name::{VersionedName, split_versioned_name};
pub use project::{VENDORDEP_DIR, find_by_name, list_project_deps};

mod error;
mod model;
mod name;
mod project;
