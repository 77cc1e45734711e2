//! Hierarchical configuration store and management query contract.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Registry hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Hive {
    #[default]
    #[serde(rename = "HKLM", alias = "LocalMachine")]
    LocalMachine,
    #[serde(rename = "HKCU", alias = "CurrentUser")]
    CurrentUser,
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalMachine => f.write_str("HKLM"),
            Self::CurrentUser => f.write_str("HKCU"),
        }
    }
}

/// Registry view. On a 64-bit OS the 32-bit view is the redirected
/// `Wow6432Node` layout used by 32-bit installers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    #[serde(rename = "32", alias = "Registry32")]
    Registry32,
    #[serde(rename = "64", alias = "Registry64")]
    Registry64,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry32 => f.write_str("32"),
            Self::Registry64 => f.write_str("64"),
        }
    }
}

/// One row of a management query: property name to its textual value.
pub type PropertyBag = BTreeMap<String, String>;

/// Read-only queries against the registry, the management engine and the
/// service table.
///
/// Absence is never an error here: a missing key or value reads as `None`,
/// a missing service as `false`, a query without rows as an empty vector.
/// Only transport-level failures come back as `Err`.
pub trait ConfigStore {
    fn read_value(
        &self,
        hive: Hive,
        view: View,
        key_path: &str,
        value_name: &str,
    ) -> Result<Option<String>>;

    fn key_exists(&self, hive: Hive, view: View, key_path: &str) -> Result<bool>;

    fn query_management(&self, namespace: &str, query: &str) -> Result<Vec<PropertyBag>>;

    fn is_service_registered(&self, name: &str) -> Result<bool>;
}
