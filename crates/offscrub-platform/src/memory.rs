//! In-memory platform backend.
//!
//! Holds a snapshot of registry values, management query rows, registered
//! services and host facts. Key paths, value names, service names and
//! environment names compare case-insensitively, the way Windows does.
//! Snapshots load from TOML:
//!
//! ```toml
//! file_version = "10.0.19045.0"
//! services = ["ClickToRunSvc"]
//!
//! [[value]]
//! view = "64"
//! key = 'SOFTWARE\Microsoft\Office\ClickToRun\Configuration'
//! name = "Platform"
//! data = "x64"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::host::{FileVersion, HostProbe};
use crate::store::{ConfigStore, Hive, PropertyBag, View};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    #[serde(default)]
    pub hive: Hive,
    pub view: View,
    pub key: String,
    pub name: String,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredKey {
    #[serde(default)]
    pub hive: Hive,
    pub view: View,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuery {
    pub namespace: String,
    pub query: String,
    #[serde(default)]
    pub rows: Vec<PropertyBag>,
}

/// Surfaces that answer with a transport failure instead of data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offline {
    pub registry: bool,
    pub management: bool,
    pub services: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryPlatform {
    file_version: Option<FileVersion>,
    is_64bit: bool,
    arm_marker: bool,
    any_server: bool,
    branding: BTreeMap<String, String>,
    env: BTreeMap<String, String>,
    services: Vec<String>,
    #[serde(rename = "value")]
    values: Vec<StoredValue>,
    #[serde(rename = "key")]
    keys: Vec<StoredKey>,
    #[serde(rename = "query")]
    queries: Vec<StoredQuery>,
    offline: Offline,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self {
            file_version: None,
            is_64bit: true,
            arm_marker: false,
            any_server: false,
            branding: BTreeMap::new(),
            env: BTreeMap::new(),
            services: Vec::new(),
            values: Vec::new(),
            keys: Vec::new(),
            queries: Vec::new(),
            offline: Offline::default(),
        }
    }
}

impl MemoryPlatform {
    /// An empty 64-bit host with no version resource.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| Error::Snapshot(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
            .map_err(|e| Error::Snapshot(format!("{}: {e}", path.display())))
    }

    pub fn with_file_version(mut self, version: FileVersion) -> Self {
        self.file_version = Some(version);
        self
    }

    pub fn with_64bit(mut self, is_64bit: bool) -> Self {
        self.is_64bit = is_64bit;
        self
    }

    pub fn with_arm_marker(mut self, present: bool) -> Self {
        self.arm_marker = present;
        self
    }

    pub fn with_server(mut self, any_server: bool) -> Self {
        self.any_server = any_server;
        self
    }

    pub fn with_branding(mut self, ids: impl Into<String>, text: impl Into<String>) -> Self {
        self.branding.insert(ids.into(), text.into());
        self
    }

    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Store a value under `HKLM` in the given view.
    pub fn with_value(
        mut self,
        view: View,
        key: impl Into<String>,
        name: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        self.values.push(StoredValue {
            hive: Hive::LocalMachine,
            view,
            key: key.into(),
            name: name.into(),
            data: data.into(),
        });
        self
    }

    /// Register an empty key under `HKLM` in the given view.
    pub fn with_key(mut self, view: View, key: impl Into<String>) -> Self {
        self.keys.push(StoredKey {
            hive: Hive::LocalMachine,
            view,
            key: key.into(),
        });
        self
    }

    pub fn with_service(mut self, name: impl Into<String>) -> Self {
        self.services.push(name.into());
        self
    }

    /// Append one row to the result set of `query` in `namespace`.
    pub fn with_query_row<K, V>(
        mut self,
        namespace: &str,
        query: &str,
        row: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let row: PropertyBag = row.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        match self
            .queries
            .iter_mut()
            .find(|q| same_query(&q.namespace, namespace) && same_query(&q.query, query))
        {
            Some(existing) => existing.rows.push(row),
            None => self.queries.push(StoredQuery {
                namespace: namespace.to_string(),
                query: query.to_string(),
                rows: vec![row],
            }),
        }
        self
    }

    pub fn with_offline(mut self, offline: Offline) -> Self {
        self.offline = offline;
        self
    }

    /// Make every management query fail at the transport level.
    pub fn with_transport_failure(mut self) -> Self {
        self.offline.management = true;
        self
    }

    fn registry_online(&self, key_path: &str) -> Result<()> {
        if self.offline.registry {
            return Err(Error::Transport(format!("registry offline reading {key_path}")));
        }
        Ok(())
    }
}

impl ConfigStore for MemoryPlatform {
    fn read_value(
        &self,
        hive: Hive,
        view: View,
        key_path: &str,
        value_name: &str,
    ) -> Result<Option<String>> {
        self.registry_online(key_path)?;
        let key = normalize_key(key_path);
        let found = self
            .values
            .iter()
            .find(|v| {
                v.hive == hive
                    && v.view == view
                    && normalize_key(&v.key) == key
                    && v.name.eq_ignore_ascii_case(value_name)
            })
            .map(|v| v.data.clone());
        trace!(%hive, %view, key_path, value_name, found = found.is_some(), "memory registry read");
        Ok(found)
    }

    fn key_exists(&self, hive: Hive, view: View, key_path: &str) -> Result<bool> {
        self.registry_online(key_path)?;
        let key = normalize_key(key_path);
        let covers = |stored: &str| {
            let stored = normalize_key(stored);
            stored == key
                || stored
                    .strip_prefix(key.as_str())
                    .is_some_and(|rest| rest.starts_with('\\'))
        };

        let explicit = self
            .keys
            .iter()
            .any(|k| k.hive == hive && k.view == view && covers(&k.key));
        let implied = self
            .values
            .iter()
            .any(|v| v.hive == hive && v.view == view && covers(&v.key));
        Ok(explicit || implied)
    }

    fn query_management(&self, namespace: &str, query: &str) -> Result<Vec<PropertyBag>> {
        if self.offline.management {
            return Err(Error::Transport(format!(
                "management engine offline for '{query}' in {namespace}"
            )));
        }
        Ok(self
            .queries
            .iter()
            .find(|q| same_query(&q.namespace, namespace) && same_query(&q.query, query))
            .map(|q| q.rows.clone())
            .unwrap_or_default())
    }

    fn is_service_registered(&self, name: &str) -> Result<bool> {
        if self.offline.services {
            return Err(Error::Transport(format!("service manager offline looking up {name}")));
        }
        Ok(self.services.iter().any(|s| s.eq_ignore_ascii_case(name)))
    }
}

impl HostProbe for MemoryPlatform {
    fn system_file_version(&self) -> Result<FileVersion> {
        self.file_version
            .ok_or_else(|| Error::NotAvailable("system file version".to_string()))
    }

    fn is_64bit_os(&self) -> bool {
        self.is_64bit
    }

    fn arm_marker_present(&self) -> bool {
        self.arm_marker
    }

    fn os_branding(&self, ids: &str) -> Option<String> {
        self.branding
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(ids))
            .map(|(_, v)| v.clone())
    }

    fn is_any_server(&self) -> bool {
        self.any_server
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }
}

fn normalize_key(path: &str) -> String {
    path.replace('/', "\\")
        .trim_matches('\\')
        .to_ascii_lowercase()
}

fn same_query(a: &str, b: &str) -> bool {
    let squash = |s: &str| {
        s.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase()
    };
    squash(a) == squash(b)
}
