//! Ordered candidate evaluation.
//!
//! Each resolver describes its evidence as a list of `(probe, outcome)`
//! pairs. The list is walked in order and the first probe that yields a
//! non-blank value accepted by the caller wins. Later candidates are never
//! read once a match is found.

use std::fmt;

use offscrub_platform::{ConfigStore, Hive, View};
use tracing::{debug, trace};

use crate::Result;

/// One registry value under `HKLM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub view: View,
    pub key: String,
    pub value: &'static str,
}

impl Probe {
    pub fn new(view: View, key: impl Into<String>, value: &'static str) -> Self {
        Self {
            view,
            key: key.into(),
            value,
        }
    }

    /// Read the value, treating blank strings as absent.
    pub fn read<S: ConfigStore + ?Sized>(&self, store: &S) -> Result<Option<String>> {
        let raw = store.read_value(Hive::LocalMachine, self.view, &self.key, self.value)?;
        Ok(raw.filter(|v| !v.trim().is_empty()))
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r"HKLM\{}\{} ({}-bit view)", self.key, self.value, self.view)
    }
}

#[derive(Debug, Clone)]
pub struct Candidate<T> {
    pub probe: Probe,
    pub outcome: T,
}

impl<T> Candidate<T> {
    pub fn new(probe: Probe, outcome: T) -> Self {
        Self { probe, outcome }
    }
}

/// Walk `candidates` in order. `decide` sees the outcome attached to each
/// probe that produced a value and may reject it to continue the walk.
pub fn first_match<S, T, R, F>(store: &S, candidates: &[Candidate<T>], mut decide: F) -> Result<Option<R>>
where
    S: ConfigStore + ?Sized,
    F: FnMut(&T, &str) -> Option<R>,
{
    for candidate in candidates {
        let Some(value) = candidate.probe.read(store)? else {
            trace!(probe = %candidate.probe, "no value");
            continue;
        };
        match decide(&candidate.outcome, &value) {
            Some(found) => {
                debug!(probe = %candidate.probe, value = %value, "candidate matched");
                return Ok(Some(found));
            }
            None => trace!(probe = %candidate.probe, value = %value, "candidate rejected"),
        }
    }
    Ok(None)
}
