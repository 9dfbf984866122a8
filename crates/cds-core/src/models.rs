use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ── CompilationTier ───────────────────────────────────────────────────────────

/// A compilation level bucket, written `L<k>` in the log (e.g. `L2`).
///
/// Ordered by level so tier-keyed maps iterate from the lowest tier upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompilationTier(u32);

/// A tier label that is not `L` followed by a non-negative integer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid compilation tier label: '{0}'")]
pub struct InvalidTier(pub String);

impl CompilationTier {
    pub fn new(level: u32) -> Self {
        Self(level)
    }

    /// Numeric compilation level.
    pub fn level(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CompilationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl FromStr for CompilationTier {
    type Err = InvalidTier;

    /// Accepts both the bare label (`L3`) and the log marker form (`(L3):`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s
            .trim()
            .trim_end_matches(':')
            .trim_start_matches('(')
            .trim_end_matches(')');
        label
            .strip_prefix('L')
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map(CompilationTier)
            .ok_or_else(|| InvalidTier(s.to_string()))
    }
}

impl Serialize for CompilationTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CompilationTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Qualified member identifiers (`Class::member(...)`) grouped by tier.
pub type TierEntries = BTreeMap<CompilationTier, Vec<String>>;

// ── Root ──────────────────────────────────────────────────────────────────────

/// A heap mirror object pending restoration, keyed by its root identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    pub class_name: String,
    pub pointer: String,
}

impl Root {
    pub fn new(class_name: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            pointer: pointer.into(),
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Root[className={}, pointer={}]",
            self.class_name, self.pointer
        )
    }
}

// ── MirrorLists ───────────────────────────────────────────────────────────────

/// Class names whose mirror was recreated fresh or restored from the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorLists {
    pub recreate: Vec<String>,
    pub restored: Vec<String>,
}

impl MirrorLists {
    /// Total mirrored classes, recreated and restored.
    pub fn total(&self) -> usize {
        self.recreate.len() + self.restored.len()
    }
}

// ── CdsReport ─────────────────────────────────────────────────────────────────

/// Mutable parts gathered during a parse, handed over to [`CdsReport::freeze`].
#[derive(Debug, Clone, Default)]
pub struct ReportParts {
    pub mirror: MirrorLists,
    pub unshareable: BTreeMap<String, Vec<String>>,
    pub vtables: BTreeMap<String, u32>,
    pub roots: BTreeMap<String, Root>,
    pub scc_total_entries: u64,
    pub scc: TierEntries,
    pub scc_nmethod: TierEntries,
    pub errors_heap_objects: Vec<String>,
    pub errors_vtables: Vec<String>,
}

/// Immutable statistics extracted from one CDS log.
///
/// Built once, at the end of the stream; there is no way to mutate it
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdsReport {
    mirror: MirrorLists,
    unshareable: BTreeMap<String, Vec<String>>,
    vtables: BTreeMap<String, u32>,
    roots: BTreeMap<String, Root>,
    scc_total_entries: u64,
    scc: TierEntries,
    scc_nmethod: TierEntries,
    errors_heap_objects: Vec<String>,
    errors_vtables: Vec<String>,
}

impl CdsReport {
    /// Freeze the accumulated parts into a report.
    pub fn freeze(parts: ReportParts) -> Self {
        Self {
            mirror: parts.mirror,
            unshareable: parts.unshareable,
            vtables: parts.vtables,
            roots: parts.roots,
            scc_total_entries: parts.scc_total_entries,
            scc: parts.scc,
            scc_nmethod: parts.scc_nmethod,
            errors_heap_objects: parts.errors_heap_objects,
            errors_vtables: parts.errors_vtables,
        }
    }

    /// Recreated and restored mirror lists.
    pub fn mirror(&self) -> &MirrorLists {
        &self.mirror
    }

    /// Class loader name → classes restored by that loader, in log order.
    pub fn unshareable(&self) -> &BTreeMap<String, Vec<String>> {
        &self.unshareable
    }

    /// Metadata kind → copied vtable entry count.
    pub fn vtables(&self) -> &BTreeMap<String, u32> {
        &self.vtables
    }

    /// Root identifier → registered root.
    pub fn roots(&self) -> &BTreeMap<String, Root> {
        &self.roots
    }

    /// Declared total entry count of the startup code cache.
    pub fn scc_total_entries(&self) -> u64 {
        self.scc_total_entries
    }

    /// Shared method lookups by tier.
    pub fn scc(&self) -> &TierEntries {
        &self.scc
    }

    /// nmethods read back from the code cache, by tier.
    pub fn scc_nmethod(&self) -> &TierEntries {
        &self.scc_nmethod
    }

    pub fn errors_heap_objects(&self) -> &[String] {
        &self.errors_heap_objects
    }

    pub fn errors_vtables(&self) -> &[String] {
        &self.errors_vtables
    }

    /// Total classes restored through any class loader.
    pub fn unshareable_total(&self) -> usize {
        self.unshareable.values().map(Vec::len).sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
