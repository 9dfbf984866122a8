//! Per-category handlers and the state they accumulate.
//!
//! Every handler works on the current message only, except the heap
//! `Clearing root` case which also looks at the message right before it.
//! Messages that match none of their category's shapes are dropped.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use cds_core::models::{CompilationTier, MirrorLists, ReportParts, Root, TierEntries};
use regex::Regex;
use tracing::debug;

use crate::anomaly::{Anomaly, ErrorLog};
use crate::category::Category;
use crate::lookback::LookbackBuffer;

/// Suffix of a mirror message announcing a raw archived mirror for a class.
pub const HAS_RAW_ARCHIVED_MIRROR: &str = "has raw archived mirror";

// ── Message shapes ────────────────────────────────────────────────────────────

// [cds,vtables] Copying 41 vtable entries for InstanceKlass
static VTABLE_COPY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Copying\s+(\d+)\s+vtable entries for\s+(\S+)").expect("regex is valid")
});

// [cds,heap] Clearing root 12: was 0x00000007ffe7afc0
static CLEARING_ROOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Clearing root\s+([^:\s]+):\s*(?:was\s+)?(\S+)").expect("regex is valid")
});

// [cds,heap,mirror] Restored java.lang.Thread archived mirror 0x00000007ffe7afc0
static RESTORED_MIRROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Restored\s+(\S+)\s+archived mirror\s+(\S+)").expect("regex is valid")
});

// [cds,mirror] Recreate mirror for java.lang.Thread
static RECREATE_MIRROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Recreate mirror for\s+(.+)").expect("regex is valid"));

// [cds,unshareable] restore: java.lang.Thread with class loader: boot
static UNSHAREABLE_RESTORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"restore:\s+(\S+)\s+with class loader:\s+(.+)").expect("regex is valid")
});

// [scc,init] Read 2403 entries table at offset 154160 from AOT Code Cache
static SCC_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+entries table at offset\s+\d+").expect("regex is valid")
});

// [scc,nmethod] 427 (L2): Reading nmethod 'java.lang.Byte::toUnsignedInt(B)I' (decomp: 0, hash: 0xdeef4a7d)
static NMETHOD_READ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((L\d+)\):\s+Reading nmethod\s+'([^']+)'").expect("regex is valid")
});

// [scc,stubs] 12 (L1): Shared method lookup: java.lang.Object::<init>()V
static METHOD_LOOKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((L\d+)\):\s+Shared method lookup:?\s+'?([^'\s]+)").expect("regex is valid")
});

/// Class name in front of the raw archived mirror marker, if `message` ends
/// with it.
pub fn class_with_raw_mirror(message: &str) -> Option<&str> {
    message
        .strip_suffix(HAS_RAW_ARCHIVED_MIRROR)
        .map(str::trim_end)
        .filter(|class_name| !class_name.is_empty())
}

// ── CorrelationState ──────────────────────────────────────────────────────────

/// Everything accumulated while streaming a log.
#[derive(Debug, Default)]
pub struct CorrelationState {
    mirror: MirrorLists,
    unshareable: BTreeMap<String, Vec<String>>,
    /// Every class seen in any loader's restore sequence.
    restore_attempts: HashSet<String>,
    vtables: BTreeMap<String, u32>,
    roots: BTreeMap<String, Root>,
    /// Class name → identifier of the first root registered for it.
    roots_by_class: HashMap<String, String>,
    scc_total_entries: u64,
    method_lookups: TierEntries,
    nmethod_entries: TierEntries,
    errors_heap_objects: Vec<String>,
    errors_vtables: Vec<String>,
}

impl CorrelationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `message` to the handler for `category`.
    pub fn apply(&mut self, category: Category, message: &str, lookback: &LookbackBuffer) {
        match category {
            Category::Vtables => self.on_vtables(message),
            Category::Heap => self.on_heap(message, lookback),
            Category::Mirror => self.on_mirror(message),
            Category::Unshareable => self.on_unshareable(message),
            Category::SccInit => self.on_scc_init(message),
            Category::Scc => self.on_scc(message),
            Category::Unclassified => {}
        }
    }

    /// Hand the accumulated data over to the report builder.
    pub fn into_parts(self) -> ReportParts {
        ReportParts {
            mirror: self.mirror,
            unshareable: self.unshareable,
            vtables: self.vtables,
            roots: self.roots,
            scc_total_entries: self.scc_total_entries,
            scc: self.method_lookups,
            scc_nmethod: self.nmethod_entries,
            errors_heap_objects: self.errors_heap_objects,
            errors_vtables: self.errors_vtables,
        }
    }

    fn record(&mut self, anomaly: Anomaly) {
        debug!("Correlation anomaly: {}", anomaly);
        let text = anomaly.to_string();
        match anomaly.log() {
            ErrorLog::HeapObjects => self.errors_heap_objects.push(text),
            ErrorLog::Vtables => self.errors_vtables.push(text),
        }
    }

    // ── Handlers ──────────────────────────────────────────────────────────────

    fn on_vtables(&mut self, message: &str) {
        let Some(caps) = VTABLE_COPY.captures(message) else {
            return;
        };
        let Ok(count) = caps[1].parse::<u32>() else {
            return;
        };
        let class_name = &caps[2];

        match self.vtables.get(class_name) {
            Some(&previous) => self.record(Anomaly::RepeatedVtable {
                class_name: class_name.to_string(),
                previous,
                current: count,
            }),
            None => {
                self.vtables.insert(class_name.to_string(), count);
            }
        }
    }

    fn on_heap(&mut self, message: &str, lookback: &LookbackBuffer) {
        if let Some(caps) = CLEARING_ROOT.captures(message) {
            self.clear_root(&caps[1], &caps[2], lookback);
        } else if let Some(caps) = RESTORED_MIRROR.captures(message) {
            self.restore_mirror(&caps[1], &caps[2]);
        }
    }

    /// A cleared root is only meaningful right after the marker line naming
    /// its class.
    fn clear_root(&mut self, root_id: &str, pointer: &str, lookback: &LookbackBuffer) {
        let Some(class_name) = lookback.latest().and_then(class_with_raw_mirror) else {
            return;
        };

        if let Some(previous) = self.roots.get(root_id) {
            let anomaly = Anomaly::DuplicateRoot {
                root_id: root_id.to_string(),
                previous: previous.clone(),
                class_name: class_name.to_string(),
                pointer: pointer.to_string(),
            };
            self.record(anomaly);
            return;
        }

        self.roots
            .insert(root_id.to_string(), Root::new(class_name, pointer));
        self.roots_by_class
            .entry(class_name.to_string())
            .or_insert_with(|| root_id.to_string());
    }

    fn restore_mirror(&mut self, class_name: &str, pointer: &str) {
        self.mirror.restored.push(class_name.to_string());

        let root = self
            .roots_by_class
            .get(class_name)
            .and_then(|root_id| self.roots.get(root_id));

        let anomaly = match root {
            None => Anomaly::MissingRestoredRoot {
                class_name: class_name.to_string(),
                pointer: pointer.to_string(),
            },
            Some(root) if root.pointer != pointer => Anomaly::PointerMismatch {
                class_name: class_name.to_string(),
                expected: root.pointer.clone(),
                actual: pointer.to_string(),
            },
            Some(_) => return,
        };
        self.record(anomaly);
    }

    fn on_mirror(&mut self, message: &str) {
        if let Some(caps) = RECREATE_MIRROR.captures(message) {
            self.mirror.recreate.push(caps[1].trim().to_string());
        } else if let Some(class_name) = class_with_raw_mirror(message) {
            if !self.restore_attempts.contains(class_name) {
                self.record(Anomaly::OutOfOrderMirror {
                    class_name: class_name.to_string(),
                    message: message.to_string(),
                });
            }
        }
    }

    fn on_unshareable(&mut self, message: &str) {
        let Some(caps) = UNSHAREABLE_RESTORE.captures(message) else {
            return;
        };
        let class_name = caps[1].to_string();
        let loader = caps[2].trim().to_string();

        self.restore_attempts.insert(class_name.clone());
        self.unshareable.entry(loader).or_default().push(class_name);
    }

    /// Repeated declarations overwrite the total; the last one wins.
    fn on_scc_init(&mut self, message: &str) {
        let Some(total) = SCC_TABLE
            .captures(message)
            .and_then(|caps| caps[1].parse::<u64>().ok())
        else {
            return;
        };
        if self.scc_total_entries != 0 && self.scc_total_entries != total {
            debug!(
                "SCC entry total redeclared: {} -> {}",
                self.scc_total_entries, total
            );
        }
        self.scc_total_entries = total;
    }

    fn on_scc(&mut self, message: &str) {
        if message.contains("Reading nmethod") {
            if let Some((tier, identifier)) = tiered_identifier(&NMETHOD_READ, message) {
                self.nmethod_entries.entry(tier).or_default().push(identifier);
            }
        } else if message.contains("Shared method lookup") {
            if let Some((tier, identifier)) = tiered_identifier(&METHOD_LOOKUP, message) {
                self.method_lookups.entry(tier).or_default().push(identifier);
            }
        }
    }
}

/// Extract the `(L<k>):` tier and the identifier captured by `pattern`.
fn tiered_identifier(pattern: &Regex, message: &str) -> Option<(CompilationTier, String)> {
    let caps = pattern.captures(message)?;
    let tier = caps[1].parse().ok()?;
    Some((tier, caps[2].to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
