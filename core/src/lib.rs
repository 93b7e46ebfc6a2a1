//! yamlist - condition engine for YAML list inventories
//!
//! Classifies a list of host records (parsed YAML) with declarative
//! conditions, then turns the admitted records into an inventory of hosts,
//! groups and host variables.
//!
//! # Architecture
//!
//! - [`KeyPath`]: dotted paths with list indices into a record
//! - [`Pattern`]: one condition value (`lit`, `~re`, `!lit`, `!~re`, `null`)
//! - [`ConditionItem`]: keys AND-combined
//! - [`ConditionSet`]: items OR-combined, with an empty-set default
//! - [`Rules`]: `accept`, then `ignore`, plus the [`Grouping`] table
//! - [`InventoryBuilder`]: drives a build into an [`InventorySink`]
//!
//! Conditions are compiled once by a [`Compiler`]. Compilation never fails:
//! malformed conditions become [`Diagnostic`]s and compile into items or
//! patterns that cannot match.
//!
//! # Key invariants
//!
//! 1. **Evaluation is pure**: no condition evaluation mutates the record or
//!    the conditions, and no data-shape problem escapes as an error.
//!
//! 2. **Absent optional → true**: an optional key whose path does not resolve
//!    satisfies its item, in any position.
//!
//! 3. **Trace == evaluate**: `evaluate_with_trace()` always reaches the same
//!    verdict as `evaluate()`.
//!
//! # Example
//!
//! ```
//! use yamlist::prelude::*;
//!
//! let config = InventoryConfig::from_yaml(r#"
//! data_file: hosts.yaml
//! ignore:
//!   - state: poweredOff
//! grouping:
//!   windows:
//!     - vcenter.guest_id: "~^win"
//! "#).unwrap();
//!
//! let records: Vec<Value> = serde_yaml::from_str(r#"
//! - name: rdp01
//!   state: poweredOn
//!   vcenter: {guest_id: windows8Server64Guest}
//! - name: old01
//!   state: poweredOff
//! "#).unwrap();
//!
//! let compiled = config.compile();
//! assert!(compiled.diagnostics.is_empty());
//!
//! let (inventory, summary) = compiled.build(&records, MemoryInventory::new());
//! assert_eq!(summary.added, 1);
//! assert_eq!(inventory.group_hosts("windows"), Some(vec!["rdp01"]));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod condition;
mod condition_set;
mod config;
mod diagnostic;
mod edit;
mod error;
mod grouping;
mod inventory;
mod path;
mod pattern;
mod rules;
mod source;
mod trace;
mod value;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Data
pub use path::{KeyPath, Segment};
pub use value::{parse_bool_flag, Map, Value};

// Conditions
pub use condition::{ConditionItem, ConditionKey};
pub use condition_set::{Compiler, ConditionSet, DEFAULT_OPTIONAL_KEY_PREFIX};
pub use diagnostic::Diagnostic;
pub use grouping::Grouping;
pub use pattern::{MatchVerdict, Pattern, PrefixRegex};
pub use rules::{Admission, Rules};

// Inventory
pub use config::{is_inventory_source, CompiledConfig, InventoryConfig, INVENTORY_SOURCE_SUFFIXES};
pub use inventory::{
    BuildSummary, HostOptions, InventoryBuilder, InventorySink, MemoryInventory, RecordOutcome,
};
pub use source::{load_records, parse_records, render_records, save_records};

// Data file editing
pub use edit::{parse_value, AddOutcome, AddRequest, DataEditor, EditError, SetOutcome};

// Trace types
pub use trace::{Comparison, ItemTrace, KeyTrace, KeyVerdict, SetTrace};

// Errors
pub use error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use yamlist::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Conditions
        Compiler,
        ConditionItem,
        ConditionKey,
        ConditionSet,
        Diagnostic,
        Grouping,
        // Inventory
        HostOptions,
        InventoryBuilder,
        InventoryConfig,
        InventorySink,
        // Data
        KeyPath,
        Map,
        MatchVerdict,
        MemoryInventory,
        Pattern,
        Rules,
        // Trace types
        SetTrace,
        Value,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length for regex patterns.
///
/// Longer `~` / `!~` patterns compile into [`Pattern::InvalidRegex`] and
/// never match.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4096;
