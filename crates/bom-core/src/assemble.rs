//! Final BOM document assembly and serialization.

use serde::{Deserialize, Serialize};

use crate::aggregate::BomEntry;

/// Assembled BOM: ordered entries plus summary counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BomDocument {
    pub project: String,
    /// Design sources the components came from (sheet or file names).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    pub entries: Vec<BomEntry>,
    /// Total placed components across all entries.
    pub total_components: usize,
    pub unique_entries: usize,
}

impl BomDocument {
    /// Assemble entries into a document. Fitted lines come first, DNP lines
    /// after, each block ordered by first reference in natural order.
    pub fn new(project: impl Into<String>, sources: Vec<String>, mut entries: Vec<BomEntry>) -> Self {
        entries.sort_by(|a, b| {
            a.dnp
                .cmp(&b.dnp)
                .then_with(|| a.first_reference().cmp(b.first_reference()))
        });
        let total_components = entries.iter().map(|e| e.quantity).sum();
        let unique_entries = entries.len();
        Self {
            project: project.into(),
            sources,
            entries,
            total_components,
            unique_entries,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
