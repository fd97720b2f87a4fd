//! Device Composition Data: merging fragment chunks, validation and the
//! aggregate vendor model view
//!
//! Typical use:
//! 1. [`Dcd::from_record`] from the `.btmeshconf` composition data
//! 2. [`Dcd::add_chunk`] once per fragment file
//! 3. [`Dcd::validate`] after all chunks are folded
//! 4. [`Dcd::finalize`] to compute `unique_vendor_models`

use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::chunk::Chunk;
use crate::element::Element;
use crate::model::{VendorModel, VmidScheme};
use crate::record::{CompositionDataRecord, RecordError};

/// The same file/group pair contributed to two different elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConflict {
    pub filename: String,
    pub group: String,
    pub first: String,
    pub second: String,
}

impl fmt::Display for GroupConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Duplicated group ({}) from same file ({}.dcd) on different elements ({}, {}).",
            self.group, self.filename, self.first, self.second
        )
    }
}

/// Every group conflict found in a merged DCD
#[derive(Error, Debug)]
#[error("{}", join_conflicts(.conflicts))]
pub struct ValidationError {
    pub conflicts: Vec<GroupConflict>,
}

fn join_conflicts(conflicts: &[GroupConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Composition data for a whole node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dcd {
    /// Company identifier
    pub cid: u16,
    /// Product identifier
    pub pid: u16,
    /// Product version identifier
    pub vid: u16,
    pub elements: Vec<Element>,
    /// Deduplicated vendor models across all elements, filled by `finalize`
    pub unique_vendor_models: Vec<VendorModel>,
    pub vmid_scheme: VmidScheme,
}

impl Dcd {
    pub fn new(cid: u16, pid: u16, vid: u16) -> Self {
        Self {
            cid,
            pid,
            vid,
            elements: Vec::new(),
            unique_vendor_models: Vec::new(),
            vmid_scheme: VmidScheme::default(),
        }
    }

    /// Build from the config's composition data; its elements have no source
    pub fn from_record(record: &CompositionDataRecord) -> Result<Self, RecordError> {
        let mut dcd = Self::new(
            record.cid.to_u16("cid")?,
            record.pid.to_u16("pid")?,
            record.vid.to_u16("vid")?,
        );
        dcd.elements = record
            .elements
            .iter()
            .map(|e| Element::from_record(e, Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dcd)
    }

    pub fn with_vmid_scheme(mut self, scheme: VmidScheme) -> Self {
        self.vmid_scheme = scheme;
        self
    }

    pub fn total_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn total_models(&self) -> usize {
        self.elements
            .iter()
            .map(|e| e.num_sig() + e.num_vendor())
            .sum()
    }

    /// Fold a fragment chunk into the element list
    ///
    /// Each incoming element is merged into the first existing element it
    /// is mergeable with, in current list order, or appended otherwise.
    pub fn add_chunk(&mut self, chunk: Chunk) {
        for element in chunk.elements {
            let scheme = self.vmid_scheme;
            match self
                .elements
                .iter_mut()
                .find(|existing| existing.is_mergeable_with(&element, scheme))
            {
                Some(existing) => {
                    debug!(
                        element = %element.name,
                        file = %chunk.filename,
                        "Merging into existing element"
                    );
                    existing.merge_with(element);
                }
                None => {
                    debug!(
                        element = %element.name,
                        file = %chunk.filename,
                        index = self.elements.len(),
                        "Adding new element"
                    );
                    self.elements.push(element);
                }
            }
        }
    }

    /// Check that no file/group pair contributes to two elements
    ///
    /// Such a pair would produce one group macro with two different values.
    /// All conflicts are collected before returning.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut conflicts = Vec::new();

        for (idx, elem) in self.elements.iter().enumerate() {
            for other in &self.elements[idx + 1..] {
                for source in &elem.sources {
                    let Some(group) = source.group_name() else {
                        continue;
                    };
                    if other.sources.contains(source) {
                        conflicts.push(GroupConflict {
                            filename: source.filename.clone(),
                            group: group.to_string(),
                            first: elem.name.clone(),
                            second: other.name.clone(),
                        });
                    }
                }
            }
        }

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { conflicts })
        }
    }

    /// Vendor models across all elements, first occurrence wins
    ///
    /// A model is dropped when an earlier one has the same name or key.
    pub fn collect_vendor_models(&self) -> Vec<VendorModel> {
        let mut unique: Vec<VendorModel> = Vec::new();
        for model in self.elements.iter().flat_map(|e| &e.vendor_models) {
            let vmid = model.vmid(self.vmid_scheme);
            let duplicated = unique
                .iter()
                .any(|u| u.name == model.name || u.vmid(self.vmid_scheme) == vmid);
            if !duplicated {
                unique.push(model.clone());
            }
        }
        unique
    }

    /// Compute the derived vendor model list; call once after validation
    pub fn finalize(&mut self) {
        self.unique_vendor_models = self.collect_vendor_models();
        info!(
            elements = self.total_elements(),
            models = self.total_models(),
            vendor_models = self.unique_vendor_models.len(),
            "Composition data finalized"
        );
    }
}
