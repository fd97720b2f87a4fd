//! Mesh elements and the sources that contributed to them
//!
//! An [`Element`] is one addressable unit of the node. Fragment files each
//! contribute a partial element; the merge engine in [`crate::dcd`] folds
//! partial elements with the same name together as long as their models do
//! not collide.

use std::collections::HashSet;
use std::fmt;
use tracing::warn;

use crate::macros::to_c_macro;
use crate::model::{SigModel, VendorModel, VmidScheme};
use crate::record::{ElementRecord, RecordError};

/// Origin of an element contribution: a fragment file and optional group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    /// Fragment file name without extension
    pub filename: String,
    pub group: Option<String>,
}

impl Source {
    pub fn new(filename: impl Into<String>, group: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            group,
        }
    }

    /// The group label, if present and non-empty
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref().filter(|g| !g.is_empty())
    }

    pub fn has_group(&self) -> bool {
        self.group_name().is_some()
    }
}

/// Vendor models within one element that share a name or model ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorModelConflict {
    DuplicateName(String),
    DuplicateMid(u16),
}

impl fmt::Display for VendorModelConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName(name) => write!(f, "duplicated vendor model name: '{}'", name),
            Self::DuplicateMid(mid) => write!(f, "duplicated vendor model ID (mid): {:#x}", mid),
        }
    }
}

/// A mesh element with its SIG and vendor models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// GATT Bluetooth Namespace Descriptor location
    pub location: u16,
    pub sig_models: Vec<SigModel>,
    pub vendor_models: Vec<VendorModel>,
    pub sources: Vec<Source>,
}

impl Element {
    /// Create an empty element with no models or sources
    pub fn new(name: impl Into<String>, location: u16) -> Self {
        Self {
            name: name.into(),
            location,
            sig_models: Vec::new(),
            vendor_models: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Build an element from a decoded record
    ///
    /// Vendor model name/ID collisions inside the record are logged, not
    /// rejected; the element keeps every model it was given.
    pub fn from_record(record: &ElementRecord, sources: Vec<Source>) -> Result<Self, RecordError> {
        let location = record.location.to_u16("location")?;
        let sig_models = record
            .sig_models
            .iter()
            .map(SigModel::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        let vendor_models = record
            .vendor_models
            .iter()
            .map(VendorModel::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        for conflict in Self::check_vendor_models(&vendor_models) {
            warn!(element = %record.name, "In element '{}': {}", record.name, conflict);
        }

        Ok(Self {
            name: record.name.clone(),
            location,
            sig_models,
            vendor_models,
            sources,
        })
    }

    /// Find vendor models sharing a name or model ID
    ///
    /// Each pair is reported once; a shared name takes precedence over a
    /// shared ID for the same pair.
    pub fn check_vendor_models(models: &[VendorModel]) -> Vec<VendorModelConflict> {
        let mut conflicts = Vec::new();
        for (i, model) in models.iter().enumerate() {
            for other in &models[i + 1..] {
                if model.name == other.name {
                    conflicts.push(VendorModelConflict::DuplicateName(model.name.clone()));
                } else if model.mid == other.mid {
                    conflicts.push(VendorModelConflict::DuplicateMid(model.mid));
                }
            }
        }
        conflicts
    }

    /// File names of every contributing source, in contribution order
    pub fn filenames(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.filename.as_str()).collect()
    }

    pub fn num_sig(&self) -> usize {
        self.sig_models.len()
    }

    pub fn num_vendor(&self) -> usize {
        self.vendor_models.len()
    }

    /// One element index macro per contributing source
    pub fn macros(&self) -> Vec<String> {
        self.filenames()
            .into_iter()
            .map(|filename| to_c_macro(&format!("{}_{}", filename, self.name)))
            .collect()
    }

    /// One group index macro per distinct `(filename, group)` pair
    ///
    /// A file may contribute the same group to an element more than once;
    /// those collapse to a single macro since name and value are identical.
    pub fn group_macros(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.sources
            .iter()
            .filter_map(|s| s.group_name().map(|g| (s.filename.as_str(), g)))
            .filter(|pair| seen.insert(*pair))
            .map(|(filename, group)| {
                to_c_macro(&format!("{}_group_{}_elem_index", filename, group))
            })
            .collect()
    }

    /// Whether `other` describes more models for this same element
    ///
    /// Names must match and neither SIG model IDs nor vendor model keys
    /// may overlap.
    pub fn is_mergeable_with(&self, other: &Element, scheme: VmidScheme) -> bool {
        if self.name != other.name {
            return false;
        }

        let sig_mids: HashSet<u16> = self.sig_models.iter().map(|m| m.mid).collect();
        if other.sig_models.iter().any(|m| sig_mids.contains(&m.mid)) {
            return false;
        }

        let vmids: HashSet<_> = self.vendor_models.iter().map(|m| m.vmid(scheme)).collect();
        !other
            .vendor_models
            .iter()
            .any(|m| vmids.contains(&m.vmid(scheme)))
    }

    /// Append the models and sources of `other`, without re-validation
    pub fn merge_with(&mut self, other: Element) {
        self.sig_models.extend(other.sig_models);
        self.vendor_models.extend(other.vendor_models);
        self.sources.extend(other.sources);
    }
}
