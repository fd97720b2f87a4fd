//! Fragment chunks: the elements contributed by one `.dcd` file

use std::path::Path;
use tracing::debug;

use crate::element::{Element, Source};
use crate::record::{ElementRecord, FragmentRecord, RecordError};

/// Elements parsed from a single fragment file
///
/// Every element carries exactly one [`Source`] naming the fragment and the
/// group declared on its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Fragment file name without extension
    pub filename: String,
    pub elements: Vec<Element>,
}

impl Chunk {
    /// Build a chunk from element records attributed to `filename`
    pub fn from_records(filename: &str, records: &[ElementRecord]) -> Result<Self, RecordError> {
        let elements = records
            .iter()
            .map(|record| {
                let source = Source::new(filename, record.group.clone());
                Element::from_record(record, vec![source])
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            filename: filename.to_string(),
            elements,
        })
    }

    pub fn from_fragment(filename: &str, fragment: &FragmentRecord) -> Result<Self, RecordError> {
        Self::from_records(filename, &fragment.elements)
    }

    /// Load a chunk from a `.dcd` file, named after the file stem
    pub fn from_file(path: &Path) -> Result<Self, RecordError> {
        let filename = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let fragment = FragmentRecord::from_file(path)?;
        let chunk = Self::from_fragment(&filename, &fragment)?;
        debug!(
            path = %path.display(),
            elements = chunk.elements.len(),
            "Loaded fragment"
        );
        Ok(chunk)
    }
}
