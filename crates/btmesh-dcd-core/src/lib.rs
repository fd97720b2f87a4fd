//! btmesh-dcd Core - Bluetooth Mesh Device Composition Data model and merging
//!
//! This crate provides the pieces needed to assemble a node's composition
//! data from independently authored fragment files:
//! - Input records for the `.btmeshconf` config and `.dcd` fragments
//! - SIG/vendor model, element and DCD types
//! - Chunk folding with model collision aware element merging
//! - Cross-fragment group validation and the unique vendor model view
//! - Macro-safe identifier derivation for the generated header

pub mod chunk;
pub mod dcd;
pub mod element;
pub mod macros;
pub mod model;
pub mod record;

pub use chunk::Chunk;
pub use dcd::{Dcd, GroupConflict, ValidationError};
pub use element::{Element, Source, VendorModelConflict};
pub use macros::to_c_macro;
pub use model::{SigModel, VendorModel, Vmid, VmidScheme};
pub use record::{ConfigRecord, FragmentRecord, Literal, RecordError};
