//! SIG and vendor mesh model types

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::macros::to_c_macro;
use crate::record::{RecordError, SigModelRecord, VendorModelRecord};

/// A Bluetooth SIG defined model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigModel {
    /// 16-bit SIG model identifier
    pub mid: u16,
    pub name: String,
}

impl SigModel {
    pub fn new(mid: u16, name: impl Into<String>) -> Self {
        Self {
            mid,
            name: name.into(),
        }
    }

    pub fn from_record(record: &SigModelRecord) -> Result<Self, RecordError> {
        Ok(Self {
            mid: record.mid.to_u16("sig_models.mid")?,
            name: record.name.clone(),
        })
    }
}

/// A vendor defined model, scoped by company identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorModel {
    /// 16-bit vendor-assigned model identifier
    pub mid: u16,
    /// Bluetooth SIG assigned company identifier
    pub cid: u16,
    pub name: String,
}

impl VendorModel {
    pub fn new(mid: u16, cid: u16, name: impl Into<String>) -> Self {
        Self {
            mid,
            cid,
            name: name.into(),
        }
    }

    pub fn from_record(record: &VendorModelRecord) -> Result<Self, RecordError> {
        Ok(Self {
            mid: record.mid.to_u16("vendor_models.mid")?,
            cid: record.cid.to_u16("vendor_models.cid")?,
            name: record.name.clone(),
        })
    }

    /// Combined comparison key for this model
    pub fn vmid(&self, scheme: VmidScheme) -> Vmid {
        match scheme {
            VmidScheme::Legacy => Vmid::shifted(u64::from(self.mid), 16 + u32::from(self.cid)),
            VmidScheme::Packed => {
                Vmid::shifted((u64::from(self.mid) << 16) | u64::from(self.cid), 0)
            }
        }
    }

    /// Identifier used for the model's macros in the generated header
    pub fn macro_name(&self) -> String {
        to_c_macro(&self.name)
    }
}

/// How a vendor model's `mid` and `cid` are folded into one key
///
/// `Legacy` reproduces the historical generator, which evaluates
/// `mid << (16 + cid)`: the company ID ends up in the shift amount rather
/// than in the low 16 bits. Generated output compatibility depends on
/// merge decisions made with this key, so it stays the default. `Packed`
/// is the conventional `(mid << 16) | cid`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmidScheme {
    #[default]
    Legacy,
    Packed,
}

impl FromStr for VmidScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "packed" => Ok(Self::Packed),
            other => Err(format!("unknown vmid scheme '{}' (expected legacy or packed)", other)),
        }
    }
}

impl fmt::Display for VmidScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Packed => write!(f, "packed"),
        }
    }
}

/// An arbitrarily wide vendor model key, stored as `odd << shift`
///
/// The legacy scheme can shift by up to 16 + 0xFFFF bits, far past any
/// native integer. Keeping the value normalized (odd mantissa, or zero)
/// makes structural equality match numeric equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vmid {
    odd: u64,
    shift: u32,
}

impl Vmid {
    fn shifted(value: u64, shift: u32) -> Self {
        if value == 0 {
            return Self { odd: 0, shift: 0 };
        }
        let zeros = value.trailing_zeros();
        Self {
            odd: value >> zeros,
            shift: shift + zeros,
        }
    }

    /// The key as a native integer, if it fits in 128 bits
    pub fn to_u128(&self) -> Option<u128> {
        if self.odd == 0 {
            return Some(0);
        }
        let bits = 64 - self.odd.leading_zeros();
        if bits + self.shift > 128 {
            return None;
        }
        Some(u128::from(self.odd) << self.shift)
    }
}

impl fmt::Display for Vmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u128() {
            Some(value) => write!(f, "{:#x}", value),
            None => write!(f, "{:#x} << {}", self.odd, self.shift),
        }
    }
}
