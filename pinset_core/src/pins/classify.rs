use super::metadata::Metadata;
use super::{PinEntry, PinEntryType, PinReason};
use crate::Cid;

/// The reportable part of a pin: its type column and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedPin {
    pub pin_type: PinEntryType,
    pub metadata: Option<Metadata>,
}

impl ClassifiedPin {
    pub fn into_entry(self, cid: Cid) -> PinEntry {
        PinEntry::new(self.pin_type, cid, self.metadata)
    }
}

/// Turns a pin reason into what a listing reports for it.
///
/// Indirect pins name the recursive root that retains them and never
/// carry metadata of their own.
pub fn classify(reason: PinReason, metadata: Option<Metadata>) -> ClassifiedPin {
    match reason {
        PinReason::Direct => ClassifiedPin {
            pin_type: PinEntryType::Direct,
            metadata,
        },
        PinReason::Recursive => ClassifiedPin {
            pin_type: PinEntryType::Recursive,
            metadata,
        },
        PinReason::Indirect { parent } => ClassifiedPin {
            pin_type: PinEntryType::Indirect {
                through: Some(parent),
            },
            metadata: None,
        },
    }
}
