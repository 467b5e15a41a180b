use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::StackError;

/// Capacity used when nothing else is configured
pub const DEFAULT_CAPACITY: usize = 100;

const DEFAULT: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CAPACITY) {
    Some(capacity) => capacity,
    None => panic!("default capacity must be positive"),
};

/// Configuration for a [`Stack`](crate::Stack).
///
/// Deserializes from any serde format, so hosts can embed it in their own
/// configuration files. Missing fields take their default, and a zero
/// capacity is rejected at deserialization time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StackConfig {
    pub capacity: NonZeroUsize,
}

impl StackConfig {
    pub fn with_capacity(capacity: usize) -> Result<StackConfig, StackError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(StackError::InvalidCapacity(capacity))?;
        Ok(StackConfig { capacity })
    }
}

impl Default for StackConfig {
    fn default() -> StackConfig {
        StackConfig { capacity: DEFAULT }
    }
}
