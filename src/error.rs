use crate::Value;

/// Errors surfaced by the stack and its adapter layer.
#[derive(thiserror::Error, Debug)]
pub enum StackError {
    #[error("stack is full (capacity {0})")]
    Full(usize),
    #[error("stack is empty")]
    Empty,
    #[error("invalid capacity: expected a positive bound, got {0}")]
    InvalidCapacity(usize),
    #[error("cannot allocate room for {0} values")]
    CapacityOverflow(usize),
    #[error("cannot unmarshal {len} bytes into {ty}: {reason}")]
    Unmarshal {
        ty: &'static str,
        len: usize,
        reason: String,
    },
}

/// A push that was rejected because the stack was at capacity.
///
/// The rejected [`Value`] is handed back untouched, so the caller keeps
/// ownership of it.
#[derive(thiserror::Error, Debug)]
#[error("stack is full (capacity {capacity})")]
pub struct Full {
    value: Value,
    capacity: usize,
}

impl Full {
    pub(crate) fn new(value: Value, capacity: usize) -> Full {
        Full { value, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Recover ownership of the rejected value
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Converting drops, and so releases, the rejected value.
impl From<Full> for StackError {
    fn from(full: Full) -> StackError {
        StackError::Full(full.capacity)
    }
}
