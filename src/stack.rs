use std::num::NonZeroUsize;

use crate::{Full, StackConfig, StackError, Value};

/// A fixed-capacity LIFO stack of owned [`Value`]s.
///
/// The stack owns every value stored in it. A successful [`pop`] hands
/// ownership back to the caller; [`clear`] and [`teardown`] hand every
/// remaining value to a caller-supplied deleter, usually
/// [`Value::release`].
///
/// Dropping a stack that still holds values drops, and so releases,
/// each of them.
///
/// [`pop`]: Stack::pop
/// [`clear`]: Stack::clear
/// [`teardown`]: Stack::teardown
#[derive(Debug)]
pub struct Stack {
    capacity: NonZeroUsize,
    values: Vec<Value>,
}

impl Stack {
    /// Create a stack that can hold at most `capacity` values.
    ///
    /// Storage for every value is reserved up front; a capacity the
    /// allocator cannot satisfy is reported as
    /// [`StackError::CapacityOverflow`].
    pub fn new(capacity: usize) -> Result<Stack, StackError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(StackError::InvalidCapacity(capacity))?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(capacity.get())
            .map_err(|_| StackError::CapacityOverflow(capacity.get()))?;
        tracing::debug!(capacity = capacity.get(), "initializing stack");
        Ok(Stack { capacity, values })
    }

    /// # Panics
    ///
    /// Panics if storage for `capacity` values cannot be allocated. Use
    /// [`Stack::new`] to get an error instead.
    pub fn with_capacity(capacity: NonZeroUsize) -> Stack {
        tracing::debug!(capacity = capacity.get(), "initializing stack");
        Stack {
            capacity,
            values: Vec::with_capacity(capacity.get()),
        }
    }

    pub fn from_config(config: &StackConfig) -> Stack {
        Stack::with_capacity(config.capacity)
    }

    /// Number of values currently stored
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity.get()
    }

    /// Store `value` on top of the stack, taking ownership of it.
    ///
    /// When the stack is at capacity nothing changes and the value is
    /// handed back inside the [`Full`] error.
    pub fn push(&mut self, value: Value) -> Result<(), Full> {
        if self.is_full() {
            tracing::trace!(capacity = self.capacity(), "push rejected, stack is full");
            return Err(Full::new(value, self.capacity()));
        }
        self.values.push(value);
        tracing::trace!(size = self.values.len(), "pushed value");
        Ok(())
    }

    /// Remove the most recently pushed value and hand it to the caller.
    pub fn pop(&mut self) -> Option<Value> {
        let value = self.values.pop();
        match value {
            Some(_) => tracing::trace!(size = self.values.len(), "popped value"),
            None => tracing::trace!("pop rejected, stack is empty"),
        }
        value
    }

    /// The most recently pushed value, still owned by the stack
    pub fn peek(&self) -> Option<&Value> {
        self.values.last()
    }

    /// Hand every stored value to `deleter`, top to bottom, and leave the
    /// stack empty but usable up to its full capacity again.
    ///
    /// Whatever the deleter leaves in a value is released once it
    /// returns. Pass [`Value::release`] to free values right away, or a
    /// closure calling [`Value::take`] to keep them.
    pub fn clear<D>(&mut self, mut deleter: D)
    where
        D: FnMut(&mut Value),
    {
        let count = self.values.len();
        while let Some(mut value) = self.values.pop() {
            deleter(&mut value);
        }
        tracing::debug!(count, "cleared stack");
    }

    /// Hand every stored value to `deleter`, then free the stack's
    /// storage.
    pub fn teardown<D>(mut self, deleter: D)
    where
        D: FnMut(&mut Value),
    {
        self.clear(deleter);
        tracing::debug!(capacity = self.capacity(), "tore down stack");
    }
}
