use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;

use crate::{Marshal, Stack, StackConfig, StackError, Unmarshal, Value};

/// A typed stack that owns its native [`Stack`] for exactly its own
/// lifetime.
///
/// Items are marshalled into freshly duplicated [`Value`]s on push and
/// unmarshalled back on pop, the popped value being released right
/// away. Dropping the `ScopedStack`, whether at the end of a scope, on an
/// early return or while unwinding, tears the stack down with
/// [`Value::release`] as the deleter.
///
/// Failures are reported as [`anyhow::Error`]s wrapping a
/// [`StackError`], which callers can recover with `downcast_ref`.
pub struct ScopedStack<T> {
    stack: Stack,
    phantom: PhantomData<fn() -> T>,
}

impl<T: Unmarshal> ScopedStack<T> {
    /// Open a stack with the default configuration
    pub fn new() -> ScopedStack<T> {
        ScopedStack::with_config(&StackConfig::default())
    }

    pub fn with_config(config: &StackConfig) -> ScopedStack<T> {
        ScopedStack {
            stack: Stack::from_config(config),
            phantom: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> anyhow::Result<ScopedStack<T>> {
        let config = StackConfig::with_capacity(capacity)?;
        Ok(ScopedStack::with_config(&config))
    }

    pub fn size(&self) -> usize {
        self.stack.size()
    }

    pub fn capacity(&self) -> usize {
        self.stack.capacity()
    }

    /// Push a copy of `item`.
    ///
    /// Fails with [`StackError::Full`] when the stack is at capacity, in
    /// which case nothing is stored.
    pub fn push<Q>(&mut self, item: &Q) -> anyhow::Result<()>
    where
        T: Borrow<Q>,
        Q: ?Sized + Marshal,
    {
        let value = Value::duplicate(&item.marshal());
        if let Err(full) = self.stack.push(value) {
            tracing::warn!(capacity = full.capacity(), "stack is full");
            return Err(StackError::from(full).into());
        }
        Ok(())
    }

    /// Pop the most recently pushed item.
    ///
    /// Fails with [`StackError::Empty`] when there is nothing to pop, or
    /// with [`StackError::Unmarshal`] when the stored bytes do not decode
    /// into a `T`. The popped value is released either way.
    pub fn pop(&mut self) -> anyhow::Result<T> {
        let mut value = match self.stack.pop() {
            Some(value) => value,
            None => {
                tracing::warn!("stack is empty");
                return Err(StackError::Empty.into());
            }
        };
        let item = T::unmarshal(value.as_bytes());
        value.release();
        Ok(item?)
    }

    /// Release every stored item
    pub fn clear(&mut self) {
        self.stack.clear(Value::release);
    }
}

impl<T: Unmarshal> Default for ScopedStack<T> {
    fn default() -> ScopedStack<T> {
        ScopedStack::new()
    }
}

impl<T> fmt::Debug for ScopedStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedStack")
            .field("size", &self.stack.size())
            .field("capacity", &self.stack.capacity())
            .finish()
    }
}

impl<T> Drop for ScopedStack<T> {
    fn drop(&mut self) {
        tracing::debug!(count = self.stack.size(), "closing scoped stack");
        self.stack.clear(Value::release);
    }
}
