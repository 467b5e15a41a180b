//! # cstack
//!
//! A small fixed-capacity stack of variable-length byte values, usable
//! both from Rust and, through a C ABI, from any language that can load
//! a shared library.
//!
//! The stack never grows: its capacity is chosen when it is created, and
//! pushing onto a full stack or popping from an empty one fails without
//! changing anything. Values come out in the exact reverse order they
//! went in.
//!
//! # Usage
//!
//! This crate provides three layers, each built on the previous one:
//! - The [`Value`] struct, an owned byte buffer with explicit
//!   duplication and release
//! - The [`Stack`] struct, that owns the values pushed onto it
//! - The [`ScopedStack`] struct, a typed wrapper that cleans up after
//!   itself
//!
//! The C ABI in [`ffi`] exposes the first two layers.
//!
//! ## [`Value`]
//!
//! A [`Value`] is a pointer and a length, laid out like a C struct so it
//! can cross the ABI by value. [`Value::duplicate`] copies bytes into a
//! fresh buffer owned by the value, and [`Value::release`] frees it,
//! leaving behind the *sentinel* (null pointer, zero length). Dropping
//! a value releases it too, so a value that is discarded, rejected, or
//! left behind by an early return never leaks. Only values wrapping
//! foreign memory, from [`Value::construct`], opt out of this.
//!
//! ## [`Stack`]
//!
//! Create a stack with [`Stack::new`], then [`Stack::push`] and
//! [`Stack::pop`] values. Pushing moves the value into the stack; a
//! successful pop moves it back out to the caller.
//!
//! [`Stack::clear`] and [`Stack::teardown`] take a *deleter*, a closure
//! called once for every value still stored. Pass [`Value::release`] to
//! free them, or a closure calling [`Value::take`] to keep them. Values
//! the deleter leaves alone are released once it returns.
//!
//! ## [`ScopedStack`]
//!
//! A [`ScopedStack`] owns a [`Stack`] for exactly as long as it lives,
//! and converts items to and from bytes through the [`Marshal`] and
//! [`Unmarshal`] traits. Errors are [`anyhow::Error`]s wrapping a
//! [`StackError`]:
//!
//! ```
//! use cstack::{ScopedStack, StackError};
//!
//! let mut stack = ScopedStack::<String>::with_capacity(2)?;
//! stack.push("Hello")?;
//! stack.push("World")?;
//!
//! let err = stack.push("!").unwrap_err();
//! assert!(matches!(err.downcast_ref::<StackError>(), Some(StackError::Full(2))));
//!
//! assert_eq!(stack.pop()?, "World");
//! assert_eq!(stack.pop()?, "Hello");
//! # Ok::<_, anyhow::Error>(())
//! ```
//!
//! Dropping it releases whatever is left.
//!
//! # Logging
//!
//! The crate logs through [`tracing`]: lifecycle events at `debug`,
//! individual pushes and pops at `trace`, and misuse of the C ABI at
//! `error`. No subscriber is installed by the library.

mod config;
mod error;
pub mod ffi;
mod marshal;
mod scoped;
mod stack;
mod val;

pub use config::{StackConfig, DEFAULT_CAPACITY};
pub use error::{Full, StackError};
pub use marshal::{Marshal, Unmarshal};
pub use scoped::ScopedStack;
pub use stack::Stack;
pub use val::Value;

/// A “prelude” for users of the `cstack` crate.
pub mod prelude {
    pub use super::{Marshal, ScopedStack, Stack, StackError, Unmarshal, Value};
}
