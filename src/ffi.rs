//! The C ABI of the stack.
//!
//! Every function here is exported unmangled, with the names and
//! signatures declared in `include/cstack.h`, so the library can be
//! loaded from any language with a C foreign-function interface.
//!
//! A handle goes through `cstack_new` → `cstack_ctor` → any number of
//! push/pop/size/clear → `cstack_dtor` → `cstack_delete`. Calls made out
//! of that order are logged and answered with the failure value (`FALSE`,
//! `0`, or nothing at all) instead of touching memory they should not.
//! Deleting a handle that was never torn down releases the values it
//! still holds.
//!
//! A `Value` that crosses into C is no longer dropped by Rust: values
//! rejected by `cstack_push` stay with the caller, and values handed to
//! a deleter belong to the deleter.
//!
//! Failure is only ever reported through return values; nothing here
//! unwinds into the caller.

use std::mem::{self, ManuallyDrop};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::{Stack, Value};

pub const TRUE: c_int = 1;
pub const FALSE: c_int = 0;

/// A function releasing (or otherwise disposing of) one value.
///
/// `None` is the null function pointer: values are then removed from
/// the stack without being released.
pub type Deleter = Option<unsafe extern "C" fn(value: *mut Value)>;

/// Opaque stack handle returned by [`cstack_new`]
pub struct CStack {
    state: State,
}

enum State {
    Allocated,
    Initialized(Stack),
    TornDown,
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Allocated => "allocated",
            State::Initialized(_) => "initialized",
            State::TornDown => "torn down",
        }
    }
}

fn misuse(op: &'static str, state: &State) {
    tracing::error!(op, state = state.name(), "invalid operation for stack state");
}

unsafe fn handle<'a>(stack: *mut CStack, op: &'static str) -> Option<&'a mut CStack> {
    let handle = stack.as_mut();
    if handle.is_none() {
        tracing::error!(op, "null stack handle");
    }
    handle
}

unsafe fn initialized<'a>(stack: *mut CStack, op: &'static str) -> Option<&'a mut Stack> {
    match &mut handle(stack, op)?.state {
        State::Initialized(stack) => Some(stack),
        state => {
            misuse(op, state);
            None
        }
    }
}

// The deleter owns each value it is given, including what it leaves
// behind.
fn delete_with(deleter: Deleter) -> impl FnMut(&mut Value) {
    move |value: &mut Value| {
        let mut value = ManuallyDrop::new(value.take());
        if let Some(deleter) = deleter {
            unsafe { deleter(&mut *value) }
        }
    }
}

/// Wrap `len` bytes at `data` without copying them.
///
/// # Safety
///
/// See [`Value::construct`]. Rust callers must not let the returned
/// value drop unless `data` came from [`copy_value`].
#[no_mangle]
pub unsafe extern "C" fn make_value(data: *mut c_char, len: usize) -> Value {
    ManuallyDrop::into_inner(Value::construct(data.cast(), len))
}

/// Copy `len` bytes at `data` into a freshly allocated value.
///
/// # Safety
///
/// `data` must be null or point to `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn copy_value(data: *const c_char, len: usize) -> Value {
    if data.is_null() {
        return Value::sentinel();
    }
    Value::duplicate(slice::from_raw_parts(data.cast::<u8>(), len))
}

/// Release a value obtained from [`copy_value`] or [`cstack_pop`]. Null
/// pointers and sentinel values are ignored.
///
/// # Safety
///
/// `value` must be null or point to a valid value.
#[no_mangle]
pub unsafe extern "C" fn free_value(value: *mut Value) {
    if let Some(value) = value.as_mut() {
        value.release();
    }
}

#[no_mangle]
pub extern "C" fn cstack_new() -> *mut CStack {
    let stack = Box::into_raw(Box::new(CStack {
        state: State::Allocated,
    }));
    tracing::debug!(handle = ?stack, "allocated stack handle");
    stack
}

/// # Safety
///
/// `stack` must be null or a handle from [`cstack_new`] that was not
/// deleted yet.
#[no_mangle]
pub unsafe extern "C" fn cstack_delete(stack: *mut CStack) {
    if stack.is_null() {
        return;
    }
    let handle = Box::from_raw(stack);
    if let State::Initialized(ref inner) = handle.state {
        tracing::error!(
            count = inner.size(),
            "deleting a stack that was not torn down, releasing its values"
        );
    }
    tracing::debug!(handle = ?stack, "deallocated stack handle");
    drop(handle);
}

/// Give the stack room for `max_size` values. A zero `max_size`, or one
/// too large to allocate, is rejected and leaves the handle
/// uninitialized.
///
/// # Safety
///
/// `stack` must be null or a live handle from [`cstack_new`].
#[no_mangle]
pub unsafe extern "C" fn cstack_ctor(stack: *mut CStack, max_size: usize) {
    let handle = match handle(stack, "cstack_ctor") {
        Some(handle) => handle,
        None => return,
    };
    if let State::Initialized(_) = handle.state {
        misuse("cstack_ctor", &handle.state);
        return;
    }
    match Stack::new(max_size) {
        Ok(inner) => handle.state = State::Initialized(inner),
        Err(e) => tracing::error!(error = %e, "cannot initialize stack"),
    }
}

/// Hand every remaining value to `deleter`, then free the stack's
/// storage. The handle itself stays allocated until [`cstack_delete`].
///
/// # Safety
///
/// `stack` must be null or a live handle from [`cstack_new`], and
/// `deleter` must accept every value stored in the stack.
#[no_mangle]
pub unsafe extern "C" fn cstack_dtor(stack: *mut CStack, deleter: Deleter) {
    let handle = match handle(stack, "cstack_dtor") {
        Some(handle) => handle,
        None => return,
    };
    match mem::replace(&mut handle.state, State::TornDown) {
        State::Initialized(inner) => inner.teardown(delete_with(deleter)),
        state => {
            misuse("cstack_dtor", &state);
            handle.state = state;
        }
    }
}

/// # Safety
///
/// `stack` must be null or a live handle from [`cstack_new`].
#[no_mangle]
pub unsafe extern "C" fn cstack_size(stack: *const CStack) -> usize {
    match stack.as_ref().map(|handle| &handle.state) {
        Some(State::Initialized(inner)) => inner.size(),
        Some(State::TornDown) => 0,
        Some(state) => {
            misuse("cstack_size", state);
            0
        }
        None => {
            tracing::error!(op = "cstack_size", "null stack handle");
            0
        }
    }
}

/// Move `value` onto the stack. Returns `FALSE` when the stack is full
/// or not initialized, in which case the caller keeps ownership of
/// `value`.
///
/// # Safety
///
/// `stack` must be null or a live handle from [`cstack_new`], and
/// `value` must own its buffer (see [`copy_value`]).
#[no_mangle]
pub unsafe extern "C" fn cstack_push(stack: *mut CStack, value: Value) -> c_int {
    let inner = match initialized(stack, "cstack_push") {
        Some(inner) => inner,
        None => {
            mem::forget(value);
            return FALSE;
        }
    };
    match inner.push(value) {
        Ok(()) => TRUE,
        Err(full) => {
            // The caller still holds the rejected buffer
            mem::forget(full.into_value());
            FALSE
        }
    }
}

/// Move the top value into `*value`. Returns `FALSE` when the stack is
/// empty, in which case `*value` is set to the sentinel.
///
/// # Safety
///
/// `stack` must be null or a live handle from [`cstack_new`], and
/// `value` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn cstack_pop(stack: *mut CStack, value: *mut Value) -> c_int {
    if value.is_null() {
        tracing::error!(op = "cstack_pop", "null output value");
        return FALSE;
    }
    match initialized(stack, "cstack_pop").and_then(Stack::pop) {
        Some(popped) => {
            ptr::write(value, popped);
            TRUE
        }
        None => {
            ptr::write(value, Value::sentinel());
            FALSE
        }
    }
}

/// Hand every stored value to `deleter`, keeping the stack usable.
///
/// # Safety
///
/// Same as [`cstack_dtor`].
#[no_mangle]
pub unsafe extern "C" fn cstack_clear(stack: *mut CStack, deleter: Deleter) {
    if let Some(inner) = initialized(stack, "cstack_clear") {
        inner.clear(delete_with(deleter));
    }
}
