use std::fmt;
use std::mem::{self, ManuallyDrop};
use std::ptr;
use std::slice;

/// An owned, length-prefixed byte buffer: one element of a [`Stack`].
///
/// The layout matches the C `value_t { char *data; size_t len; }`, so a
/// `Value` can be passed by value across the C ABI exposed in
/// [`ffi`](crate::ffi).
///
/// A `Value` with a null `data` pointer and a zero `len` is the
/// *sentinel*: the canonical empty value, returned wherever "nothing"
/// has to be represented. Releasing a sentinel is a no-op.
///
/// Dropping a `Value` releases it. [`Value::release`] does the same
/// thing earlier and leaves the sentinel behind, so the value can still
/// be used afterwards. Values that wrap memory the crate does not own
/// come out of [`Value::construct`] inside a [`ManuallyDrop`].
///
/// [`Stack`]: crate::Stack
#[repr(C)]
pub struct Value {
    data: *mut u8,
    len: usize,
}

// A `Value` is the only handle to its buffer (or, for `construct`ed
// values, the caller vouched for the buffer's lifetime), and shared
// references only ever read from it.
unsafe impl Send for Value {}
unsafe impl Sync for Value {}

impl Value {
    /// The sentinel value: null buffer, zero length
    pub const fn sentinel() -> Value {
        Value {
            data: ptr::null_mut(),
            len: 0,
        }
    }

    /// Wrap `len` bytes at `data` without copying them.
    ///
    /// A null `data` yields the sentinel, whatever `len` says. The value
    /// is returned inside a [`ManuallyDrop`] so that the wrapped bytes are
    /// not freed when it goes out of scope.
    ///
    /// # Safety
    ///
    /// `data` must either be null or point to `len` initialized bytes
    /// that stay valid for as long as the returned `Value` is used. The
    /// value must only be taken out of its `ManuallyDrop` (and so
    /// released, dropped, or pushed onto a [`Stack`](crate::Stack)) if
    /// `data` was itself obtained from [`Value::duplicate`].
    pub unsafe fn construct(data: *mut u8, len: usize) -> ManuallyDrop<Value> {
        if data.is_null() {
            return ManuallyDrop::new(Value::sentinel());
        }
        ManuallyDrop::new(Value { data, len })
    }

    /// Allocate a fresh buffer holding a copy of `bytes`.
    ///
    /// Duplicating an empty slice yields the sentinel. Allocation failure
    /// aborts the process.
    pub fn duplicate(bytes: &[u8]) -> Value {
        if bytes.is_empty() {
            return Value::sentinel();
        }
        let buf: Box<[u8]> = bytes.into();
        let len = buf.len();
        let data = Box::into_raw(buf) as *mut u8;
        Value { data, len }
    }

    /// Free the owned buffer and reset this value to the sentinel.
    ///
    /// Calling this on the sentinel, or twice on the same value, is safe.
    pub fn release(&mut self) {
        if !self.data.is_null() {
            // Non-null buffers come from `duplicate`, or from a `construct`
            // whose caller guaranteed the same provenance
            drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(self.data, self.len)) });
        }
        self.data = ptr::null_mut();
        self.len = 0;
    }

    /// Move the contents out, leaving the sentinel behind.
    ///
    /// This is how a deleter passed to [`Stack::clear`](crate::Stack::clear)
    /// keeps a value instead of letting it be released.
    pub fn take(&mut self) -> Value {
        mem::replace(self, Value::sentinel())
    }

    pub fn is_sentinel(&self) -> bool {
        self.data.is_null()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        if self.data.is_null() {
            return &[];
        }
        // `construct` and `duplicate` both guarantee `len` readable bytes
        unsafe { slice::from_raw_parts(self.data, self.len) }
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        self.release();
    }
}

impl Default for Value {
    fn default() -> Value {
        Value::sentinel()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return f.write_str("Value(sentinel)");
        }
        f.debug_struct("Value")
            .field("len", &self.len)
            .field("data", &self.as_bytes())
            .finish()
    }
}
