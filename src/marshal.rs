use std::borrow::Cow;
use std::convert::TryFrom;
use std::mem;

use crate::StackError;

/// Types that can be turned into the bytes of a [`Value`](crate::Value).
pub trait Marshal {
    fn marshal(&self) -> Cow<'_, [u8]>;
}

/// Types that can be rebuilt from the bytes of a [`Value`](crate::Value).
pub trait Unmarshal: Sized {
    fn unmarshal(bytes: &[u8]) -> Result<Self, StackError>;
}

impl Marshal for str {
    fn marshal(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl Marshal for String {
    fn marshal(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

/// Strings are stored as UTF-8, without a terminator.
impl Unmarshal for String {
    fn unmarshal(bytes: &[u8]) -> Result<String, StackError> {
        String::from_utf8(bytes.to_vec()).map_err(|e| StackError::Unmarshal {
            ty: "String",
            len: bytes.len(),
            reason: e.to_string(),
        })
    }
}

impl Marshal for [u8] {
    fn marshal(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl Marshal for Vec<u8> {
    fn marshal(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl Unmarshal for Vec<u8> {
    fn unmarshal(bytes: &[u8]) -> Result<Vec<u8>, StackError> {
        Ok(bytes.to_vec())
    }
}

// Integers use the native byte order, the same layout a C caller gets
// from storing an `int` behind the value's data pointer.
macro_rules! int_impl {
    ($($type:ty),*) => {
        $(
            impl Marshal for $type {
                fn marshal(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_ne_bytes().to_vec())
                }
            }

            impl Unmarshal for $type {
                fn unmarshal(bytes: &[u8]) -> Result<$type, StackError> {
                    let raw = <[u8; mem::size_of::<$type>()]>::try_from(bytes).map_err(|_| {
                        StackError::Unmarshal {
                            ty: stringify!($type),
                            len: bytes.len(),
                            reason: format!("expected {} bytes", mem::size_of::<$type>()),
                        }
                    })?;
                    Ok(<$type>::from_ne_bytes(raw))
                }
            }
        )*
    };
}

int_impl!(i32, i64, u32, u64);
