//! Allocation accounting for the release protocol.
//!
//! A counting global allocator tracks the bytes currently allocated by
//! the calling thread, so every scenario can check that it gives back
//! exactly what it took.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use cstack::ffi;
use cstack::{ScopedStack, Stack, StackError, Value};

struct Counting;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn track(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let p = System.alloc(layout);
        if !p.is_null() {
            track(layout.size() as isize);
        }
        p
    }

    unsafe fn dealloc(&self, p: *mut u8, layout: Layout) {
        System.dealloc(p, layout);
        track(-(layout.size() as isize));
    }
}

#[global_allocator]
static ALLOCATOR: Counting = Counting;

fn live() -> isize {
    LIVE.with(Cell::get)
}

// The first run warms up anything lazily initialized along the way
fn assert_balanced<F: Fn()>(f: F) {
    f();
    let before = live();
    f();
    assert_eq!(live(), before, "allocations left behind");
}

#[test]
fn duplicate_then_release() {
    assert_balanced(|| {
        let before = live();
        let mut value = Value::duplicate(b"Hello");
        assert_eq!(live() - before, 5);
        value.release();
        value.release();
    });
}

#[test]
fn popped_values_released_by_caller() {
    assert_balanced(|| {
        let mut stack = Stack::new(4).unwrap();
        stack.push(Value::duplicate(b"one")).unwrap();
        stack.push(Value::duplicate(b"two")).unwrap();
        while let Some(mut value) = stack.pop() {
            value.release();
        }
        stack.teardown(Value::release);
    });
}

#[test]
fn clear_and_teardown_release_everything() {
    assert_balanced(|| {
        let mut stack = Stack::new(3).unwrap();
        stack.push(Value::duplicate(b"Ba")).unwrap();
        stack.push(Value::duplicate(b"Bye!")).unwrap();
        stack.clear(Value::release);
        for _ in 0..3 {
            stack.push(Value::duplicate(b"refill")).unwrap();
        }
        stack.teardown(Value::release);
    });
}

#[test]
fn dropped_stack_releases_its_values() {
    assert_balanced(|| {
        let mut stack = Stack::new(2).unwrap();
        stack.push(Value::duplicate(b"left")).unwrap();
        drop(stack);
    });
}

#[test]
fn dropped_value_is_released() {
    assert_balanced(|| {
        let before = live();
        let value = Value::duplicate(b"dropped");
        assert_eq!(live() - before, 7);
        drop(value);
        assert_eq!(live(), before);
    });
}

#[test]
fn discarded_pop_is_released() {
    assert_balanced(|| {
        let mut stack = Stack::new(2).unwrap();
        stack.push(Value::duplicate(b"ignored")).unwrap();
        let _ = stack.pop();
        assert!(stack.is_empty());
    });
}

#[test]
fn full_push_propagated_with_question_mark() {
    fn overflow(stack: &mut Stack) -> anyhow::Result<()> {
        stack.push(Value::duplicate(b"overflow"))?;
        Ok(())
    }

    assert_balanced(|| {
        let mut stack = Stack::new(1).unwrap();
        stack.push(Value::duplicate(b"a")).unwrap();
        let err = overflow(&mut stack).unwrap_err();
        assert!(err.downcast_ref::<cstack::Full>().is_some());
        assert_eq!(stack.size(), 1);
    });
}

#[test]
fn clear_releases_what_the_deleter_leaves() {
    assert_balanced(|| {
        let mut stack = Stack::new(2).unwrap();
        stack.push(Value::duplicate(b"one")).unwrap();
        stack.push(Value::duplicate(b"two")).unwrap();
        let mut seen = 0;
        stack.clear(|_| seen += 1);
        assert_eq!(seen, 2);
    });
}

#[test]
fn rejected_push_converted_to_error_is_released() {
    assert_balanced(|| {
        let mut stack = Stack::new(1).unwrap();
        stack.push(Value::duplicate(b"a")).unwrap();
        let err = StackError::from(stack.push(Value::duplicate(b"b")).unwrap_err());
        assert!(matches!(err, StackError::Full(1)));
    });
}

#[test]
fn scoped_stack_cleans_up_on_early_return() {
    fn fill(stack: &mut ScopedStack<String>) -> anyhow::Result<()> {
        for word in &["Hello", "World", "!"] {
            stack.push(*word)?;
        }
        Ok(())
    }

    fn run() -> anyhow::Result<()> {
        let mut stack = ScopedStack::<String>::with_capacity(2)?;
        fill(&mut stack)?;
        unreachable!("the third push overflows");
    }

    assert_balanced(|| {
        let err = run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StackError>(),
            Some(StackError::Full(2))
        ));
    });
}

#[test]
fn scoped_stack_pop_and_clear() {
    assert_balanced(|| {
        let mut stack = ScopedStack::<String>::new();
        stack.push("Hello").unwrap();
        stack.push("World").unwrap();
        assert_eq!(stack.pop().unwrap(), "World");
        stack.push("Ba").unwrap();
        stack.clear();
        stack.push("kept until drop").unwrap();
    });
}

// `resume_unwind` skips the panic hook, so the only allocations are the
// stack's and the payload box
#[test]
fn scoped_stack_survives_unwinding() {
    assert_balanced(|| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut stack = ScopedStack::<i32>::with_capacity(8).unwrap();
            stack.push(&1).unwrap();
            stack.push(&2).unwrap();
            assert_eq!(stack.size(), 2);
            panic::resume_unwind(Box::new("unwinding with a live stack"));
        }));
        assert!(result.is_err());
    });
}

#[test]
fn native_handle_deleted_without_teardown() {
    assert_balanced(|| unsafe {
        let stack = ffi::cstack_new();
        ffi::cstack_ctor(stack, 4);
        let bytes = b"native";
        ffi::cstack_push(stack, ffi::copy_value(bytes.as_ptr().cast(), bytes.len()));
        ffi::cstack_delete(stack);
    });
}

#[test]
fn native_round_trip_with_free_value() {
    assert_balanced(|| unsafe {
        let stack = ffi::cstack_new();
        ffi::cstack_ctor(stack, 2);
        for word in &[&b"a"[..], &b"b"[..]] {
            let value = ffi::copy_value(word.as_ptr().cast(), word.len());
            assert_eq!(ffi::cstack_push(stack, value), ffi::TRUE);
        }
        let mut value = Value::sentinel();
        assert_eq!(ffi::cstack_pop(stack, &mut value), ffi::TRUE);
        assert_eq!(value.as_bytes(), b"b");
        ffi::free_value(&mut value);
        ffi::cstack_dtor(stack, Some(ffi::free_value));
        ffi::cstack_delete(stack);
        ffi::free_value(ptr::null_mut());
    });
}
