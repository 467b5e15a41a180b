// Copyright 2020 The cstack Developers. See the version control
// history for a full list.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use cstack::{ScopedStack, StackConfig, StackError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Set RUST_LOG=cstack=trace to watch every push and pop
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // An optional first argument overrides the default capacity
    let config: StackConfig = match std::env::args().nth(1) {
        Some(capacity) => StackConfig::with_capacity(capacity.parse()?)?,
        None => StackConfig::default(),
    };

    // The stack lives exactly as long as `stack`: whatever is left in it
    // is released when it goes out of scope, even on an early return
    let mut stack = ScopedStack::<String>::with_config(&config);

    stack.push("Hello")?;
    stack.push("World")?;
    stack.push("!")?;
    println!("Size after pushes: {}", stack.size());

    while stack.size() > 0 {
        println!("{}", stack.pop()?);
    }
    println!("Size after pops: {}", stack.size());

    // Failures are regular errors that can be inspected and recovered from
    match stack.pop() {
        Err(e) if matches!(e.downcast_ref::<StackError>(), Some(StackError::Empty)) => {
            println!("Nothing left to pop: {}", e)
        }
        other => anyhow::bail!("expected an empty stack, got {:?}", other),
    }

    stack.push("Ba")?;
    stack.push("Bye!")?;
    println!("Size before clear: {}", stack.size());

    stack.clear();
    println!("Size after clear: {}", stack.size());

    Ok(())
}
