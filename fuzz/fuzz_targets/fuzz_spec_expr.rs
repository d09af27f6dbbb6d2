// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use dynssz::spec::{Expr, SpecResolver, SpecValues};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Fuzz the expression parser
    let _ = Expr::parse(text);

    // Fuzz resolution through the memoising value set
    let specs = SpecValues::new().with("A", 3).with("B", 0).with("C", u64::MAX);
    let _ = specs.resolve(text);
});
