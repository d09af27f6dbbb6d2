// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging helpers.
//!
//! All diagnostics go through the `log` facade with a bracketed component
//! tag (`[dynssz]`, `[resolver]`). Install any `log` backend to see them.
//!
//! ## Features
//!
//! - `trace`: emit `[ENTER:FNC] name` lines at `trace` level from the
//!   top-level entry points. Compiles to nothing when disabled.

/// Function entry trace marker.
///
/// Logs `[ENTER:FNC] function_name` for call stack instrumentation.
/// Only active when the `trace` feature is enabled.
///
/// # Example
/// ```ignore
/// fn marshal(&self) -> Result<Vec<u8>> {
///     trace_fn!("DynSsz::marshal");
///     // ...
/// }
/// ```
#[doc(hidden)]
#[macro_export]
#[cfg(feature = "trace")]
macro_rules! trace_fn {
    ($fn_name:expr) => {
        ::log::trace!("[ENTER:FNC] {}", $fn_name);
    };
}

/// No-op trace macro (when trace feature disabled).
#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "trace"))]
macro_rules! trace_fn {
    ($fn_name:expr) => {};
}

/// Indentation prefix for verbose descriptor walks.
pub(crate) fn indent(depth: usize) -> String {
    " ".repeat(depth * 2)
}
