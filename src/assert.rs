//! Debug-only invariant checks.
//!
//! Two flavours exist:
//! - [`hard_assert!`] aborts the process when the condition fails.
//! - [`soft_assert!`] logs a `tracing` warning and carries on.
//!
//! Both are gated on `cfg!(debug_assertions)` at the call site, so release
//! builds compile them to nothing. Release builds therefore offer no protection
//! against misuse of the allocator or the containers; callers are trusted.
//!
//! [`fatal`] is the one diagnostic that stays active in every build profile.
//! It is reserved for conditions the allocator cannot continue from, such as
//! the platform running out of memory.

use core::fmt;
use std::io::Write;

/// Asserts an invariant in debug builds, aborting the process on failure.
///
/// The condition is type-checked in every profile but only evaluated when
/// `debug_assertions` is enabled.
///
/// ```rust
/// use oz_core::hard_assert;
///
/// let len = 3;
/// hard_assert!(len != 0);
/// hard_assert!(len < 8, "length {} out of range", len);
/// ```
#[macro_export]
macro_rules! hard_assert {
    ($cond:expr $(,)?) => {
        if cfg!(debug_assertions) && !$cond {
            $crate::assert::hard_failure(
                format_args!("{}", stringify!($cond)),
                file!(),
                line!(),
            );
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) && !$cond {
            $crate::assert::hard_failure(format_args!($($arg)+), file!(), line!());
        }
    };
}

/// Checks a condition in debug builds and logs a warning when it fails.
///
/// Execution always continues.
#[macro_export]
macro_rules! soft_assert {
    ($cond:expr $(,)?) => {
        if cfg!(debug_assertions) && !$cond {
            $crate::__tracing::warn!(
                target: "oz_core::assert",
                file = file!(),
                line = line!(),
                "soft assertion failed: {}",
                stringify!($cond)
            );
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) && !$cond {
            $crate::__tracing::warn!(
                target: "oz_core::assert",
                file = file!(),
                line = line!(),
                "soft assertion failed: {}",
                format_args!($($arg)+)
            );
        }
    };
}

/// Reports a failed hard assertion and aborts.
///
/// Not meant to be called directly; use [`hard_assert!`].
#[doc(hidden)]
#[cold]
#[inline(never)]
pub fn hard_failure(message: fmt::Arguments<'_>, file: &'static str, line: u32) -> ! {
    report("assertion failed", message, file, line);
    std::process::abort()
}

/// Prints a fatal diagnostic and aborts. Active in every build profile.
#[cold]
#[inline(never)]
pub fn fatal<D: fmt::Display>(diagnostic: D) -> ! {
    let mut stderr = std::io::stderr().lock();
    // Nothing useful can be done if stderr itself is gone.
    let _ = writeln!(stderr, "oz_core: fatal: {diagnostic}");
    let _ = stderr.flush();
    std::process::abort()
}

// Writes straight to stderr. A tracing subscriber may allocate, and these
// paths can run inside the global allocator.
fn report(kind: &str, message: fmt::Arguments<'_>, file: &'static str, line: u32) {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{file}:{line}: {kind}: {message}");
    let _ = stderr.flush();
}
