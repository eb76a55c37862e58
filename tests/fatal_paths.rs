#![cfg(feature = "trace-leaks")]

//! The fatal allocator paths abort the process, so each case re-runs this
//! test binary filtered to itself and inspects the child's exit and stderr.

use oz_core::{Alloc, AllocMode};
use std::process::{Command, Output};
use std::ptr::NonNull;

const CHILD_ENV: &str = "OZ_CORE_FATAL_CHILD";

fn run_in_child(test: &str, fault: impl FnOnce()) -> Output {
    if std::env::var_os(CHILD_ENV).is_some() {
        fault();
        // Reached only when the fault failed to abort.
        std::process::exit(0);
    }
    let exe = std::env::current_exe().expect("test binary path");
    Command::new(exe)
        .args([test, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .output()
        .expect("spawn child test")
}

fn assert_aborted_with(output: &Output, message: &str) {
    assert!(!output.status.success(), "child exited cleanly: {:?}", output.status);
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(output.status.signal(), Some(libc::SIGABRT));
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("oz_core: fatal: "), "stderr: {stderr}");
    assert!(stderr.contains(message), "stderr: {stderr}");
}

#[test]
fn test_object_released_as_array_aborts() {
    let output = run_in_child("test_object_released_as_array_aborts", || {
        let alloc = Alloc::new();
        alloc.init();
        unsafe {
            let p = alloc.allocate(AllocMode::Object, 32);
            alloc.deallocate(AllocMode::Array, p);
        }
    });
    assert_aborted_with(&output, "object block at 0x");
    assert_aborted_with(&output, "released as array (new/delete mismatch)");
}

#[test]
fn test_array_released_as_object_aborts() {
    let output = run_in_child("test_array_released_as_object_aborts", || {
        let alloc = Alloc::new();
        alloc.init();
        unsafe {
            let p = alloc.allocate(AllocMode::Array, 64);
            alloc.deallocate(AllocMode::Object, p);
        }
    });
    assert_aborted_with(&output, "array block at 0x");
    assert_aborted_with(&output, "released as object (new/delete mismatch)");
}

#[test]
fn test_releasing_foreign_memory_aborts() {
    let output = run_in_child("test_releasing_foreign_memory_aborts", || {
        let alloc = Alloc::new();
        alloc.init();
        // Zeroed words where the header would be: no valid tag.
        let mut words = [0usize; 8];
        unsafe {
            let user = NonNull::new_unchecked(words.as_mut_ptr().add(2).cast::<u8>());
            alloc.deallocate(AllocMode::Object, user);
        }
    });
    assert_aborted_with(&output, "freeing unallocated block at 0x");
}
