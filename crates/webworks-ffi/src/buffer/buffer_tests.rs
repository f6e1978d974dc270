#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn FfiBuffer___empty___null_and_not_error() {
    let buf = FfiBuffer::empty();

    assert!(buf.data.is_null());
    assert!(buf.is_empty());
    assert!(!buf.is_error());
    assert_eq!(buf.capacity, 0);
}

#[test]
fn FfiBuffer___from_string___preserves_text() {
    let mut buf = FfiBuffer::from_string("{\"valid\":true}".to_string());

    unsafe {
        assert_eq!(buf.to_string_lossy(), "{\"valid\":true}");
        buf.free();
    }
}

#[test]
fn FfiBuffer___from_string_empty___is_empty_not_error() {
    let mut buf = FfiBuffer::from_string(String::new());

    assert!(buf.is_empty());
    assert!(!buf.is_error());

    unsafe { buf.free() };
}

#[test]
fn FfiBuffer___from_vec___preserves_bytes() {
    let mut buf = FfiBuffer::from_vec(vec![1u8, 2, 3, 4, 5]);

    assert_eq!(buf.len, 5);
    assert!(buf.capacity >= 5);
    unsafe {
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4, 5]);
        buf.free();
    }
}

#[test_case(6, "Unknown command: scan" ; "unknown command")]
#[test_case(9, "Recovery error: no runtime" ; "recovery")]
fn FfiBuffer___error___carries_code_and_message(code: u32, message: &str) {
    let mut buf = FfiBuffer::error(code, message);

    assert!(buf.is_error());
    assert_eq!(buf.error_code, code);
    unsafe {
        assert_eq!(buf.to_string_lossy(), message);
        buf.free();
    }
}

#[test]
fn FfiBuffer___free_twice___second_call_is_noop() {
    let mut buf = FfiBuffer::from_string("payload".to_string());

    unsafe {
        buf.free();
        buf.free();
    }

    assert!(buf.data.is_null());
    assert_eq!(buf.len, 0);
}

#[test]
fn FfiBuffer___default___same_as_empty() {
    let buf = FfiBuffer::default();

    assert!(buf.is_empty());
    assert_eq!(buf.error_code, 0);
}
