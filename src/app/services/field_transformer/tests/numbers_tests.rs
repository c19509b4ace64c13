//! Tests for integer and flag parsing

use crate::app::services::field_transformer::{parse_flag, parse_int};

#[test]
fn test_parse_int() {
    assert_eq!(parse_int("123"), Some(123));
    assert_eq!(parse_int("1.0"), Some(1));
    assert_eq!(parse_int("1.9"), Some(1));
    assert_eq!(parse_int("-42"), Some(-42));
    assert_eq!(parse_int("+7"), Some(7));
    assert_eq!(parse_int(" 12 "), Some(12));
}

#[test]
fn test_parse_int_rejects_non_integers() {
    for value in ["", "abc", "1.", ".5", "1.2.3", "12a", "-", "1e5", "1,000", "99999999999999999999"] {
        assert_eq!(parse_int(value), None, "value {:?}", value);
    }
}

#[test]
fn test_parse_flag() {
    assert_eq!(parse_flag("Y"), Some(true));
    assert_eq!(parse_flag("n"), Some(false));
    assert_eq!(parse_flag(" Y "), Some(true));
    assert_eq!(parse_flag(""), None);
    assert_eq!(parse_flag("U"), None);
}
