use super::*;

#[test]
fn not_running_is_reported_as_such() {
    let err = ClientError::NotRunning;
    assert!(err.is_not_running());
    assert!(!ClientError::Remote("x".to_string()).is_not_running());
}

#[test]
fn find_ojd_binary_falls_back_to_path_lookup_when_nothing_else_matches() {
    let path = find_ojd_binary();
    assert!(!path.as_os_str().is_empty());
}
