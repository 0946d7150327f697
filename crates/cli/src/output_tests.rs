use super::*;

#[test]
fn uptime_renders_the_largest_units_present() {
    assert_eq!(format_uptime(5), "5s");
    assert_eq!(format_uptime(65), "1m 5s");
    assert_eq!(format_uptime(3665), "1h 1m 5s");
}

#[test]
fn last_lines_returns_the_whole_file_when_shorter_than_the_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");
    std::fs::write(&path, "a\nb\nc\n").unwrap();
    assert_eq!(read_last_lines(&path, 10).unwrap(), "a\nb\nc");
    assert_eq!(read_last_lines(&path, 2).unwrap(), "b\nc");
}
