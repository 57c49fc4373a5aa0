use super::*;

#[test]
fn memory_sink_records_saves_in_order() {
    let mut sink = InMemorySink::new();
    sink.save("a.png", &[1, 2]).unwrap();
    let saved = sink.save("b.png", &[3]).unwrap();
    assert_eq!(saved.bytes, 1);
    assert!(saved.path.is_none());
    assert_eq!(sink.saved.len(), 2);
    assert_eq!(sink.last().unwrap().0, "b.png");
}

#[test]
fn directory_sink_writes_and_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path().join("out"));
    sink.save("layr.png", b"first").unwrap();
    let saved = sink.save("layr.png", b"second").unwrap();
    let path = saved.path.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"second");
    let names: Vec<_> = std::fs::read_dir(sink.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names.len(), 1);
}

#[test]
fn directory_sink_rejects_paths() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = DirectorySink::new(dir.path());
    assert!(sink.save("../escape.png", b"x").is_err());
    assert!(sink.save("", b"x").is_err());
}

#[test]
fn failed_rename_leaves_no_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    // A non-empty directory where the export should land makes the rename fail.
    std::fs::create_dir_all(dir.path().join("layr.png").join("taken")).unwrap();
    let mut sink = DirectorySink::new(dir.path());
    assert!(sink.save("layr.png", b"bytes").is_err());
    assert!(!dir.path().join(".layr.png.partial").exists());
}
