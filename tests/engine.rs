//! End-to-end scenarios driven entirely through the public `Engine` API
//! against a real temporary `fat.part` file.

use fatsim::engine::Listing;
use fatsim::geometry::{CLUSTER_COUNT, CLUSTER_SIZE, DATA_CLUSTER_START, PARTITION_SIZE};
use fatsim::{Engine, FsError};
use tempfile::tempdir;

fn new_engine() -> (tempfile::TempDir, Engine) {
    let dir = tempdir().unwrap();
    (dir, Engine::new(dir.path()))
}

#[test]
fn init_produces_the_exact_byte_layout_from_scenario_1() {
    let (dir, mut engine) = new_engine();
    engine.format().unwrap();

    let bytes = std::fs::read(dir.path().join("fat.part")).unwrap();
    assert_eq!(bytes.len(), PARTITION_SIZE as usize);
    assert_eq!(bytes[0], 0xBB);
    assert_eq!(&bytes[1024..1026], &[0xFD, 0xFF]);
    assert_eq!(&bytes[1024 + 18..1024 + 20], &[0xFF, 0xFF]);

    let root_start = 9 * CLUSTER_SIZE;
    assert!(bytes[root_start..root_start + CLUSTER_SIZE].iter().all(|&b| b == 0));
}

#[test]
fn mkdir_nested_then_ls_matches_scenario_2() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    engine.mkdir("/a").unwrap();
    engine.mkdir("/a/b").unwrap();

    match engine.ls("/a").unwrap() {
        Listing::Dir(entries) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].name, "b");
            assert_eq!(entries[0].size, 0);
            assert!(entries[0].is_dir());
        }
        _ => panic!("expected a directory listing"),
    }
}

#[test]
fn create_write_read_matches_scenario_3() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    engine.create("/f").unwrap();
    engine.write("/f", b"hello").unwrap();

    let mut out = Vec::new();
    engine.read("/f", &mut out).unwrap();
    assert_eq!(out, b"hello\n");

    match engine.ls("/f").unwrap() {
        Listing::File(name) => assert_eq!(name, "f"),
        _ => panic!("expected a file listing"),
    }
}

#[test]
fn write_spanning_two_clusters_matches_scenario_4() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    engine.create("/f").unwrap();
    let content = vec![b'x'; 1025];
    engine.write("/f", &content).unwrap();

    let mut out = Vec::new();
    engine.read("/f", &mut out).unwrap();
    assert_eq!(&out[..1025], content.as_slice());
    assert_eq!(out[1025], b'\n');
}

#[test]
fn append_then_append_then_read_matches_scenario_5() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    engine.create("/f").unwrap();
    engine.append("/f", b"AB").unwrap();
    engine.append("/f", b"CD").unwrap();

    let mut out = Vec::new();
    engine.read("/f", &mut out).unwrap();
    assert_eq!(out, b"ABCD\n");
}

#[test]
fn unlink_nonempty_then_empty_directory_matches_scenario_6() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    engine.mkdir("/d").unwrap();
    engine.create("/d/x").unwrap();

    let err = engine.unlink("/d").unwrap_err();
    assert!(matches!(err, FsError::NotEmpty(_)));

    engine.unlink("/d/x").unwrap();
    engine.unlink("/d").unwrap();
}

#[test]
fn round_trip_write_read_at_boundary_lengths() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();
    engine.create("/f").unwrap();

    for &len in &[0usize, 1, 1023, 1024, 1025, 4096] {
        let content = vec![b'q'; len];
        engine.write("/f", &content).unwrap();
        let mut out = Vec::new();
        engine.read("/f", &mut out).unwrap();
        assert_eq!(&out[..len], content.as_slice(), "mismatch at len {len}");
        assert_eq!(out[len], b'\n', "missing trailing newline at len {len}");
    }
}

#[test]
fn name_of_17_bytes_is_preserved_and_18_is_truncated() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    let name17 = "a".repeat(17);
    engine.mkdir(&format!("/{name17}")).unwrap();
    let name18 = "b".repeat(18);
    engine.mkdir(&format!("/{name18}")).unwrap();

    match engine.ls("/").unwrap() {
        Listing::Dir(entries) => {
            let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
            assert!(names.contains(&name17.as_str()));
            assert!(names.contains(&"b".repeat(17).as_str()));
        }
        _ => panic!("expected a directory listing"),
    }
}

#[test]
fn filling_the_root_then_one_more_mkdir_yields_dir_full() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    for i in 0..32 {
        engine.mkdir(&format!("/d{i}")).unwrap();
    }
    let err = engine.mkdir("/overflow").unwrap_err();
    assert!(matches!(err, FsError::DirFull));
}

#[test]
fn exhausting_data_clusters_via_write_yields_no_space_and_fat_is_unchanged() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    engine.create("/f").unwrap();

    let available_clusters = CLUSTER_COUNT - DATA_CLUSTER_START as usize;
    // `write` frees /f's existing chain before allocating, so all
    // `available_clusters` are free again by the time it allocates — one
    // cluster more than that is what actually forces NO_SPACE.
    let too_much = (available_clusters + 1) * CLUSTER_SIZE;
    let err = engine.write("/f", &vec![b'z'; too_much]).unwrap_err();
    assert!(matches!(err, FsError::NoSpace));

    let mut out = Vec::new();
    engine.read("/f", &mut out).unwrap();
    assert_eq!(out, b"\n", "write must have left the file empty after rollback");
}

#[test]
fn unlink_root_is_rejected() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    let err = engine.unlink("/").unwrap_err();
    assert!(matches!(err, FsError::InvalidPath(_)));
}

#[test]
fn unlinking_every_root_entry_returns_fat_to_post_format_state() {
    let (dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    engine.create("/f").unwrap();
    engine.write("/f", &vec![b'a'; 3000]).unwrap();
    engine.mkdir("/d").unwrap();
    engine.append("/f", b"more").unwrap();

    engine.unlink("/f").unwrap();
    engine.unlink("/d").unwrap();

    // Remount from disk to verify persisted FAT state, not just memory.
    let mut reloaded = Engine::new(dir.path());
    reloaded.mount().unwrap();

    match reloaded.ls("/").unwrap() {
        Listing::Dir(entries) => assert!(entries.is_empty()),
        _ => panic!("expected a directory listing"),
    }
}

#[test]
fn mkdir_rejects_a_duplicate_name() {
    let (_dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();

    engine.create("/f").unwrap();
    let err = engine.create("/f").unwrap_err();
    assert!(matches!(err, FsError::AlreadyExists(_)));
}

#[test]
fn operations_before_mount_fail_with_not_mounted() {
    let (dir, _engine) = new_engine();
    let mut engine = Engine::new(dir.path());
    engine.format().unwrap();
    // format() leaves the engine unmounted per the command table.
    let err = engine.ls("/").unwrap_err();
    assert!(matches!(err, FsError::NotMounted));
}

#[test]
fn a_two_cluster_file_survives_a_remount() {
    let (dir, mut engine) = new_engine();
    engine.format().unwrap();
    engine.mount().unwrap();
    engine.create("/f").unwrap();
    engine.write("/f", &vec![b'x'; 1025]).unwrap();
    drop(engine);

    let mut reloaded = Engine::new(dir.path());
    reloaded.mount().unwrap();
    let mut out = Vec::new();
    reloaded.read("/f", &mut out).unwrap();
    assert_eq!(out.len(), 1026);
}
