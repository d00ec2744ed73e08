use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use tcfpak::tcf::{
    self, crc32, Cipher, ExtractOptions, Header, StatusCode, TcfError, HEADER_LEN,
};

/// Hand-assembles an archive, so tests can plant entries `pack` would never write.
fn craft(entries: &[(&str, &str)]) -> Vec<u8> {
    let c = Cipher::TCF;
    let mut payload = Vec::new();
    let mut index = Vec::new();
    for (path, data) in entries {
        let data = data.as_bytes();
        let offset = payload.len() as u32;
        payload.extend(data.iter().map(|b| c.forward(*b)));
        index.extend_from_slice(&(path.len() as u16).to_le_bytes());
        index.extend_from_slice(path.as_bytes());
        index.extend_from_slice(&offset.to_le_bytes());
        index.extend_from_slice(&(data.len() as u32).to_le_bytes());
    }

    let header = Header::new((HEADER_LEN + payload.len()) as u32, entries.len() as u32);
    let mut out = header.to_bytes().to_vec();
    out.extend_from_slice(&payload);
    out.extend_from_slice(&index);
    out.extend_from_slice(b"EOF");
    out
}

fn files_under(root: &Path) -> Vec<(String, Vec<u8>)> {
    let mut out: Vec<(String, Vec<u8>)> = WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            (rel, fs::read(e.path()).unwrap())
        })
        .collect();
    out.sort();
    out
}

#[test]
fn scenario_pack_and_extract() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    fs::create_dir_all(input.join("sub")).unwrap();
    fs::write(input.join("a.txt"), b"hello").unwrap();
    fs::write(input.join("sub/b.bin"), [0x00u8, 0xFF, 0x10]).unwrap();
    let arc = tmp.path().join("out.tcf");

    let summary = tcf::pack(&input, &arc).unwrap();
    assert_eq!(summary.entries, 2);
    assert_eq!(summary.index_offset, 26);

    let raw = fs::read(&arc).unwrap();
    let mut head = [0u8; HEADER_LEN];
    head.copy_from_slice(&raw[..HEADER_LEN]);
    let header = Header::parse(&head).unwrap();
    assert_eq!(header.entry_count, 2);
    assert_eq!(header.index_offset, 18 + 5 + 3);

    let out = tmp.path().join("fresh");
    let report = tcf::extract(&arc, &out).unwrap();
    assert_eq!(report.extracted, vec!["a.txt".to_string(), "sub/b.bin".to_string()]);
    assert!(report.skipped_unsafe.is_empty());
    assert_eq!(report.bytes_written, 8);

    assert_eq!(fs::read(out.join("a.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(out.join("sub").join("b.bin")).unwrap(), vec![0x00, 0xFF, 0x10]);
}

#[test]
fn round_trip_preserves_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    fs::create_dir_all(input.join("deep/er/still")).unwrap();
    fs::create_dir_all(input.join("empty_dir")).unwrap();
    fs::write(input.join("empty.txt"), b"").unwrap();
    fs::write(input.join("all_bytes.bin"), (0..=255u8).collect::<Vec<_>>()).unwrap();
    let big: Vec<u8> = (0..20_000u32).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(input.join("deep/er/still/big.bin"), &big).unwrap();
    fs::write(input.join("deep/notes.md"), "# notes\nutf-8: \u{e9}\n").unwrap();

    let arc = tmp.path().join("tree.tcf");
    tcf::pack(&input, &arc).unwrap();

    let out = tmp.path().join("out");
    let report = tcf::extract(&arc, &out).unwrap();
    assert_eq!(report.extracted.len(), 4);

    assert_eq!(files_under(&out), files_under(&input));
}

#[test]
fn packing_twice_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    fs::create_dir_all(input.join("b")).unwrap();
    for name in ["z", "a", "m", "b/c", "b/a"] {
        fs::write(input.join(name), name.as_bytes()).unwrap();
    }

    let one = tmp.path().join("one.tcf");
    let two = tmp.path().join("two.tcf");
    tcf::pack(&input, &one).unwrap();
    tcf::pack(&input, &two).unwrap();
    assert_eq!(fs::read(one).unwrap(), fs::read(two).unwrap());
}

#[test]
fn offsets_skip_over_empty_files() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("1_first"), [1u8; 5]).unwrap();
    fs::write(input.join("2_empty"), b"").unwrap();
    fs::write(input.join("3_third"), [3u8; 12]).unwrap();

    let arc = tmp.path().join("o.tcf");
    let summary = tcf::pack(&input, &arc).unwrap();
    assert_eq!(summary.payload_bytes, 17);
    assert_eq!(summary.index_offset as usize, HEADER_LEN + 17);

    let offsets: Vec<(u32, u32)> = tcf::entries(&arc)
        .unwrap()
        .into_iter()
        .map(|e| (e.offset, e.size))
        .collect();
    assert_eq!(offsets, vec![(0, 5), (5, 0), (5, 12)]);
}

#[test]
fn header_tamper_is_integrity_error_and_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("a.txt"), b"hello").unwrap();
    let arc = tmp.path().join("a.tcf");
    tcf::pack(&input, &arc).unwrap();
    let good = fs::read(&arc).unwrap();

    for byte in 3..14 {
        for bit in 0..8 {
            let mut bad = good.clone();
            bad[byte] ^= 1 << bit;
            let path = tmp.path().join("bad.tcf");
            fs::write(&path, &bad).unwrap();

            let out = tmp.path().join(format!("out_{byte}_{bit}"));
            let res = tcf::extract(&path, &out);
            assert_eq!(StatusCode::of(&res), StatusCode::IntegrityError, "byte {byte} bit {bit}");
            assert!(!out.exists(), "byte {byte} bit {bit} wrote output");
        }
    }
}

#[test]
fn bad_magic_is_format_error() {
    let tmp = tempfile::tempdir().unwrap();
    let arc = tmp.path().join("notes.txt");
    fs::write(&arc, b"this is plainly not an archive").unwrap();
    let res = tcf::extract(&arc, &tmp.path().join("out"));
    assert_eq!(StatusCode::of(&res), StatusCode::FormatError);

    let short = tmp.path().join("short.tcf");
    fs::write(&short, b"TCF\x01").unwrap();
    let res = tcf::extract(&short, &tmp.path().join("out"));
    assert_eq!(StatusCode::of(&res), StatusCode::FormatError);
}

#[test]
fn missing_archive_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let res = tcf::extract(&tmp.path().join("nope.tcf"), &tmp.path().join("out"));
    assert_eq!(StatusCode::of(&res), StatusCode::IoError);
}

#[test]
fn traversal_entry_is_skipped_and_later_entries_restored() {
    let tmp = tempfile::tempdir().unwrap();
    let arc = tmp.path().join("evil.tcf");
    fs::write(
        &arc,
        craft(&[
            ("first.txt", "one"),
            ("../../etc/passwd", "root::0:0"),
            ("/abs.txt", "abs"),
            ("later/ok.txt", "two"),
        ]),
    )
    .unwrap();

    let out = tmp.path().join("sandbox").join("out");
    let report = tcf::extract(&arc, &out).unwrap();
    assert_eq!(report.extracted, vec!["first.txt".to_string(), "later/ok.txt".to_string()]);
    assert_eq!(
        report.skipped_unsafe,
        vec!["../../etc/passwd".to_string(), "/abs.txt".to_string()]
    );

    assert_eq!(fs::read(out.join("first.txt")).unwrap(), b"one");
    assert_eq!(fs::read(out.join("later").join("ok.txt")).unwrap(), b"two");
    assert!(!tmp.path().join("etc").exists());
    assert!(!tmp.path().join("sandbox").join("etc").exists());
    assert_eq!(files_under(tmp.path().join("sandbox").as_path()).len(), 2);
}

#[test]
fn strict_mode_rejects_traversal() {
    let tmp = tempfile::tempdir().unwrap();
    let arc = tmp.path().join("evil.tcf");
    fs::write(&arc, craft(&[("../x", "x")])).unwrap();

    let opts = ExtractOptions {
        strict: true,
        ..ExtractOptions::default()
    };
    let err = tcf::extract_with(&arc, &tmp.path().join("out"), &opts, &Cipher::TCF).unwrap_err();
    assert!(matches!(err, TcfError::UnsafePath(ref p) if p == "../x"));
    assert_eq!(StatusCode::from(&err), StatusCode::FormatError);
}

#[test]
fn duplicate_paths_last_write_wins() {
    let tmp = tempfile::tempdir().unwrap();
    let arc = tmp.path().join("dup.tcf");
    fs::write(&arc, craft(&[("same.txt", "old"), ("same.txt", "newer")])).unwrap();

    let out = tmp.path().join("out");
    let report = tcf::extract(&arc, &out).unwrap();
    assert_eq!(report.extracted.len(), 2);
    assert_eq!(fs::read(out.join("same.txt")).unwrap(), b"newer");
}

#[test]
fn filter_limits_extraction() {
    let tmp = tempfile::tempdir().unwrap();
    let arc = tmp.path().join("f.tcf");
    fs::write(&arc, craft(&[("keep/a", "a"), ("drop/b", "b")])).unwrap();

    let opts = ExtractOptions {
        filter: vec!["keep/".into()],
        ..ExtractOptions::default()
    };
    let out = tmp.path().join("out");
    let report = tcf::extract_with(&arc, &out, &opts, &Cipher::TCF).unwrap();
    assert_eq!(report.extracted, vec!["keep/a".to_string()]);
    assert_eq!(report.filtered, 1);
    assert!(!out.join("drop").exists());
}

#[test]
fn truncated_index_is_format_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mut bytes = craft(&[("a.txt", "hello")]);
    bytes.truncate(HEADER_LEN + 5 + 4);
    let arc = tmp.path().join("t.tcf");
    fs::write(&arc, &bytes).unwrap();

    let res = tcf::extract(&arc, &tmp.path().join("out"));
    assert_eq!(StatusCode::of(&res), StatusCode::FormatError);
}

#[test]
fn truncated_payload_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mut bytes = craft(&[("a.txt", "hello")]);
    bytes.truncate(HEADER_LEN + 2);
    let arc = tmp.path().join("t.tcf");
    fs::write(&arc, &bytes).unwrap();

    let res = tcf::extract(&arc, &tmp.path().join("out"));
    assert_eq!(StatusCode::of(&res), StatusCode::IoError);
}

#[test]
fn header_claiming_missing_payload_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let arc = tmp.path().join("liar.tcf");
    let header = Header::new(HEADER_LEN as u32 + (1 << 30), 0);
    fs::write(&arc, header.to_bytes()).unwrap();

    let out = tmp.path().join("out");
    let res = tcf::extract(&arc, &out);
    assert_eq!(StatusCode::of(&res), StatusCode::IoError);
    assert!(!out.exists());
}

#[test]
fn packing_a_regular_file_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("a.txt");
    fs::write(&input, b"hello").unwrap();

    let res = tcf::pack(&input, &tmp.path().join("a.tcf"));
    assert_eq!(StatusCode::of(&res), StatusCode::IoError);
}

#[cfg(unix)]
#[test]
fn blocked_destination_aborts_with_count() {
    let tmp = tempfile::tempdir().unwrap();
    let arc = tmp.path().join("b.tcf");
    fs::write(&arc, craft(&[("a.txt", "a"), ("blocker/x.txt", "x"), ("z.txt", "z")])).unwrap();

    let out = tmp.path().join("out");
    fs::create_dir_all(&out).unwrap();
    // a regular file where a directory is needed
    fs::write(out.join("blocker"), b"").unwrap();

    let err = tcf::extract(&arc, &out).unwrap_err();
    match &err {
        TcfError::Aborted { path, written, .. } => {
            assert_eq!(path, "blocker/x.txt");
            assert_eq!(*written, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(StatusCode::from(&err), StatusCode::IoError);
    assert!(out.join("a.txt").exists());
    assert!(!out.join("z.txt").exists());
}

#[test]
fn empty_archive_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("in");
    fs::create_dir_all(input.join("only/dirs")).unwrap();
    let arc = tmp.path().join("e.tcf");
    tcf::pack(&input, &arc).unwrap();

    let out = tmp.path().join("out");
    let report = tcf::extract(&arc, &out).unwrap();
    assert!(report.extracted.is_empty());
    assert!(out.is_dir());
}

#[test]
fn crafted_header_matches_crc_rule() {
    let bytes = craft(&[("a", "a")]);
    let stored = u32::from_le_bytes([bytes[14], bytes[15], bytes[16], bytes[17]]);
    assert_eq!(stored, crc32(&bytes[..14]));
}
