#![expect(clippy::expect_used, reason = "tests may panic")]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TestDir {
    path: PathBuf,
}

impl TestDir {
    fn new(tag: &str) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let path =
            std::env::temp_dir().join(format!("glyphmask_cli_{tag}_{}_{}", std::process::id(), ts));
        fs::create_dir_all(&path).expect("create temp test dir");
        Self { path }
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_glyphmask(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_glyphmask"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("run glyphmask")
}

/// A one-glyph font: a filled triangle spanning most of a 1000-unit em.
/// Hand-assembled so the test needs no font file on disk.
fn triangle_font() -> Vec<u8> {
    let mut glyf = Vec::new();
    // Simple glyph header: 1 contour, bbox (0, 0)-(500, 600).
    for v in [1i16, 0, 0, 500, 600] {
        glyf.extend_from_slice(&v.to_be_bytes());
    }
    glyf.extend_from_slice(&2u16.to_be_bytes()); // last point index
    glyf.extend_from_slice(&0u16.to_be_bytes()); // no instructions
    glyf.extend_from_slice(&[0x01, 0x01, 0x01]); // three on-curve points
    for delta in [0i16, 500, -250] {
        glyf.extend_from_slice(&delta.to_be_bytes()); // x deltas
    }
    for delta in [0i16, 0, 600] {
        glyf.extend_from_slice(&delta.to_be_bytes()); // y deltas
    }
    glyf.push(0); // pad to even for the short loca form

    let mut loca = Vec::new();
    loca.extend_from_slice(&0u16.to_be_bytes());
    loca.extend_from_slice(&u16::try_from(glyf.len() / 2).expect("offset").to_be_bytes());

    let mut head = vec![0u8; 52];
    head[18..20].copy_from_slice(&1000u16.to_be_bytes());

    let mut maxp = vec![0u8; 6];
    maxp[4..6].copy_from_slice(&1u16.to_be_bytes());

    let tables: [(&[u8; 4], &[u8]); 4] = [
        (b"glyf", &glyf),
        (b"head", &head),
        (b"loca", &loca),
        (b"maxp", &maxp),
    ];
    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&4u16.to_be_bytes());
    font.extend_from_slice(&[0; 6]); // search fields, unused
    let mut offset = u32::try_from(12 + 16 * tables.len()).expect("directory size");
    for (tag, data) in tables {
        font.extend_from_slice(tag);
        font.extend_from_slice(&0u32.to_be_bytes()); // checksum, unused
        font.extend_from_slice(&offset.to_be_bytes());
        let len = u32::try_from(data.len()).expect("table length");
        font.extend_from_slice(&len.to_be_bytes());
        offset += len;
    }
    for (_, data) in tables {
        font.extend_from_slice(data);
    }
    font
}

#[test]
fn rasterizes_to_a_png() {
    let dir = TestDir::new("raster");
    let font_path = dir.path.join("triangle.ttf");
    fs::write(&font_path, triangle_font()).expect("write font");

    let output = run_glyphmask(
        &["--font", "triangle.ttf", "--glyphid", "0", "--ppem", "64"],
        &dir.path,
    );
    assert!(output.status.success(), "process failed: {output:?}");

    let png_path = dir.path.join("out.png");
    let png = fs::read(&png_path).expect("read out.png");
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n", "expected a png signature");
}

#[test]
fn variants_and_output_flag_work() {
    let dir = TestDir::new("variants");
    let font_path = dir.path.join("triangle.ttf");
    fs::write(&font_path, triangle_font()).expect("write font");

    for variant in ["float", "fixed", "packed"] {
        let out_name = format!("{variant}.png");
        let output = run_glyphmask(
            &[
                "--font",
                "triangle.ttf",
                "--glyphid",
                "0",
                "--ppem",
                "32",
                "--variant",
                variant,
                "-o",
                &out_name,
            ],
            &dir.path,
        );
        assert!(output.status.success(), "{variant} failed: {output:?}");
        assert!(dir.path.join(&out_name).is_file(), "{out_name} missing");
    }
}

#[test]
fn dump_prints_the_segment_stream() {
    let dir = TestDir::new("dump");
    let font_path = dir.path.join("triangle.ttf");
    fs::write(&font_path, triangle_font()).expect("write font");

    let output = run_glyphmask(
        &["--font", "triangle.ttf", "--glyphid", "0", "--ppem", "64", "--dump"],
        &dir.path,
    );
    assert!(output.status.success(), "process failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("---"), "expected contour separator first");
    assert!(stdout.contains("move"), "expected a move segment");
    assert!(stdout.contains("line"), "expected line segments");
    // Nothing should have been rasterized.
    assert!(!dir.path.join("out.png").exists());
}

#[test]
fn missing_font_file_fails() {
    let dir = TestDir::new("missing");
    let output = run_glyphmask(&["--font", "no-such-font.ttf"], &dir.path);
    assert!(!output.status.success(), "expected a failure exit");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error reading"), "got stderr: {stderr}");
}

#[test]
fn invalid_font_data_fails() {
    let dir = TestDir::new("invalid");
    let font_path = dir.path.join("broken.ttf");
    fs::write(&font_path, [0u8; 8]).expect("write broken font");
    let output = run_glyphmask(&["--font", "broken.ttf"], &dir.path);
    assert!(!output.status.success(), "expected a failure exit");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid font data"), "got stderr: {stderr}");
}

#[test]
fn out_of_range_glyph_fails_cleanly() {
    let dir = TestDir::new("norange");
    let font_path = dir.path.join("triangle.ttf");
    fs::write(&font_path, triangle_font()).expect("write font");
    let output = run_glyphmask(&["--font", "triangle.ttf", "--glyphid", "9"], &dir.path);
    assert!(!output.status.success(), "expected a failure exit");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no outline data"), "got stderr: {stderr}");
}
