// Packaging flow tests with stubbed codec / archive collaborators
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use favicon_packager::favicon::{
    ArchiveWriter, FaviconConfig, FaviconError, FaviconHandler, IconDirectory, NamedBuffer,
    PackageOutput, RasterCodec, SourceImage, TargetSizes,
};

const STUB_PAYLOAD: &[u8] = b"\x89PNG-stub";

#[derive(Default)]
struct StubCodec {
    calls: AtomicUsize,
    fail_on_size: Option<u32>,
}

impl StubCodec {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RasterCodec for StubCodec {
    fn encode_png(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FaviconError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(width, height);
        assert_eq!(pixels.len(), (width * height * 4) as usize);

        if self.fail_on_size == Some(width) {
            return Err(FaviconError::CodecFailure(format!("stub refused {width}")));
        }

        // fixed prefix + size so payloads stay distinguishable
        let mut payload = STUB_PAYLOAD.to_vec();
        payload.extend_from_slice(&width.to_le_bytes());
        Ok(payload)
    }
}

#[derive(Default)]
struct RecordingArchive {
    calls: AtomicUsize,
    names: Mutex<Vec<String>>,
}

impl RecordingArchive {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ArchiveWriter for RecordingArchive {
    fn bundle(&self, files: &[NamedBuffer]) -> Result<Vec<u8>, FaviconError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut names = self.names.lock().expect("names lock");
        names.extend(files.iter().map(|f| f.file_name.clone()));
        Ok(files.iter().flat_map(|f| f.bytes.iter().copied()).collect())
    }
}

fn source(width: u32, height: u32) -> SourceImage {
    SourceImage::new(width, height, vec![255; (width * height * 4) as usize]).expect("source")
}

fn sizes(values: &[u32]) -> TargetSizes {
    TargetSizes::new(values.iter().copied()).expect("valid sizes")
}

const STUB_LEN: usize = STUB_PAYLOAD.len() + 4;

#[test]
fn zero_sizes_fail_before_any_work() {
    let codec = StubCodec::default();
    let archive = RecordingArchive::default();
    let handler = FaviconHandler::with_collaborators(FaviconConfig::default(), &codec, &archive);

    let result = handler.package(&source(8, 8), "logo.png", &TargetSizes::default());

    assert!(matches!(result, Err(FaviconError::NoSizeSelected)));
    assert_eq!(codec.calls(), 0);
    assert_eq!(archive.calls(), 0);
}

#[test]
fn zero_sizes_fail_for_combined_output_too() {
    let codec = StubCodec::default();
    let handler =
        FaviconHandler::with_collaborators(FaviconConfig::default(), &codec, RecordingArchive::default());

    let result = handler.package_combined(&source(4, 4), "logo.png", &TargetSizes::default());

    assert!(matches!(result, Err(FaviconError::NoSizeSelected)));
    assert_eq!(codec.calls(), 0);
}

#[test]
fn single_size_never_invokes_archive_writer() {
    let codec = StubCodec::default();
    let archive = RecordingArchive::default();
    let handler = FaviconHandler::with_collaborators(FaviconConfig::default(), &codec, &archive);

    let output = handler
        .package(&source(10, 10), "brand.logo.png", &sizes(&[256]))
        .expect("package");

    assert_eq!(archive.calls(), 0);
    assert_eq!(codec.calls(), 1);

    let PackageOutput::Single { size, file } = output else {
        panic!("expected single output");
    };
    assert_eq!(size, 256);
    assert_eq!(file.file_name, "brand.logo-256x256.ico");
    assert_eq!(file.bytes.len(), 6 + 16 + STUB_LEN);

    let dir = IconDirectory::parse(&file.bytes).expect("parse");
    assert_eq!(dir.len(), 1);
    assert_eq!(dir.records[0].width, 256);
    assert_eq!((file.bytes[6], file.bytes[7]), (0, 0));
    assert!(dir.payload(&file.bytes, 0).expect("payload").starts_with(STUB_PAYLOAD));
}

#[test]
fn multiple_sizes_invoke_archive_writer_exactly_once() {
    let codec = StubCodec::default();
    let archive = RecordingArchive::default();
    let handler = FaviconHandler::with_collaborators(FaviconConfig::default(), &codec, &archive);

    let output = handler
        .package(&source(30, 20), "logo.png", &sizes(&[48, 16, 32]))
        .expect("package");

    assert_eq!(archive.calls(), 1);
    assert_eq!(codec.calls(), 3);

    let PackageOutput::Archive { file, entries } = output else {
        panic!("expected archive output");
    };
    assert_eq!(file.file_name, "logo-favicons.zip");
    assert_eq!(entries, vec!["logo-16x16.ico", "logo-32x32.ico", "logo-48x48.ico"]);
    assert_eq!(*archive.names.lock().expect("names lock"), entries);

    // each bundled file is a standalone single-entry container
    let single_len = 6 + 16 + STUB_LEN;
    assert_eq!(file.bytes.len(), single_len * 3);
    for (chunk, expected) in file.bytes.chunks(single_len).zip([16, 32, 48]) {
        let dir = IconDirectory::parse(chunk).expect("parse chunk");
        assert_eq!(dir.len(), 1);
        assert_eq!(dir.records[0].width, expected);
        assert_eq!(dir.records[0].payload_offset, 22);
    }
}

#[test]
fn every_request_bundles_once_regardless_of_size_count() {
    let archive = RecordingArchive::default();
    let handler =
        FaviconHandler::with_collaborators(FaviconConfig::default(), StubCodec::default(), &archive);

    handler
        .package(&source(64, 64), "icon", &sizes(&[16, 24, 32, 48, 64, 128, 256]))
        .expect("package");
    handler
        .package(&source(64, 64), "icon", &sizes(&[16, 32]))
        .expect("package");
    handler.package(&source(64, 64), "icon", &sizes(&[16])).expect("package");

    assert_eq!(archive.calls(), 2);
    assert_eq!(archive.names.lock().expect("names lock").len(), 9);
}

#[test]
fn sequential_mode_produces_identical_archive() {
    let parallel = FaviconHandler::with_collaborators(
        FaviconConfig::default(),
        StubCodec::default(),
        RecordingArchive::default(),
    );
    let sequential = FaviconHandler::with_collaborators(
        FaviconConfig {
            parallel_sizes: false,
            ..FaviconConfig::default()
        },
        StubCodec::default(),
        RecordingArchive::default(),
    );
    let selection = sizes(&[16, 32, 64, 128]);

    let a = parallel.package(&source(40, 25), "x.png", &selection).expect("parallel");
    let b = sequential.package(&source(40, 25), "x.png", &selection).expect("sequential");

    assert_eq!(a, b);
}

#[test]
fn codec_failure_fails_whole_request() {
    let codec = StubCodec {
        fail_on_size: Some(32),
        ..StubCodec::default()
    };
    let archive = RecordingArchive::default();
    let handler = FaviconHandler::with_collaborators(FaviconConfig::default(), &codec, &archive);

    let result = handler.package(&source(20, 20), "logo.png", &sizes(&[16, 32, 48]));

    assert!(matches!(result, Err(FaviconError::CodecFailure(_))));
    assert_eq!(archive.calls(), 0);
}

#[test]
fn degenerate_source_reports_invalid_dimensions() {
    let archive = RecordingArchive::default();
    let handler =
        FaviconHandler::with_collaborators(FaviconConfig::default(), StubCodec::default(), &archive);

    let result = handler.package(&source(0, 5), "logo.png", &sizes(&[16, 32]));

    assert!(matches!(result, Err(FaviconError::InvalidDimensions { .. })));
    assert_eq!(archive.calls(), 0);
}

#[test]
fn combined_output_uses_stub_payloads_in_ascending_order() {
    let handler = FaviconHandler::with_collaborators(
        FaviconConfig::default(),
        StubCodec::default(),
        RecordingArchive::default(),
    );

    let file = handler
        .package_combined(&source(12, 12), "logo.png", &sizes(&[256, 16, 32]))
        .expect("combined");

    assert_eq!(file.file_name, "logo.ico");
    assert_eq!(file.bytes.len(), 6 + 3 * 16 + 3 * STUB_LEN);

    let dir = IconDirectory::parse(&file.bytes).expect("parse");
    let base = (6 + 3 * 16) as u32;
    let step = STUB_LEN as u32;
    let offsets: Vec<u32> = dir.records.iter().map(|r| r.payload_offset).collect();
    assert_eq!(offsets, vec![base, base + step, base + 2 * step]);

    let last = dir.payload(&file.bytes, 2).expect("payload");
    assert_eq!(&last[STUB_PAYLOAD.len()..], &256_u32.to_le_bytes());
}
