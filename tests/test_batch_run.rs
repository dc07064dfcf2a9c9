use ndarray::{Array2, Array3};
use skyparcel::core::ImageRequestSpec;
use skyparcel::types::{PixelData, TileError, TileResult};
use skyparcel::{run_batch, FailureRecord, ImageryClient, PngWriter, RunPaths};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Answers by the latitude of the requested box centre, rounded to 0.1 degree
struct FakeImagery {
    by_lat: HashMap<i64, TileResult<Option<PixelData>>>,
    calls: usize,
}

impl FakeImagery {
    fn new() -> Self {
        Self { by_lat: HashMap::new(), calls: 0 }
    }

    fn respond(mut self, lat: f64, response: TileResult<Option<PixelData>>) -> Self {
        self.by_lat.insert((lat * 10.0).round() as i64, response);
        self
    }
}

impl ImageryClient for FakeImagery {
    fn fetch(&mut self, spec: &ImageRequestSpec) -> TileResult<Option<PixelData>> {
        self.calls += 1;
        let (_, lat) = spec.bbox.center();
        self.by_lat
            .remove(&((lat * 10.0).round() as i64))
            .unwrap_or(Ok(None))
    }
}

fn rgb_tile() -> PixelData {
    PixelData::MultiBand(Array3::from_elem((8, 8, 3), 120u8))
}

fn setup(csv: &str) -> (TempDir, RunPaths) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let paths = RunPaths::under(dir.path());
    fs::create_dir_all(paths.input_csv.parent().unwrap()).unwrap();
    fs::write(&paths.input_csv, csv).unwrap();
    (dir, paths)
}

fn png_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_one_failure_out_of_three() {
    let (_dir, paths) = setup("id,lat,long\n1,10.0,20.0\n2,11.0,21.0\n3,12.0,22.0\n");

    let mut client = FakeImagery::new()
        .respond(10.0, Ok(Some(rgb_tile())))
        .respond(11.0, Err(TileError::Http("Process API request failed with status 500".into())))
        .respond(12.0, Ok(Some(PixelData::SingleBand(Array2::from_elem((8, 8), 60u8)))));

    let summary = run_batch(&paths, &mut client, &PngWriter).expect("run should not abort");

    assert_eq!(client.calls, 3);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.saved.len(), 2);
    assert_eq!(
        png_names(&paths.images_dir),
        vec!["1_10.00000_20.00000.png", "3_12.00000_22.00000.png"]
    );

    // single-band tile was written as RGB
    let gray_tile = image::open(paths.images_dir.join("3_12.00000_22.00000.png")).unwrap();
    assert_eq!(gray_tile.color(), image::ColorType::Rgb8);
    assert_eq!(gray_tile.to_rgb8().get_pixel(0, 0).0, [60, 60, 60]);

    assert_eq!(summary.failure_log.as_deref(), Some(paths.failure_log.as_path()));
    assert!(summary.summary_line().starts_with("Finished with 1 failures."));

    let mut reader = csv::Reader::from_path(&paths.failure_log).unwrap();
    let logged: Vec<FailureRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(
        logged,
        vec![FailureRecord {
            id: "2".into(),
            error: "Process API request failed with status 500".into(),
        }]
    );
}

#[test]
fn test_all_success_writes_no_log() {
    let (_dir, paths) = setup("id,lat,long,price\n42,37.7749,-122.4194,1000000\n");
    let mut client = FakeImagery::new().respond(37.7749, Ok(Some(rgb_tile())));

    let summary = run_batch(&paths, &mut client, &PngWriter).unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.summary_line(), "All images downloaded successfully.");
    assert!(summary.failure_log.is_none());
    assert!(!paths.failure_log.exists());
    assert_eq!(png_names(&paths.images_dir), vec!["42_37.77490_-122.41940.png"]);
}

#[test]
fn test_empty_response_is_logged() {
    let (_dir, paths) = setup("id,lat,long\n5,40.0,-3.7\n");
    let mut client = FakeImagery::new().respond(40.0, Ok(None));

    let summary = run_batch(&paths, &mut client, &PngWriter).unwrap();

    assert!(png_names(&paths.images_dir).is_empty());
    let content = fs::read_to_string(&paths.failure_log).unwrap();
    assert_eq!(content, "id,error\n5,Empty image data returned\n");
    assert_eq!(summary.failures.len(), 1);
}

#[test]
fn test_missing_long_column_aborts_before_any_row() {
    let (_dir, paths) = setup("id,lat\n1,10.0\n2,11.0\n");
    let mut client = FakeImagery::new();

    let err = run_batch(&paths, &mut client, &PngWriter).unwrap_err();

    assert!(matches!(err, TileError::MissingColumn(ref column) if column == "long"));
    assert_eq!(client.calls, 0);
    assert!(!paths.images_dir.exists());
    assert!(!paths.failure_log.exists());
}

#[test]
fn test_missing_input_file_aborts() {
    let dir = TempDir::new().unwrap();
    let paths = RunPaths::under(dir.path());
    let mut client = FakeImagery::new();

    let err = run_batch(&paths, &mut client, &PngWriter).unwrap_err();

    assert!(matches!(err, TileError::MissingInputFile(_)));
    assert!(err.to_string().starts_with("CSV file not found at"));
    assert_eq!(client.calls, 0);
}

#[test]
fn test_malformed_row_does_not_stop_batch() {
    let (_dir, paths) = setup("id,lat,long\n1,not-a-number,20.0\n2,11.0,21.0\n");
    let mut client = FakeImagery::new().respond(11.0, Ok(Some(rgb_tile())));

    let summary = run_batch(&paths, &mut client, &PngWriter).unwrap();

    assert_eq!(client.calls, 1);
    assert_eq!(summary.saved.len(), 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].id, "1");
    assert!(summary.failures[0].error.contains("lat"));
}
