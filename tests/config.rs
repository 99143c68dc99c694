use anyhow::Result;
use std::path::PathBuf;
use taxi_trip_prep::PipelineConfig;

#[test]
fn defaults_match_the_dataset_layout() {
    let c = PipelineConfig::default();
    assert_eq!(c.source, PathBuf::from("csvData/train.csv"));
    assert_eq!(c.output_dir, PathBuf::from("jsonData"));
    assert_eq!(c.chunk_size, 1000);
    assert_eq!(c.skip_rows, 0);
    assert_eq!(c.start_chunk_index, 0);
    assert_eq!(c.progress_every, 100);
    assert!(!c.pretty);
    assert_eq!(c.na_values, vec!["".to_string(), "NA".to_string()]);
    assert!(c.validate().is_ok());
}

#[test]
fn from_file_fills_missing_fields_with_defaults() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("prep.json");
    std::fs::write(
        &path,
        r#"{"source": "data/train.csv.gz", "chunk_size": 250, "skip_rows": 5000}"#,
    )?;

    let c = PipelineConfig::from_file(&path)?;
    assert_eq!(c.source, PathBuf::from("data/train.csv.gz"));
    assert_eq!(c.chunk_size, 250);
    assert_eq!(c.skip_rows, 5000);
    assert_eq!(c.output_dir, PathBuf::from("jsonData"));
    assert_eq!(c.progress_every, 100);
    Ok(())
}

#[test]
fn from_file_reports_bad_documents() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("prep.json");
    std::fs::write(&path, r#"{"chunk_size": "lots"}"#)?;
    let err = PipelineConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("prep.json"));

    assert!(PipelineConfig::from_file(tmp.path().join("absent.json")).is_err());
    Ok(())
}

#[test]
fn config_round_trips_through_json() -> Result<()> {
    let mut c = PipelineConfig::new("in.csv", "out");
    c.pretty = true;
    c.na_values = vec!["NULL".into()];
    let back: PipelineConfig = serde_json::from_str(&serde_json::to_string(&c)?)?;
    assert_eq!(back, c);
    Ok(())
}

#[test]
fn validate_rejects_unusable_values() {
    let mut c = PipelineConfig::default();
    c.chunk_size = 0;
    assert!(c.validate().is_err());

    let mut c = PipelineConfig::default();
    c.progress_every = 0;
    assert!(c.validate().is_err());

    let c = PipelineConfig::new("", "out");
    assert!(c.validate().is_err());
}

#[test]
fn missing_values_follow_config() {
    let mut c = PipelineConfig::default();
    c.na_values = vec!["-".into()];
    let na = c.missing_values();
    assert!(na.is_missing("-"));
    assert!(!na.is_missing("NA"));
}
