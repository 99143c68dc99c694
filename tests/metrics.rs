use taxi_trip_prep::RunMetrics;

#[test]
fn elapsed_needs_both_ends() {
    let mut m = RunMetrics::new();
    assert!(m.elapsed().is_none());
    m.record_start();
    assert!(m.elapsed().is_none());
    m.record_end();
    assert!(m.elapsed().is_some());
}

#[test]
fn json_omits_time_until_run_ends() {
    let mut m = RunMetrics::new();
    m.chunks_written = 3;
    m.records_written = 120;
    let json = m.to_json();
    assert_eq!(json["chunks_written"], 3);
    assert_eq!(json["records_written"], 120);
    assert!(json.get("execution_time_ms").is_none());
}
