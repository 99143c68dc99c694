use taxi_trip_prep::record::{Location, TripRecord};
use taxi_trip_prep::transform::*;

fn trip(id: &str, start: Option<u64>, location: Option<&str>) -> TripRecord {
    TripRecord {
        trip_id: Some(id.to_string()),
        call_type: Some("C".into()),
        customer_id: None,
        taxi_stand_id: Some("15".into()),
        taxi_id: Some("20000589".into()),
        trip_start_time: start,
        surge_rate: Some("A".into()),
        partial_location_flag: false,
        trip_location: location.map(str::to_string),
    }
}

#[test]
fn two_point_trip_becomes_two_instances() -> anyhow::Result<()> {
    let out = transform_chunk(vec![trip(
        "T1",
        Some(1_400_000_000),
        Some("[[1.0,2.0],[1.1,2.1]]"),
    )])?;

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].trip_id.as_deref(), Some("T1"));
    assert_eq!(out[0].trip_start_time, Some(1_400_000_000_000));
    assert_eq!(out[0].trip_instance_id, 0);
    assert_eq!(out[0].trip_instance_location, Some([1.0, 2.0]));
    assert_eq!(out[1].trip_start_time, Some(1_400_000_000_000));
    assert_eq!(out[1].trip_instance_id, 1);
    assert_eq!(out[1].trip_instance_location, Some([1.1, 2.1]));
    for rec in &out {
        assert_eq!(rec.call_type.as_deref(), Some("C"));
        assert_eq!(rec.customer_id, None);
        assert_eq!(rec.taxi_stand_id.as_deref(), Some("15"));
        assert_eq!(rec.taxi_id.as_deref(), Some("20000589"));
        assert_eq!(rec.surge_rate.as_deref(), Some("A"));
        assert!(!rec.partial_location_flag);
    }
    Ok(())
}

#[test]
fn empty_polyline_yields_one_null_location() -> anyhow::Result<()> {
    let out = transform_chunk(vec![trip("T2", Some(10), Some("[]"))])?;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].trip_instance_id, 0);
    assert_eq!(out[0].trip_instance_location, None);
    assert_eq!(out[0].trip_start_time, Some(10_000));
    Ok(())
}

#[test]
fn record_count_is_sum_of_max_one_points() -> anyhow::Result<()> {
    let trips = vec![
        trip("a", Some(1), Some("[[0,0],[1,1],[2,2]]")),
        trip("b", Some(2), Some("[]")),
        trip("c", Some(3), Some("[[5,5]]")),
        trip("d", Some(4), Some("[ ]")),
    ];
    let out = transform_chunk(trips)?;
    assert_eq!(out.len(), 3 + 1 + 1 + 1);
    Ok(())
}

#[test]
fn preserves_trip_order_and_point_order() -> anyhow::Result<()> {
    let trips = vec![
        trip("first", Some(1), Some("[[0.5,1.5],[0.6,1.6]]")),
        trip("second", Some(2), Some("[]")),
        trip("third", Some(3), Some("[[9.0,8.0],[7.0,6.0],[5.0,4.0]]")),
    ];
    let out = transform_chunk(trips)?;
    let keys: Vec<_> = out
        .iter()
        .map(|r| (r.trip_id.clone().unwrap_or_default(), r.trip_instance_id))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("first".to_string(), 0),
            ("first".to_string(), 1),
            ("second".to_string(), 0),
            ("third".to_string(), 0),
            ("third".to_string(), 1),
            ("third".to_string(), 2),
        ]
    );
    Ok(())
}

#[test]
fn locations_round_trip_in_instance_order() -> anyhow::Result<()> {
    let points: Vec<Location> = vec![
        [-8.618643, 41.141412],
        [-8.618499, 41.141376],
        [-8.620326, 41.14251],
        [-8.622153, 41.143815],
    ];
    let raw = serde_json::to_string(&points)?;
    let out = transform_chunk(vec![trip("T", Some(1), Some(&raw))])?;

    let mut sorted = out.clone();
    sorted.sort_by_key(|r| r.trip_instance_id);
    let rebuilt: Vec<Location> = sorted
        .iter()
        .filter_map(|r| r.trip_instance_location)
        .collect();
    assert_eq!(rebuilt, points);
    Ok(())
}

#[test]
fn rescale_multiplies_by_one_thousand_and_keeps_nulls() -> anyhow::Result<()> {
    let mut trips = vec![
        trip("a", Some(1_372_636_858), Some("[]")),
        trip("b", None, Some("[]")),
        trip("c", Some(0), Some("[]")),
    ];
    rescale_start_times(&mut trips)?;
    assert_eq!(trips[0].trip_start_time, Some(1_372_636_858_000));
    assert_eq!(trips[1].trip_start_time, None);
    assert_eq!(trips[2].trip_start_time, Some(0));
    Ok(())
}

#[test]
fn rescale_overflow_fails() {
    let mut trips = vec![trip("big", Some(u64::MAX / 10), Some("[]"))];
    let err = rescale_start_times(&mut trips).unwrap_err();
    assert!(err.to_string().contains("big"));
}

#[test]
fn invalid_json_fails_the_whole_chunk() {
    let trips = vec![
        trip("ok", Some(1), Some("[[1.0,2.0]]")),
        trip("bad", Some(2), Some("[[1.0,2.0]")),
    ];
    let err = transform_chunk(trips).unwrap_err();
    assert!(format!("{err:#}").contains("bad"));
}

#[test]
fn wrong_point_arity_fails() {
    assert!(parse_locations(&trip("x", Some(1), Some("[[1.0]]"))).is_err());
    assert!(parse_locations(&trip("x", Some(1), Some("[[1.0,2.0,3.0]]"))).is_err());
    assert!(parse_locations(&trip("x", Some(1), Some("[\"a\"]"))).is_err());
}

#[test]
fn null_location_fails() {
    let err = parse_locations(&trip("nil", Some(1), None)).unwrap_err();
    assert!(err.to_string().contains("trip_location is null"));
}

#[test]
fn integer_coordinates_parse_as_floats() -> anyhow::Result<()> {
    let points = parse_locations(&trip("x", Some(1), Some("[[1,2],[-3,4]]")))?;
    assert_eq!(points, vec![[1.0, 2.0], [-3.0, 4.0]]);
    Ok(())
}

#[test]
fn explode_numbers_points_from_zero() {
    let t = trip("x", Some(1000), Some("ignored"));
    let out = explode(&t, &[[1.0, 1.0], [2.0, 2.0]]);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].trip_instance_id, 0);
    assert_eq!(out[1].trip_instance_id, 1);
    assert_eq!(out[1].trip_start_time, Some(1000));

    let out = explode(&t, &[]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].trip_instance_location, None);
}

#[test]
fn empty_chunk_transforms_to_nothing() -> anyhow::Result<()> {
    assert!(transform_chunk(Vec::new())?.is_empty());
    Ok(())
}
