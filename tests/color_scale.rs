use choropleth_rs::color::{ColorError, ColorScale, ColorScaleSpec, Rgb, ValueDomain};

fn spec(n: usize, divergent: bool) -> ColorScaleSpec {
    ColorScaleSpec {
        min_color: Rgb::new(255, 255, 0),
        max_color: Rgb::new(255, 0, 0),
        mid_color: divergent.then_some(Rgb::new(0, 0, 255)),
        bucket_count: n,
        divergent,
    }
}

#[test]
fn linear_scale_hits_both_endpoints() {
    for n in [3, 6, 17, 30] {
        let scale = spec(n, false).to_scale().unwrap();
        assert_eq!(scale.len(), n);
        assert_eq!(scale.get_color(0).unwrap(), Rgb::new(255, 255, 0));
        assert_eq!(scale.get_color(n - 1).unwrap(), Rgb::new(255, 0, 0));
    }
}

#[test]
fn yellow_to_red_in_five_steps() {
    let scale = spec(5, false).to_scale().unwrap();
    let hex: Vec<String> = scale.colors().iter().map(|c| c.to_hex()).collect();
    assert_eq!(hex, vec!["#FFFF00", "#FFBF00", "#FF8000", "#FF4000", "#FF0000"]);
}

#[test]
fn divergent_odd_scale_centers_on_mid_color() {
    let scale = spec(7, true).to_scale().unwrap();
    assert_eq!(scale.get_color(0).unwrap(), Rgb::new(255, 255, 0));
    assert_eq!(scale.get_color(3).unwrap(), Rgb::new(0, 0, 255));
    assert_eq!(scale.get_color(6).unwrap(), Rgb::new(255, 0, 0));
}

#[test]
fn divergent_without_mid_color_fails() {
    let mut s = spec(5, true);
    s.mid_color = None;
    assert_eq!(s.to_scale().unwrap_err(), ColorError::MissingMidColor);
}

#[test]
fn bucket_count_outside_bounds_is_rejected() {
    assert_eq!(spec(2, false).to_scale().unwrap_err(), ColorError::InvalidRange(2));
    assert_eq!(spec(31, false).to_scale().unwrap_err(), ColorError::InvalidRange(31));
}

#[test]
fn get_color_before_generation_fails() {
    let scale = ColorScale::default();
    assert_eq!(scale.get_color(0).unwrap_err(), ColorError::NotGenerated);
    let generated = spec(4, false).to_scale().unwrap();
    assert!(matches!(
        generated.get_color(4),
        Err(ColorError::IndexOutOfRange { index: 4, len: 4 })
    ));
}

#[test]
fn buckets_are_monotonic_and_in_range() {
    let domain = ValueDomain::from_range(-50.0, 250.0, false);
    let n = 6;
    let mut last = 0;
    for i in -10..=30 {
        let v = i as f64 * 10.0;
        let b = domain.bucket(v, n);
        assert!(b < n, "bucket {b} out of range for {v}");
        assert!(b >= last, "bucket decreased at {v}");
        last = b;
    }
    assert_eq!(domain.bucket(-50.0, n), 0);
    assert_eq!(domain.bucket(250.0, n), n - 1);
}

#[test]
fn non_negative_data_starts_at_zero() {
    let d = ValueDomain::from_range(12.0, 40.0, false);
    assert_eq!(d.floor, 0.0);
    let d = ValueDomain::from_range(-3.0, 40.0, false);
    assert_eq!(d.floor, -3.0);
    let d = ValueDomain::from_range(-3.0, 40.0, true);
    assert_eq!(d.floor, 0.0);
}

#[test]
fn pivot_moves_mid_value_to_scale_middle() {
    let d = ValueDomain::from_range(0.0, 100.0, false).with_pivot(Some(10.0));
    assert!((d.normalize(10.0) - 0.5).abs() < 1e-12);
    assert!(d.normalize(5.0) < d.normalize(10.0));
    assert!(d.normalize(55.0) < d.normalize(100.0));
    // Pivots outside the open domain are ignored.
    let d = ValueDomain::from_range(0.0, 100.0, false).with_pivot(Some(100.0));
    assert_eq!(d.pivot, None);
}

#[test]
fn degenerate_domain_does_not_divide_by_zero() {
    let d = ValueDomain {
        floor: 5.0,
        ceiling: 5.0,
        pivot: None,
    };
    assert_eq!(d.bucket(5.0, 6), 5);
    assert_eq!(d.bucket(4.0, 6), 0);
}
