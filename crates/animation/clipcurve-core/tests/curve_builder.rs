use approx::assert_relative_eq;
use clipcurve_core::{build_curve, ChannelKeys, ClipError, Curve, Interpolant, Slope, TangentMode};

/// Keyframes with flat tangents, unweighted, every key a breakpoint.
fn flat_keys(points: &[(f64, f64)]) -> ChannelKeys {
    let mut keys = ChannelKeys::default();
    for &(t, v) in points {
        keys.push(t, v, 0.0.into(), 0.0.into(), 1.0 / 3.0, 1.0 / 3.0, TangentMode(0), 0);
    }
    keys
}

fn curve(keys: &ChannelKeys) -> Curve {
    build_curve(keys).expect("curve builds").0
}

#[test]
fn hermite_curve_hits_keyframes_exactly() {
    let c = curve(&flat_keys(&[(0.0, 0.0), (1.0, 10.0), (2.0, 0.0)]));
    assert_eq!(c.evaluate(0.0), 0.0);
    assert_eq!(c.evaluate(1.0), 10.0);
    assert_eq!(c.evaluate(2.0), 0.0);
    // Flat tangents: the midpoint of a segment is the average of its ends.
    assert_relative_eq!(c.evaluate(1.5), 5.0, epsilon = 1e-12);
    assert_relative_eq!(c.evaluate(0.5), 5.0, epsilon = 1e-12);
}

#[test]
fn segments_are_contiguous_and_cover_the_keyframes() {
    let mut keys = flat_keys(&[(0.0, 1.0), (0.5, 2.0), (1.25, 0.0), (2.0, 4.0), (3.0, 4.0)]);
    keys.tangent_mode = vec![
        TangentMode(0),
        TangentMode::LINKED,
        TangentMode(2),
        TangentMode::LINKED,
        TangentMode::LINKED,
    ];
    let (c, max_time) = build_curve(&keys).unwrap();
    assert_eq!(max_time, Some(3.0));
    assert_eq!(c.segments().len(), 4);
    assert_eq!(c.span(), Some((0.0, 3.0)));
    for pair in c.segments().windows(2) {
        assert_eq!(pair[0].end, pair[1].start);
    }
}

#[test]
fn evaluation_outside_the_domain_clamps() {
    let c = curve(&flat_keys(&[(1.0, 3.0), (2.0, 7.0)]));
    assert_eq!(c.evaluate(-5.0), 3.0);
    assert_eq!(c.evaluate(0.999), 3.0);
    assert_eq!(c.evaluate(2.5), 7.0);
}

#[test]
fn linear_tangents_reproduce_a_line() {
    let mut keys = ChannelKeys::default();
    for (t, v) in [(0.0, 0.0), (1.2, 45.0), (2.4, 90.0)] {
        keys.push(t, v, 37.5.into(), 37.5.into(), 0.5, 0.5, TangentMode::LINKED, 0);
    }
    let c = curve(&keys);
    for t in [0.3, 0.6, 1.5, 2.1] {
        assert_relative_eq!(c.evaluate(t), 37.5 * t, epsilon = 1e-9);
    }
}

#[test]
fn infinite_out_slope_holds_the_left_value() {
    let mut keys = flat_keys(&[(0.0, 2.0), (1.0, 8.0), (2.0, 4.0)]);
    keys.out_slope[0] = Slope::Token("Infinity".into());
    let c = curve(&keys);

    assert_eq!(
        c.segments()[0].interpolant,
        Interpolant::Constant { value: 2.0 }
    );
    assert_eq!(c.evaluate(0.0), 2.0);
    assert_eq!(c.evaluate(0.75), 2.0);
    // The next segment is a regular Hermite and still reaches its right key.
    assert!(matches!(c.segments()[1].interpolant, Interpolant::Hermite { .. }));
    assert_eq!(c.evaluate(2.0), 4.0);
}

#[test]
fn negative_infinite_in_slope_also_holds_the_left_value() {
    let mut keys = flat_keys(&[(0.0, 2.0), (1.0, 8.0)]);
    keys.in_slope[1] = Slope::Token("-Infinity".into());
    let c = curve(&keys);
    assert_eq!(
        c.segments()[0].interpolant,
        Interpolant::Constant { value: 2.0 }
    );
    assert_eq!(c.evaluate(0.5), 2.0);
}

#[test]
fn positive_infinite_in_slope_holds_the_left_value() {
    let mut keys = flat_keys(&[(0.0, 2.0), (1.0, 8.0)]);
    keys.in_slope[1] = Slope::Token("Infinity".into());
    let c = curve(&keys);
    assert_eq!(
        c.segments()[0].interpolant,
        Interpolant::Constant { value: 2.0 }
    );
    assert_eq!(c.evaluate(0.5), 2.0);
}

#[test]
fn negative_infinite_out_slope_holds_the_left_value() {
    let mut keys = flat_keys(&[(0.0, 2.0), (1.0, 8.0)]);
    keys.out_slope[0] = Slope::Token("-Infinity".into());
    let c = curve(&keys);
    assert_eq!(
        c.segments()[0].interpolant,
        Interpolant::Constant { value: 2.0 }
    );
    assert_eq!(c.evaluate(0.5), 2.0);
}

#[test]
fn nan_slope_holds_the_left_value() {
    let mut keys = flat_keys(&[(0.0, 2.0), (1.0, 8.0), (2.0, 4.0)]);
    keys.out_slope[1] = Slope::Token("NaN".into());
    let c = curve(&keys);
    assert_eq!(
        c.segments()[1].interpolant,
        Interpolant::Constant { value: 8.0 }
    );
    assert_eq!(c.evaluate(1.5), 8.0);
    assert!(matches!(c.segments()[0].interpolant, Interpolant::Hermite { .. }));
}

#[test]
fn step_lands_on_the_new_key_at_its_time() {
    // Step in the first pair.
    let mut first = flat_keys(&[(0.0, 2.0), (1.0, 8.0), (2.0, 4.0)]);
    first.out_slope[0] = Slope::Token("Infinity".into());
    let c = curve(&first);
    assert_eq!(c.evaluate(0.999), 2.0);
    assert_eq!(c.evaluate(1.0), 8.0);

    // Step in a middle pair, with a different segment count.
    let mut middle = flat_keys(&[(0.0, 0.0), (1.0, 8.0), (2.0, 4.0), (3.0, 4.0)]);
    middle.out_slope[1] = Slope::Token("Infinity".into());
    let c = curve(&middle);
    assert_eq!(c.evaluate(1.5), 8.0);
    assert_eq!(c.evaluate(2.0), 4.0);

    // Step in the last pair holds through the final key.
    let mut last = flat_keys(&[(0.0, 0.0), (1.0, 8.0), (2.0, 4.0)]);
    last.out_slope[1] = Slope::Token("Infinity".into());
    let c = curve(&last);
    assert_eq!(c.evaluate(2.0), 8.0);
}

#[test]
fn shared_boundaries_resolve_to_the_later_segment() {
    let c = curve(&flat_keys(&[(0.0, 0.0), (1.0, 5.0), (1.0, 6.0), (2.0, 6.0)]));
    // Duplicate time: the latest key at that time wins.
    assert_eq!(c.evaluate(1.0), 6.0);
}

#[test]
fn weighted_mode_scales_hermite_slopes() {
    let mut keys = ChannelKeys::default();
    keys.push(0.0, 0.0, 0.0.into(), 4.0.into(), 0.5, 0.25, TangentMode(0), 3);
    keys.push(1.0, 1.0, 6.0.into(), 0.0.into(), 0.5, 0.5, TangentMode(0), 1);
    let c = curve(&keys);
    match c.segments()[0].interpolant {
        Interpolant::Hermite { m0, m1, .. } => {
            assert_relative_eq!(m0, 1.0);
            assert_relative_eq!(m1, 3.0);
        }
        other => panic!("expected Hermite, got {other:?}"),
    }
}

#[test]
fn huge_slopes_are_clamped() {
    let mut keys = ChannelKeys::default();
    keys.push(0.0, 0.0, 0.0.into(), 1e12.into(), 1.0, 1.0, TangentMode(0), 0);
    keys.push(1.0, 1.0, (-1e12).into(), 0.0.into(), 1.0, 1.0, TangentMode(0), 0);
    let c = curve(&keys);
    match c.segments()[0].interpolant {
        Interpolant::Hermite { m0, m1, .. } => {
            assert_eq!(m0, clipcurve_core::SLOPE_LIMIT);
            assert_eq!(m1, -clipcurve_core::SLOPE_LIMIT);
        }
        other => panic!("expected Hermite, got {other:?}"),
    }
}

#[test]
fn duplicate_times_fall_back_to_linear() {
    let c = curve(&flat_keys(&[(0.0, 0.0), (1.0, 5.0), (1.0, 6.0), (2.0, 6.0)]));
    assert_eq!(c.segments().len(), 3);
    assert_eq!(
        c.segments()[1].interpolant,
        Interpolant::Linear { y0: 5.0, y1: 6.0 }
    );
    assert!(c.evaluate(1.5).is_finite());
    assert_eq!(c.evaluate(2.0), 6.0);
}

#[test]
fn inconsistent_arrays_are_rejected() {
    let mut keys = flat_keys(&[(0.0, 0.0), (1.0, 1.0)]);
    keys.out_weight.pop();
    let err = build_curve(&keys).unwrap_err();
    match err {
        ClipError::InconsistentKeyframes {
            field,
            expected,
            actual,
        } => {
            assert_eq!(field, "outWeight");
            assert_eq!(expected, 2);
            assert_eq!(actual, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unknown_slope_token_is_an_error() {
    let mut keys = flat_keys(&[(0.0, 0.0), (1.0, 1.0)]);
    keys.in_slope[1] = Slope::Token("steep".into());
    assert!(matches!(
        build_curve(&keys),
        Err(ClipError::InvalidSlope { .. })
    ));
}

#[test]
fn single_keyframe_reports_its_time_but_has_no_segments() {
    let (c, max_time) = build_curve(&flat_keys(&[(0.75, 9.0)])).unwrap();
    assert!(c.is_empty());
    assert_eq!(max_time, Some(0.75));
    assert_eq!(c.evaluate(0.75), 0.0);
}
