use super::*;

#[test]
fn delays_scale_with_index() {
    let s = Stagger::new(0.3);
    let d = s.delays(4);
    let expected = [0.0, 0.3, 0.6, 0.9];
    for (got, want) in d.iter().zip(expected) {
        assert!((got - want).abs() < 1e-12);
    }
    assert!((s.span(4) - 0.9).abs() < 1e-12);
}

#[test]
fn from_end_and_center_reorder_ranks() {
    let end = Stagger::new(1.0).from(StaggerFrom::End);
    assert_eq!(end.delays(3), vec![2.0, 1.0, 0.0]);

    let center = Stagger::new(1.0).from(StaggerFrom::Center);
    assert_eq!(center.delays(5), vec![2.0, 1.0, 0.0, 1.0, 2.0]);
    assert_eq!(center.span(5), 2.0);
}

#[test]
fn empty_and_single_groups_have_no_delay() {
    let s = Stagger::new(0.5);
    assert!(s.delays(0).is_empty());
    assert_eq!(s.delays(1), vec![0.0]);
    assert_eq!(s.span(0), 0.0);
}

#[test]
fn negative_or_non_finite_stagger_is_rejected() {
    assert!(Stagger::new(-0.1).validate().unwrap_err().is_configuration());
    assert!(Stagger::new(f64::NAN).validate().is_err());
    assert!(Stagger::new(0.0).validate().is_ok());
}

#[test]
fn local_progress_windows_each_target() {
    // Target 2 of a 0.3-stagger group with 0.5 duration runs over [0.6, 1.1].
    assert_eq!(local_progress(0.5, 0.6, 0.5), 0.0);
    assert!((local_progress(0.85, 0.6, 0.5) - 0.5).abs() < 1e-12);
    assert_eq!(local_progress(1.2, 0.6, 0.5), 1.0);
    assert_eq!(local_progress(0.6, 0.6, 0.0), 1.0);
    assert_eq!(local_progress(0.59, 0.6, 0.0), 0.0);
}
