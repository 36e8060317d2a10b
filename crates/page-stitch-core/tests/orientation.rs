use page_stitch_core::model::{Axis, Orientation};

#[test]
fn test_classify_basic() {
    assert_eq!(Orientation::of(800, 600), Orientation::Landscape);
    assert_eq!(Orientation::of(600, 800), Orientation::Portrait);
    assert_eq!(Orientation::of(1000, 1000), Orientation::Square);
}

#[test]
fn test_classify_tolerance_band() {
    // Ratio 1.05 is inside the band, 1.11 is outside.
    assert_eq!(Orientation::of(1050, 1000), Orientation::Square);
    assert_eq!(Orientation::of(1000, 1050), Orientation::Square);
    assert_eq!(Orientation::of(1110, 1000), Orientation::Landscape);
    assert_eq!(Orientation::of(1000, 1110), Orientation::Portrait);
}

#[test]
fn test_classify_scale_invariant() {
    let cases = [(800, 600), (600, 800), (1000, 1000), (1050, 1000), (13, 7)];
    for &(w, h) in &cases {
        let base = Orientation::of(w, h);
        for k in [2u32, 3, 10] {
            assert_eq!(
                Orientation::of(w * k, h * k),
                base,
                "classification changed under scaling {}x{} by {}",
                w,
                h,
                k
            );
        }
    }
}

#[test]
fn test_axis_from_str() {
    assert_eq!("horizontal".parse::<Axis>(), Ok(Axis::Horizontal));
    assert_eq!("h".parse::<Axis>(), Ok(Axis::Horizontal));
    assert_eq!("VERTICAL".parse::<Axis>(), Ok(Axis::Vertical));
    assert_eq!("vert".parse::<Axis>(), Ok(Axis::Vertical));
    assert!("diagonal".parse::<Axis>().is_err());
}
