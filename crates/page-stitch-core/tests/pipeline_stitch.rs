use image::{DynamicImage, Rgba, RgbaImage};
use page_stitch_core::prelude::*;
use std::fs;
use std::path::PathBuf;

fn page(key: &str, w: u32, h: u32, shade: u8) -> PageImage {
    let img = RgbaImage::from_pixel(w, h, Rgba([shade, shade, shade, 255]));
    PageImage {
        key: key.to_string(),
        image: DynamicImage::ImageRgba8(img),
    }
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("page_stitch_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_four_landscapes_end_to_end() {
    let inputs = vec![
        page("1.png", 800, 600, 10),
        page("2.png", 800, 600, 20),
        page("3.png", 800, 600, 30),
        page("4.png", 800, 600, 40),
    ];
    let spec = OptimizationSpec::builder().downscale(0.5).build();
    let out = stitch(inputs, &spec).unwrap();
    // Two 800x1200 strips joined horizontally, then halved.
    assert_eq!(out.image.dimensions(), (800, 600));
    assert_eq!(out.stats.width, 800);
    assert_eq!(out.stats.height, 600);
    assert_eq!(out.provenance, vec!["1.png", "2.png", "3.png", "4.png"]);
    assert_eq!(out.format, OutputFormat::Png);
    assert_eq!(out.stats.encoded_bytes as usize, out.encoded.len());
}

#[test]
fn test_two_image_stitch_picks_squarer_axis() {
    let inputs = vec![page("a", 600, 800, 50), page("b", 900, 700, 60)];
    let out = stitch(inputs, &OptimizationSpec::default()).unwrap();
    // Vertical join: 900 x 1500.
    assert_eq!(out.image.dimensions(), (900, 1500));
    assert_eq!(out.provenance, vec!["a", "b"]);
}

#[test]
fn test_grid_provenance_matches_input_order() {
    // Four squares force the 2x2 grid; spatial reading order (left-to-right,
    // top-to-bottom) must reproduce the input order.
    let inputs = vec![
        page("p0", 100, 100, 0),
        page("p1", 100, 100, 1),
        page("p2", 100, 100, 2),
        page("p3", 100, 100, 3),
    ];
    let out = stitch(inputs, &OptimizationSpec::default()).unwrap();
    assert_eq!(out.image.dimensions(), (200, 200));
    assert_eq!(out.provenance, vec!["p0", "p1", "p2", "p3"]);
    // Spot-check the composed quadrants.
    assert_eq!(out.image.get_pixel(0, 0)[0], 0);
    assert_eq!(out.image.get_pixel(150, 50)[0], 1);
    assert_eq!(out.image.get_pixel(50, 150)[0], 2);
    assert_eq!(out.image.get_pixel(150, 150)[0], 3);
}

#[test]
fn test_wrong_arity_rejected_before_any_work() {
    let inputs = vec![page("a", 10, 10, 0), page("b", 10, 10, 0), page("c", 10, 10, 0)];
    match stitch_exact(inputs, 4, &OptimizationSpec::default()) {
        Err(StitchError::WrongImageCount { expected, actual }) => {
            assert_eq!(expected, 4);
            assert_eq!(actual, 3);
        }
        other => panic!("expected WrongImageCount, got ok={}", other.is_ok()),
    }
}

#[test]
fn test_empty_input_rejected() {
    match stitch(Vec::new(), &OptimizationSpec::default()) {
        Err(StitchError::Empty) => {}
        other => panic!("expected Empty, got ok={}", other.is_ok()),
    }
}

#[test]
fn test_invalid_spec_rejected_before_joins() {
    let inputs = vec![page("a", 10, 10, 0), page("b", 10, 10, 0)];
    let spec = OptimizationSpec::builder().downscale(2.0).build();
    match stitch(inputs, &spec) {
        Err(StitchError::InvalidDownscale(f)) => assert_eq!(f, 2.0),
        other => panic!("expected InvalidDownscale, got ok={}", other.is_ok()),
    }
}

#[test]
fn test_stitch_to_path_is_atomic() {
    let dir = temp_dir("atomic");
    let out_path = dir.join("composite.png");
    let inputs = vec![page("a", 60, 40, 80), page("b", 60, 40, 90)];
    stitch_to_path(inputs, &OptimizationSpec::default(), &out_path).unwrap();
    assert!(out_path.exists());
    assert!(!out_path.with_extension("part").exists());
    let decoded = image::open(&out_path).unwrap();
    // Two landscapes stack vertically: 60x80 beats 120x40.
    assert_eq!((decoded.width(), decoded.height()), (60, 80));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_batch_isolates_failing_sets() {
    let dir = temp_dir("batch");
    let good_out = dir.join("good.png");
    let bad_out = dir.join("bad.png");
    let jobs = vec![
        StitchJob {
            inputs: vec![page("a", 50, 50, 10), page("b", 50, 50, 20)],
            out_path: good_out.clone(),
        },
        StitchJob {
            // Zero-dimension input makes this set fail validation.
            inputs: vec![page("broken", 0, 10, 0), page("c", 50, 50, 30)],
            out_path: bad_out.clone(),
        },
    ];
    let outcomes = stitch_batch(jobs, &OptimizationSpec::default());
    assert_eq!(outcomes.len(), 2);
    let good = outcomes.iter().find(|o| o.out_path == good_out).unwrap();
    let bad = outcomes.iter().find(|o| o.out_path == bad_out).unwrap();
    assert!(good.result.is_ok(), "good set must not be poisoned");
    assert!(bad.result.is_err());
    assert!(good_out.exists());
    assert!(!bad_out.exists());
    let _ = fs::remove_dir_all(&dir);
}
