use image::{Rgba, RgbaImage};
use page_stitch_core::error::StitchError;
use page_stitch_core::join::{BACKGROUND, join_pair, joined_dimensions};
use page_stitch_core::model::Axis;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

#[test]
fn test_dimension_law_horizontal() {
    let a = RgbaImage::new(30, 20);
    let b = RgbaImage::new(50, 40);
    let out = join_pair(&a, &b, Axis::Horizontal).unwrap();
    assert_eq!(out.dimensions(), (80, 40));
    assert_eq!(joined_dimensions((30, 20), (50, 40), Axis::Horizontal), (80, 40));
}

#[test]
fn test_dimension_law_vertical() {
    let a = RgbaImage::new(30, 20);
    let b = RgbaImage::new(50, 40);
    let out = join_pair(&a, &b, Axis::Vertical).unwrap();
    assert_eq!(out.dimensions(), (50, 60));
    assert_eq!(joined_dimensions((30, 20), (50, 40), Axis::Vertical), (50, 60));
}

#[test]
fn test_placement_and_padding_horizontal() {
    let a = RgbaImage::from_pixel(2, 2, RED);
    let b = RgbaImage::from_pixel(2, 4, BLUE);
    let out = join_pair(&a, &b, Axis::Horizontal).unwrap();
    assert_eq!(out.dimensions(), (4, 4));
    // Top-aligned: a occupies the top-left 2x2, b the full right half.
    assert_eq!(*out.get_pixel(0, 0), RED);
    assert_eq!(*out.get_pixel(1, 1), RED);
    assert_eq!(*out.get_pixel(2, 0), BLUE);
    assert_eq!(*out.get_pixel(3, 3), BLUE);
    // Area below a is canvas padding, not stretched pixels.
    assert_eq!(*out.get_pixel(0, 2), BACKGROUND);
    assert_eq!(*out.get_pixel(1, 3), BACKGROUND);
}

#[test]
fn test_placement_and_padding_vertical() {
    let a = RgbaImage::from_pixel(2, 2, RED);
    let b = RgbaImage::from_pixel(4, 2, BLUE);
    let out = join_pair(&a, &b, Axis::Vertical).unwrap();
    assert_eq!(out.dimensions(), (4, 4));
    // Left-aligned: a top-left, b across the bottom.
    assert_eq!(*out.get_pixel(0, 0), RED);
    assert_eq!(*out.get_pixel(1, 1), RED);
    assert_eq!(*out.get_pixel(0, 2), BLUE);
    assert_eq!(*out.get_pixel(3, 3), BLUE);
    // Right of a is padding.
    assert_eq!(*out.get_pixel(2, 0), BACKGROUND);
    assert_eq!(*out.get_pixel(3, 1), BACKGROUND);
}

#[test]
fn test_inputs_never_resampled() {
    // A non-uniform image must survive the join byte for byte.
    let a = RgbaImage::from_fn(3, 5, |x, y| Rgba([x as u8 * 40, y as u8 * 30, 7, 255]));
    let b = RgbaImage::from_pixel(4, 9, BLUE);
    let out = join_pair(&a, &b, Axis::Horizontal).unwrap();
    for (x, y, px) in a.enumerate_pixels() {
        assert_eq!(out.get_pixel(x, y), px);
    }
}

#[test]
fn test_zero_dimension_input_rejected() {
    let a = RgbaImage::new(0, 10);
    let b = RgbaImage::new(5, 5);
    match join_pair(&a, &b, Axis::Horizontal) {
        Err(StitchError::InvalidInput(msg)) => assert!(msg.contains("zero")),
        other => panic!("expected InvalidInput, got {:?}", other.map(|i| i.dimensions())),
    }
}

#[test]
fn test_mismatched_dimensions_are_not_an_error() {
    let a = RgbaImage::new(1, 100);
    let b = RgbaImage::new(100, 1);
    assert!(join_pair(&a, &b, Axis::Horizontal).is_ok());
    assert!(join_pair(&a, &b, Axis::Vertical).is_ok());
}
