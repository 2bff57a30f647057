use super::*;

#[test]
fn presets_pass_validation() {
    assert_eq!(Gradient::new(AUTUMN_SILK).unwrap(), autumn_silk());
    assert_eq!(Gradient::new(TWILIGHT).unwrap(), twilight());
    assert_eq!(autumn_silk().rgb_at(0.0), Rgb8::new(0xFF, 0xF8, 0xDC));
}
