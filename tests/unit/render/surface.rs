use super::*;

#[test]
fn new_surface_is_square_and_transparent() {
    let s = Surface::new(Resolution::new(8).unwrap()).unwrap();
    assert_eq!(s.size().px(), 8);
    assert_eq!(s.data_premul().len(), 8 * 8 * 4);
    assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(8, 0), None);
}

#[test]
fn clear_and_straight_readback() {
    let mut s = Surface::new(Resolution::new(4).unwrap()).unwrap();
    s.clear(Rgba8Premul::from_straight_rgba(255, 0, 0, 128));
    assert_eq!(s.pixel(3, 3), Some([128, 0, 0, 128]));

    let straight = s.to_straight_rgba8();
    assert_eq!(&straight[0..4], &[255, 0, 0, 128]);
}
