use super::*;

#[test]
fn fnv_split_writes_hash_the_same() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"framecast");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"frame");
    b.write_bytes(b"cast");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn fnv_distinguishes_dimensions() {
    let mut a = Fnv1a64::new_default();
    a.write_u32(2);
    a.write_u32(8);
    let mut b = Fnv1a64::new_default();
    b.write_u32(8);
    b.write_u32(2);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn premul_then_unpremul_is_close() {
    let mut px = vec![200u8, 100, 50, 128, 7, 8, 9, 0, 1, 2, 3, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[1, 2, 3, 255]);
    unpremultiply_rgba8_in_place(&mut px);
    for (got, want) in px[0..3].iter().zip([200u8, 100, 50]) {
        assert!(got.abs_diff(want) <= 2, "{got} vs {want}");
    }
    assert_eq!(px[3], 128);
}
