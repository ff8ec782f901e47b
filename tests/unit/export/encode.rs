use super::*;
use crate::foundation::core::{Resolution, Rgba8Premul};

#[test]
fn encode_rejects_short_buffers() {
    assert!(matches!(
        encode_png(2, 2, vec![0; 3]),
        Err(FrameError::Encode(_))
    ));
}

#[test]
fn encode_png_is_lossless() {
    let px = vec![10, 20, 30, 255, 200, 100, 0, 128];
    let bytes = encode_png(2, 1, px.clone()).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.into_raw(), px);
}

#[tokio::test]
async fn export_matches_surface_resolution_and_unpremultiplies() {
    let mut s = Surface::new(Resolution::new(24).unwrap()).unwrap();
    s.clear(Rgba8Premul::from_straight_rgba(255, 0, 0, 128));

    let fut = export_png(&s);
    s.clear(Rgba8Premul::white());
    let bytes = fut.await.unwrap();

    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (24, 24));
    assert_eq!(decoded.get_pixel(5, 5).0, [255, 0, 0, 128]);
}
