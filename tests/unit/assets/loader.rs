use std::io::Cursor;

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("loader_tests").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, w: u32, h: u32) {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(path, buf).unwrap();
}

#[test]
fn resolve_classifies_uris() {
    let loader = AssetLoader::new("/srv/assets").unwrap();
    assert_eq!(
        loader.resolve("https://example.com/frame.png"),
        AssetSource::Remote("https://example.com/frame.png".to_string())
    );
    assert_eq!(
        loader.resolve("frames/a.png"),
        AssetSource::File(PathBuf::from("/srv/assets/frames/a.png"))
    );
    assert_eq!(
        loader.resolve("file:///tmp/a.png"),
        AssetSource::File(PathBuf::from("/tmp/a.png"))
    );
}

#[tokio::test]
async fn loads_raster_and_svg_frames_from_disk() {
    let dir = scratch_dir("frames");
    write_png(&dir.join("frame.png"), 3, 5);
    std::fs::write(
        dir.join("frame.svg"),
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="red"/></svg>"#,
    )
    .unwrap();

    let loader = AssetLoader::new(&dir).unwrap();
    let size = Resolution::new(32).unwrap();

    let png = loader.load_frame("frame.png", size).await.unwrap();
    assert_eq!((png.width, png.height), (3, 5));

    let svg = loader.load_frame("frame.svg", size).await.unwrap();
    assert_eq!((svg.width, svg.height), (32, 32));
}

#[tokio::test]
async fn missing_or_corrupt_files_are_load_errors() {
    let dir = scratch_dir("broken");
    std::fs::write(dir.join("corrupt.png"), b"nope").unwrap();
    let loader = AssetLoader::new(&dir).unwrap();

    assert!(matches!(
        loader.load_photo("missing.png").await,
        Err(FrameError::Load(_))
    ));
    assert!(matches!(
        loader.load_photo("corrupt.png").await,
        Err(FrameError::Load(_))
    ));
}
