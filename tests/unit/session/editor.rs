use std::time::Duration;

use super::*;
use crate::{
    foundation::core::{Point, Vec2},
    interaction::engine::PointerEvent,
    telemetry::client::TelemetryConfig,
};

const EDGE: u32 = 32;

fn session() -> EditorSession {
    EditorSession::new(&EditorConfig {
        resolution: EDGE,
        display_width: Some(16.0),
        ..EditorConfig::default()
    })
    .unwrap()
}

fn template(id: u32) -> FrameTemplate {
    FrameTemplate {
        id,
        event_name: "Tech Summit 2025!".to_string(),
        details: "Annual Developer Meetup".to_string(),
        event_by: "DevCommunity".to_string(),
        graphics_by: "John Doe".to_string(),
        social_link: "https://twitter.com".to_string(),
        frame_path: format!("frames/{id}.png"),
    }
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> PreparedImage {
    PreparedImage::from_premul_rgba8(w, h, rgba.repeat((w * h) as usize)).unwrap()
}

fn clear_frame() -> PreparedImage {
    solid(2, 2, [0, 0, 0, 0])
}

fn ready_session() -> EditorSession {
    let mut s = session();
    let t = s.select_template(template(1));
    assert_eq!(s.complete_frame_load(t, Ok(clear_frame())), LoadOutcome::Applied);
    s
}

fn form() -> DownloadForm {
    DownloadForm {
        user_name: "Jane O'Brien".to_string(),
        user_email: "jane@example.com".to_string(),
    }
}

#[test]
fn select_template_resets_and_waits_for_artwork() {
    let mut s = ready_session();
    let p = s.begin_photo_load();
    s.complete_photo_load(p, Ok(solid(4, 4, [255, 0, 0, 255])));
    s.set_scale(2.0);

    s.select_template(template(2));
    assert_eq!(s.template().unwrap().id, 2);
    assert_eq!(s.frame_load_state(), &LoadState::Loading);
    assert_eq!(s.photo_load_state(), &LoadState::Idle);
    assert!(s.state().user_image.is_none());
    assert!(s.state().frame_image.is_none());
    assert_eq!(s.state().scale, 1.0);
}

#[test]
fn stale_frame_completion_is_discarded() {
    let mut s = session();
    let first = s.select_template(template(1));
    let second = s.select_template(template(2));
    assert!(second.generation > first.generation);

    assert_eq!(
        s.complete_frame_load(first, Ok(clear_frame())),
        LoadOutcome::Stale
    );
    assert!(s.state().frame_image.is_none());
    assert_eq!(s.frame_load_state(), &LoadState::Loading);

    assert_eq!(
        s.complete_frame_load(second, Ok(clear_frame())),
        LoadOutcome::Applied
    );
    assert_eq!(s.frame_load_state(), &LoadState::Ready);

    // A ticket is consumed by its completion.
    assert_eq!(
        s.complete_frame_load(second, Ok(clear_frame())),
        LoadOutcome::Stale
    );
}

#[test]
fn photo_load_from_previous_template_is_discarded() {
    let mut s = ready_session();
    let p = s.begin_photo_load();
    let t = s.select_template(template(2));
    s.complete_frame_load(t, Ok(clear_frame()));

    assert_eq!(
        s.complete_photo_load(p, Ok(solid(4, 4, [255, 0, 0, 255]))),
        LoadOutcome::Stale
    );
    assert!(s.state().user_image.is_none());
}

#[test]
fn newer_photo_upload_wins() {
    let mut s = ready_session();
    let old = s.begin_photo_load();
    let new = s.begin_photo_load();
    let green = solid(4, 4, [0, 255, 0, 255]);
    s.complete_photo_load(new, Ok(green.clone()));
    assert_eq!(
        s.complete_photo_load(old, Ok(solid(4, 4, [255, 0, 0, 255]))),
        LoadOutcome::Stale
    );
    assert_eq!(s.state().user_image.as_ref().unwrap().id(), green.id());
}

#[test]
fn failed_loads_are_recorded_and_keep_previous_photo() {
    let mut s = session();
    let t = s.select_template(template(1));
    s.complete_frame_load(t, Err(FrameError::load("404")));
    assert!(matches!(s.frame_load_state(), LoadState::Failed { reason } if reason.contains("404")));

    let mut s = ready_session();
    let p = s.begin_photo_load();
    s.complete_photo_load(p, Ok(solid(4, 4, [255, 0, 0, 255])));
    let p = s.begin_photo_load();
    s.complete_photo_load(p, Err(FrameError::load("corrupt")));
    assert!(matches!(s.photo_load_state(), LoadState::Failed { .. }));
    assert!(s.state().has_user_image());
}

#[test]
fn nothing_is_rendered_before_artwork_loads() {
    let mut s = session();
    s.select_template(template(1));
    s.set_rotation(10.0);
    assert!(s.surface().data_premul().iter().all(|&b| b == 0));
}

#[test]
fn photo_upload_recenters_transform() {
    let mut s = ready_session();
    let p = s.begin_photo_load();
    s.complete_photo_load(p, Ok(solid(4, 4, [255, 0, 0, 255])));
    s.set_scale(1.5);
    s.pointer(PointerEvent::Down(Point::new(0.0, 0.0)));
    s.pointer(PointerEvent::Move(Point::new(1.0, 1.0)));
    assert_eq!(s.state().offset, Vec2::new(2.0, 2.0));

    let p = s.begin_photo_load();
    s.complete_photo_load(p, Ok(solid(6, 6, [0, 0, 255, 255])));
    assert_eq!(s.state().scale, 1.0);
    assert_eq!(s.state().offset, Vec2::ZERO);
    assert!(!s.state().drag.active);
}

#[test]
fn drag_rerenders_surface() {
    let mut s = ready_session();
    let p = s.begin_photo_load();
    s.complete_photo_load(p, Ok(solid(8, 8, [255, 0, 0, 255])));
    let before = s.surface().data_premul().to_vec();

    assert_eq!(
        s.pointer(PointerEvent::Move(Point::new(3.0, 3.0))),
        Outcome::Idle
    );
    assert_eq!(s.surface().data_premul(), before.as_slice());

    s.pointer(PointerEvent::Down(Point::new(0.0, 0.0)));
    assert_eq!(
        s.pointer(PointerEvent::Move(Point::new(4.0, 0.0))),
        Outcome::Redraw
    );
    assert_ne!(s.surface().data_premul(), before.as_slice());
}

#[test]
fn download_form_requires_all_fields() {
    let f = form();
    assert!(f.is_ready(true));
    assert!(!f.is_ready(false));
    let blank = DownloadForm {
        user_name: "   ".to_string(),
        ..form()
    };
    assert!(!blank.is_ready(true));
}

#[tokio::test]
async fn export_requires_frame_artwork() {
    let mut s = session();
    assert!(matches!(s.export().await, Err(FrameError::NotReady(_))));

    let t = s.select_template(template(1));
    assert!(matches!(s.export().await, Err(FrameError::NotReady(_))));
    s.complete_frame_load(t, Err(FrameError::load("boom")));
    assert!(matches!(s.export().await, Err(FrameError::NotReady(_))));
}

#[tokio::test]
async fn frame_only_export_is_full_resolution_on_white() {
    let mut s = ready_session();
    let png = s.export().await.unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (EDGE, EDGE));
    assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
}

#[tokio::test]
async fn download_names_file_and_gates_on_form() {
    let mut s = ready_session();
    assert!(matches!(
        s.download(&form()).await,
        Err(FrameError::Validation(_))
    ));

    s.upload_photo_bytes({
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    })
    .await
    .unwrap();

    let d = s.download(&form()).await.unwrap();
    assert!(d.filename.starts_with("Tech_Summit_2025__Jane_O_Brien_"));
    assert!(d.filename.ends_with(".png"));
    let img = image::load_from_memory(&d.png).unwrap();
    assert_eq!((img.width(), img.height()), (EDGE, EDGE));
}

#[tokio::test]
async fn corrupt_photo_bytes_surface_as_load_error() {
    let mut s = ready_session();
    assert!(matches!(
        s.upload_photo_bytes(b"not a png".to_vec()).await,
        Err(FrameError::Load(_))
    ));
    assert!(matches!(s.photo_load_state(), LoadState::Failed { .. }));
}

fn session_with_photo_and_telemetry(endpoint: String) -> EditorSession {
    let mut s = EditorSession::new(&EditorConfig {
        resolution: EDGE,
        telemetry: Some(TelemetryConfig {
            endpoint,
            timeout_ms: 30_000,
        }),
        ..EditorConfig::default()
    })
    .unwrap();
    let t = s.select_template(template(1));
    s.complete_frame_load(t, Ok(clear_frame()));
    let p = s.begin_photo_load();
    s.complete_photo_load(p, Ok(solid(4, 4, [255, 0, 0, 255])));
    s
}

#[tokio::test]
async fn unresponsive_telemetry_does_not_hold_up_download() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accepts connections and never answers.
    let _server = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((sock, _)) = listener.accept().await {
            held.push(sock);
        }
    });

    let mut s = session_with_photo_and_telemetry(format!("http://{addr}/log"));
    let d = tokio::time::timeout(Duration::from_secs(2), s.download(&form()))
        .await
        .expect("download waited on telemetry")
        .unwrap();
    assert!(d.filename.starts_with("Tech_Summit_2025__Jane_O_Brien_"));
    assert_eq!(image::load_from_memory(&d.png).unwrap().width(), EDGE);
}

#[tokio::test]
async fn refused_telemetry_does_not_fail_download() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut s = session_with_photo_and_telemetry(format!("http://{addr}/log"));
    let d = tokio::time::timeout(Duration::from_secs(2), s.download(&form()))
        .await
        .expect("download waited on telemetry")
        .unwrap();
    assert!(d.filename.ends_with(".png"));

    tokio::time::timeout(Duration::from_secs(5), s.flush_telemetry())
        .await
        .expect("refused notification should finish promptly");
}
