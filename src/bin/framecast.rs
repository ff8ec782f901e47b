use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use framecast::{
    AssetLoader, DownloadForm, EditorConfig, EditorSession, FrameCatalog, Point,
    PointerEvent, SliderRange, TelemetryConfig, export_filename, now_ms,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "framecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the templates in a catalog.
    List(ListArgs),
    /// Place a photo under a template's frame and write the PNG.
    Compose(ComposeArgs),
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Catalog JSON (array of templates).
    #[arg(long)]
    catalog: PathBuf,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Catalog JSON (array of templates). Relative frame paths resolve against its directory.
    #[arg(long)]
    catalog: PathBuf,

    /// Template id.
    #[arg(long)]
    template: u32,

    /// Photo path or URL. Without one, only the frame is exported.
    #[arg(long)]
    photo: Option<String>,

    /// Uniform photo scale, clamped to 0.1..=3.0.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Photo rotation in degrees, clockwise, clamped to -180..=180.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate: f64,

    /// Drag in display pixels, `x0,y0:x1,y1`. Repeatable.
    #[arg(long = "drag", value_parser = parse_drag)]
    drags: Vec<(Point, Point)>,

    /// On-screen width the drags were made at. Defaults to the internal resolution.
    #[arg(long)]
    display_width: Option<f64>,

    /// Internal (and export) resolution; overrides FRAMECAST_RESOLUTION.
    #[arg(long)]
    resolution: Option<u32>,

    /// Name used in the filename and the download notification.
    #[arg(long, default_value = "guest")]
    name: String,

    /// Email for the download notification. Requires a photo.
    #[arg(long)]
    email: Option<String>,

    /// Download notification endpoint; overrides FRAMECAST_TELEMETRY_URL.
    #[arg(long)]
    telemetry_url: Option<String>,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

/// Clamp a value the way the matching slider control would.
fn slider_value(range: SliderRange, control: &str, v: f64) -> f64 {
    if !range.contains(v) {
        tracing::warn!(
            control,
            value = v,
            min = range.min,
            max = range.max,
            "clamping out-of-range value"
        );
    }
    range.clamp(v)
}

fn parse_drag(s: &str) -> Result<(Point, Point), String> {
    fn point(s: &str) -> Result<Point, String> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `x,y`, got '{s}'"))?;
        let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
        let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
        Ok(Point::new(x, y))
    }

    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `x0,y0:x1,y1`, got '{s}'"))?;
    Ok((point(from)?, point(to)?))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List(args) => cmd_list(args),
        Command::Compose(args) => cmd_compose(args).await,
    }
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let catalog = FrameCatalog::from_path(&args.catalog)?;
    for t in catalog.iter() {
        println!("{}\t{}\t{}", t.id, t.event_name, t.byline());
    }
    Ok(())
}

async fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let catalog = FrameCatalog::from_path(&args.catalog)?;
    let template = catalog
        .get(args.template)
        .cloned()
        .with_context(|| format!("template {} not in catalog", args.template))?;

    let mut cfg = EditorConfig::from_env()?;
    if let Some(r) = args.resolution {
        cfg.resolution = r;
    }
    if let Some(url) = &args.telemetry_url {
        cfg.telemetry = Some(TelemetryConfig::new(url.clone()));
    }
    cfg.display_width = args.display_width;

    let assets_root = args
        .catalog
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));
    let loader = AssetLoader::new(assets_root)?;
    let mut session = EditorSession::new(&cfg)?;

    let event_name = template.event_name.clone();
    session.open_template(&loader, template).await?;
    if let Some(photo) = &args.photo {
        session.upload_photo(&loader, photo).await?;
    }

    session.set_scale(slider_value(SliderRange::SCALE, "scale", args.scale));
    session.set_rotation(slider_value(SliderRange::ROTATION_DEG, "rotate", args.rotate));
    for (from, to) in &args.drags {
        session.pointer(PointerEvent::Down(*from));
        session.pointer(PointerEvent::Move(*to));
        session.pointer(PointerEvent::Up);
    }

    let (filename, png) = match &args.email {
        Some(email) => {
            let form = DownloadForm {
                user_name: args.name.clone(),
                user_email: email.clone(),
            };
            let d = session.download(&form).await?;
            (d.filename, d.png)
        }
        None => {
            let png = session.export().await?;
            (export_filename(&event_name, &args.name, now_ms()), png)
        }
    };

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out = args.out_dir.join(filename);
    std::fs::write(&out, png).with_context(|| format!("write png '{}'", out.display()))?;
    session.flush_telemetry().await;

    eprintln!("wrote {}", out.display());
    Ok(())
}
