use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use qr_scan::models::Rotation;
use qr_scan::providers::{
    DirectoryFrames, ImageReencoder, PathPicker, QrCodeRenderer, QrDecoder,
    ScriptedCameraPermission,
};
use qr_scan::shell::{CameraView, EntryView, PickOutcome, Route};
use qr_scan::tools::{
    ReadingRate, batch_decode, bench_limit_from_env, dataset_iter, dataset_root_from_env,
};
use qr_scan::{Capabilities, Capability, PermissionStatus, ScanConfig, ScanError, ScannerApp};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qrscan", version, about = "Scan and render QR codes")]
struct Cli {
    /// TOML config file (falls back to QRSCAN_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a still image the way the upload flow does
    Decode {
        image: PathBuf,
        /// Clockwise rotation applied before decoding
        #[arg(long, value_parser = parse_rotation)]
        rotate: Option<Rotation>,
        /// Re-render the payload as a QR symbol on the terminal
        #[arg(long)]
        show: bool,
    },
    /// Scan a directory of frames the way the live camera does
    Watch {
        frames: PathBuf,
        /// Answer the camera prompt with "deny"
        #[arg(long)]
        deny_camera: bool,
        /// Stop after this many detections
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Render text as a QR symbol
    Render {
        text: String,
        /// Write a PNG instead of printing to the terminal
        #[arg(long)]
        out: Option<PathBuf>,
        /// Target side in pixels (defaults to the config's render_size)
        #[arg(long)]
        size: Option<u32>,
    },
    /// Decode a dataset in parallel and report the reading rate
    Batch {
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn parse_rotation(value: &str) -> Result<Rotation, String> {
    value
        .parse::<u16>()
        .ok()
        .and_then(Rotation::from_degrees)
        .ok_or_else(|| format!("expected 0, 90, 180 or 270, got {value}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ScanConfig::resolve(cli.config.as_deref()).context("loading config")?;
    init_tracing(&config);

    match cli.command {
        Command::Decode {
            image,
            rotate,
            show,
        } => decode_cmd(config, &image, rotate, show).await,
        Command::Watch {
            frames,
            deny_camera,
            count,
        } => watch_cmd(config, &frames, deny_camera, count).await,
        Command::Render { text, out, size } => render_cmd(config, text, out.as_deref(), size),
        Command::Batch { root, limit } => batch_cmd(root, limit),
    }
}

fn init_tracing(config: &ScanConfig) {
    let filter = EnvFilter::try_from_env("QRSCAN_LOG")
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn capabilities(
    picker: PathPicker,
    camera: ScriptedCameraPermission,
    decoder: QrDecoder,
    config: &ScanConfig,
) -> Capabilities {
    Capabilities {
        decoder: Arc::new(decoder),
        picker: Arc::new(picker),
        normalizer: Arc::new(ImageReencoder::new()),
        camera: Arc::new(camera),
        renderer: Arc::new(QrCodeRenderer::with_quiet_zone(config.quiet_zone)),
    }
}

async fn decode_cmd(
    mut config: ScanConfig,
    image: &Path,
    rotate: Option<Rotation>,
    show: bool,
) -> Result<()> {
    if let Some(rotation) = rotate {
        config.normalize.rotation = rotation;
    }
    let caps = capabilities(
        PathPicker::new(image),
        ScriptedCameraPermission::denied(),
        QrDecoder::new(),
        &config,
    );
    let mut app = ScannerApp::new(caps, config);
    let mut entry = app.entry_screen();

    let start = Instant::now();
    let outcome = entry.pick_image().await;
    debug!(?outcome, elapsed = ?start.elapsed(), "pick finished");

    match (outcome, entry.view()) {
        (PickOutcome::Scanned, EntryView::Result { payload }) => {
            println!("{payload}");
            if show && entry.show_as_qr(app.navigator_mut()) {
                print_detected(&app)?;
            }
            Ok(())
        }
        (_, EntryView::Notice(notice)) => bail!("{}: {}", image.display(), notice.message()),
        (outcome, view) => bail!("unexpected scan outcome {outcome:?} ({view:?})"),
    }
}

async fn watch_cmd(
    config: ScanConfig,
    frames: &Path,
    deny_camera: bool,
    count: usize,
) -> Result<()> {
    let source = DirectoryFrames::open(frames)
        .with_context(|| format!("opening frames in {}", frames.display()))?;
    info!(frames = source.remaining(), dir = %frames.display(), "camera ready");

    let answer = if deny_camera {
        PermissionStatus::Denied
    } else {
        PermissionStatus::Granted
    };
    let caps = capabilities(
        PathPicker::cancelled(),
        ScriptedCameraPermission::undetermined(answer),
        QrDecoder::with_camera(source, config.frame_interval()),
        &config,
    );
    let mut app = ScannerApp::new(caps, config);
    let entry = app.entry_screen();
    entry.start_live_scan(app.navigator_mut());

    let mut camera = app.live_camera_screen();
    if let CameraView::PermissionRequired { .. } = camera.open() {
        if let CameraView::PermissionRequired { notice: Some(notice) } =
            camera.grant_permission().await
        {
            camera.leave(app.navigator_mut());
            info!(notice = notice.message(), "camera unavailable");
            return Err(ScanError::PermissionDenied(Capability::Camera).into());
        }
    }

    let mut detections = 0usize;
    while detections < count {
        match camera.view() {
            CameraView::Detected {
                symbol_type,
                payload,
            } => {
                detections += 1;
                println!("{symbol_type}\t{payload}");
                if detections < count {
                    camera.scan_again();
                }
            }
            CameraView::Notice(notice) => {
                camera.leave(app.navigator_mut());
                bail!("{}", notice.message());
            }
            _ if camera.stream_finished() => break,
            _ => tokio::time::sleep(Duration::from_millis(10)).await,
        }
    }

    camera.leave(app.navigator_mut());
    debug!(route = ?app.navigator().current(), "left camera screen");
    if detections == 0 {
        bail!("no QR code found in {}", frames.display());
    }
    Ok(())
}

fn render_cmd(
    mut config: ScanConfig,
    text: String,
    out: Option<&Path>,
    size: Option<u32>,
) -> Result<()> {
    if let Some(size) = size {
        config.render_size = size;
    }
    let caps = capabilities(
        PathPicker::cancelled(),
        ScriptedCameraPermission::denied(),
        QrDecoder::new(),
        &config,
    );
    let mut app = ScannerApp::new(caps, config);
    app.navigator_mut().navigate(Route::Detected { qr_data: text });

    match out {
        Some(path) => {
            let screen = app
                .detected_screen()?
                .context("result screen is not showing")?;
            let png = screen.view().symbol.to_png()?;
            std::fs::write(path, png).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote QR symbol");
            Ok(())
        }
        None => print_detected(&app),
    }
}

fn print_detected(app: &ScannerApp) -> Result<()> {
    let screen = app
        .detected_screen()?
        .context("result screen is not showing")?;
    let view = screen.view();
    println!("{}", view.title);
    print!("{}", view.symbol.to_text());
    println!("{}", view.text);
    Ok(())
}

fn batch_cmd(root: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let root = root.unwrap_or_else(dataset_root_from_env);
    let limit = limit.or_else(bench_limit_from_env);
    let images: Vec<PathBuf> = dataset_iter(&root, limit).collect();
    if images.is_empty() {
        bail!("no images found in {}", root.display());
    }

    let start = Instant::now();
    let entries = batch_decode(&images);
    let wall = start.elapsed();

    for entry in &entries {
        println!(
            "{}\t{}\t{:.1}ms",
            if entry.is_hit() { "hit" } else { "miss" },
            entry.path.display(),
            entry.elapsed.as_secs_f64() * 1000.0
        );
    }

    let rate = ReadingRate::from_entries(&entries);
    println!(
        "Reading rate: {}/{} = {:.2}% in {:.2}s",
        rate.hits,
        rate.total,
        rate.percent(),
        wall.as_secs_f64()
    );
    Ok(())
}
