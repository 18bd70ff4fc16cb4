mod live_view;

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use faceredact_core::blurring::infrastructure::box_blurrer::BoxBlurrer;
use faceredact_core::detection::infrastructure::model_resolver::{self, ModelSource};
use faceredact_core::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use faceredact_core::pipeline::frame_redaction::FrameRedaction;
use faceredact_core::pipeline::live_camera_use_case::LiveCameraUseCase;
use faceredact_core::pipeline::media_mode::{InputKind, MediaMode};
use faceredact_core::pipeline::pipeline_logger::LogPipelineLogger;
use faceredact_core::pipeline::redact_directory_use_case::RedactDirectoryUseCase;
use faceredact_core::pipeline::redact_image_use_case::RedactImageUseCase;
use faceredact_core::pipeline::redact_video_use_case::RedactVideoUseCase;
use faceredact_core::shared::blur_strength::BlurStrength;
use faceredact_core::shared::constants::BLAZEFACE_MODEL_NAME;
use faceredact_core::shared::error::RedactError;
use faceredact_core::shared::redact_config::RedactConfig;
use faceredact_core::video::infrastructure::ffmpeg_camera::FfmpegCamera;
use faceredact_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use faceredact_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use faceredact_core::video::infrastructure::image_file_reader::ImageFileReader;
use faceredact_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Blur faces in images, image directories, videos and live camera streams.
#[derive(Parser, Debug)]
#[command(name = "faceredact", version)]
struct Cli {
    /// What to process: image (file or directory), video or webcam.
    #[arg(long, default_value = "image")]
    mode: InputKind,

    /// Input image, image directory or video file.
    #[arg(long = "filePath", visible_alias = "file-path")]
    file_path: Option<PathBuf>,

    /// Directory that receives redacted files [default: ./output].
    #[arg(long = "output_dir", visible_alias = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Box blur kernel size in pixels [default: 40].
    #[arg(long = "blur_strength", visible_alias = "blur-strength", allow_negative_numbers = true)]
    blur_strength: Option<i64>,

    /// Face detection model (ONNX). Looked up in the cache when omitted.
    #[arg(long)]
    model: Option<PathBuf>,

    /// JSON settings file. Flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera device for webcam mode, e.g. /dev/video2.
    #[arg(long)]
    camera: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = merge_config(&cli)?;
    let strength = config.validate()?;
    let mode = MediaMode::resolve(cli.mode, cli.file_path.as_deref())?;

    if let Some(path) = mode.input_path() {
        if !path.exists() {
            return Err(RedactError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
    }

    let redaction = build_redaction(&config, strength)?;
    let output_dir = config.output_dir.as_path();

    match mode {
        MediaMode::SingleImage(input) => {
            let mut use_case = image_use_case(redaction);
            let output = use_case.execute(&input, output_dir)?;
            log::info!("Output written to {}", output.display());
        }
        MediaMode::ImageDirectory(dir) => {
            let mut use_case = RedactDirectoryUseCase::new(
                image_use_case(redaction),
                Box::new(LogPipelineLogger::new(config.progress_every).with_unit("images")),
            );
            let report = use_case.execute(&dir, output_dir)?;
            log::info!(
                "{} of {} image(s) written to {}",
                report.processed.len(),
                report.total(),
                output_dir.display()
            );
        }
        MediaMode::Video(input) => {
            let mut use_case = RedactVideoUseCase::new(
                Box::new(FfmpegReader::new()),
                Box::new(FfmpegWriter::new()),
                redaction,
                Box::new(LogPipelineLogger::new(config.progress_every)),
            );
            let report = use_case.execute(&input, output_dir)?;
            log::info!("Output written to {}", report.output_path.display());
        }
        MediaMode::LiveCamera => {
            let camera = match config.camera_device.as_deref() {
                Some(device) => FfmpegCamera::with_device(device),
                None => FfmpegCamera::new(),
            };
            let mut use_case = LiveCameraUseCase::new(Box::new(camera), redaction);
            if use_case.start()? {
                live_view::show(use_case)?;
            }
        }
    }

    Ok(())
}

/// Defaults, then the config file, then explicit flags.
fn merge_config(cli: &Cli) -> Result<RedactConfig, RedactError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => RedactConfig::load(path)?,
        None => RedactConfig::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(strength) = cli.blur_strength {
        config.blur_strength = strength;
    }
    if let Some(model) = &cli.model {
        config.model_path = Some(model.clone());
    }
    if let Some(camera) = &cli.camera {
        config.camera_device = Some(camera.clone());
    }
    Ok(config)
}

fn build_redaction(
    config: &RedactConfig,
    strength: BlurStrength,
) -> Result<FrameRedaction, RedactError> {
    let bundled_dir = bundled_model_dir();
    let source = ModelSource {
        name: BLAZEFACE_MODEL_NAME,
        explicit: config.model_path.as_deref(),
        bundled_dir: bundled_dir.as_deref(),
        url: config.model_url.as_deref(),
    };

    log::info!("Resolving model: {BLAZEFACE_MODEL_NAME}");
    let downloading = Arc::new(AtomicBool::new(false));
    let model_path = model_resolver::resolve(&source, Some(download_progress(&downloading)))?;
    if downloading.load(Ordering::Relaxed) {
        eprintln!();
    }

    let detector = OnnxBlazefaceDetector::new(&model_path)
        .map_err(|e| RedactError::Detection(format!("{}: {e}", model_path.display())))?;
    log::info!("Blur strength: {strength}");
    Ok(FrameRedaction::new(
        Box::new(detector),
        Box::new(BoxBlurrer::new(strength)),
    ))
}

fn image_use_case(redaction: FrameRedaction) -> RedactImageUseCase {
    RedactImageUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        redaction,
    )
}

/// `models/` next to the executable, for packaged installs.
fn bundled_model_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")))
}

fn download_progress(flag: &Arc<AtomicBool>) -> model_resolver::ProgressFn {
    let flag = Arc::clone(flag);
    Box::new(move |downloaded, total| {
        flag.store(true, Ordering::Relaxed);
        if total > 0 {
            let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
            eprint!("\rDownloading face detection model... {pct}%");
        } else {
            eprint!("\rDownloading face detection model... {downloaded} bytes");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("faceredact").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--filePath", "photo.jpg"]).unwrap();
        assert_eq!(cli.mode, InputKind::Image);
        assert_eq!(cli.file_path, Some(PathBuf::from("photo.jpg")));

        let config = merge_config(&cli).unwrap();
        assert_eq!(config, RedactConfig::default());
        assert_eq!(config.validate().unwrap().get(), 40);
    }

    #[test]
    fn test_original_flag_spellings() {
        let cli = parse(&[
            "--mode",
            "video",
            "--filePath",
            "clip.mp4",
            "--output_dir",
            "redacted",
            "--blur_strength",
            "15",
        ])
        .unwrap();
        assert_eq!(cli.mode, InputKind::Video);
        assert_eq!(cli.output_dir, Some(PathBuf::from("redacted")));
        assert_eq!(cli.blur_strength, Some(15));
    }

    #[test]
    fn test_kebab_case_aliases() {
        let cli = parse(&[
            "--file-path",
            "a.png",
            "--output-dir",
            "out",
            "--blur-strength",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.file_path, Some(PathBuf::from("a.png")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.blur_strength, Some(3));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(parse(&["--mode", "audio"]).is_err());
    }

    #[test]
    fn test_non_positive_blur_strength_fails_validation() {
        let cli = parse(&["--filePath", "a.png", "--blur_strength", "-3"]).unwrap();
        let config = merge_config(&cli).unwrap();
        assert!(matches!(config.validate(), Err(RedactError::Config(_))));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("faceredact.json");
        std::fs::write(
            &config_path,
            r#"{"output_dir": "from-file", "blur_strength": 12, "camera_device": "/dev/video1"}"#,
        )
        .unwrap();

        let cli = parse(&[
            "--mode",
            "webcam",
            "--config",
            config_path.to_str().unwrap(),
            "--blur_strength",
            "30",
        ])
        .unwrap();
        let config = merge_config(&cli).unwrap();

        assert_eq!(config.output_dir, PathBuf::from("from-file"));
        assert_eq!(config.blur_strength, 30);
        assert_eq!(config.camera_device.as_deref(), Some("/dev/video1"));
    }

    #[test]
    fn test_missing_config_file_is_not_found() {
        let cli = parse(&["--config", "/nonexistent/faceredact.json"]).unwrap();
        assert!(matches!(
            merge_config(&cli),
            Err(RedactError::NotFound { .. })
        ));
    }

    #[test]
    fn test_missing_input_fails_before_loading_model() {
        let cli = parse(&["--filePath", "/nonexistent/photo.png"]).unwrap();
        let err = run(cli).unwrap_err();
        assert_eq!(err.to_string(), "file /nonexistent/photo.png does not exist");
    }
}
