//! ROI selector for cardiac/neck displacement diagnosis
//! Built with Rust + egui (eframe)

mod app;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use roi_tool::config::Config;
use roi_tool::frame_source::{FrameSource, ImageFileFrameSource};
use roi_tool::submission::{JsonSubmitter, RoiSubmitter};
use roi_tool::AppError;

use app::RoiApp;

/// Select a region of interest on a representative video frame
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "roi-tool", version, about, long_about = None)]
struct CliArgs {
    /// Representative frame image
    frame: PathBuf,
    /// Native video size, when the frame is a downscaled preview
    #[arg(long = "native", value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    native_size: Option<(u32, u32)>,
    /// Video reference sent along with the ROI
    #[arg(long, value_name = "REF")]
    video: Option<String>,
    /// Config file to use instead of the one in the config directory
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let bad = || format!("bad size '{value}', expected WIDTHxHEIGHT");
    let (w, h) = value.trim().split_once(['x', 'X']).ok_or_else(bad)?;
    let w = w.trim().parse().map_err(|_| bad())?;
    let h = h.trim().parse().map_err(|_| bad())?;
    Ok((w, h))
}

fn build_submitter(config: &Config) -> Result<Box<dyn RoiSubmitter>, AppError> {
    Ok(match &config.output_path {
        Some(path) => {
            info!("diagnosis requests go to {}", path.display());
            Box::new(JsonSubmitter::append_to(path)?)
        }
        None => Box::new(JsonSubmitter::stdout()),
    })
}

fn run(args: CliArgs) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };

    let mut source = ImageFileFrameSource::new(&args.frame);
    if let Some((w, h)) = args.native_size {
        source = source.with_native_size(w, h);
    }
    let frame = source.representative_frame()?;
    let submitter = build_submitter(&config)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Select ROI")
            .with_min_inner_size([320.0, 360.0])
            .with_inner_size([960.0, 760.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ROI Tool",
        options,
        Box::new(move |cc| Ok(Box::new(RoiApp::new(cc, config, frame, submitter, args.video)))),
    )
    .map_err(|e| AppError::Window(e.to_string()))
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roi_tool=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("roi-tool").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = parse(&["frame.png", "--native", "1920x1080", "--video", "uploads/171.mp4"]).unwrap();
        assert_eq!(cli.frame, PathBuf::from("frame.png"));
        assert_eq!(cli.native_size, Some((1920, 1080)));
        assert_eq!(cli.video.as_deref(), Some("uploads/171.mp4"));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_parse_equals_form() {
        let cli = parse(&["--native=640x480", "--config=roi.ini", "frame.png"]).unwrap();
        assert_eq!(cli.native_size, Some((640, 480)));
        assert_eq!(cli.config, Some(PathBuf::from("roi.ini")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["f.png", "--native", "1920"]).is_err());
        assert!(parse(&["f.png", "--video"]).is_err());
        assert!(parse(&["f.png", "--video", "--config", "roi.ini"]).is_err());
        assert!(parse(&["a.png", "b.png"]).is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("640X480"), Ok((640, 480)));
        assert_eq!(parse_size(" 640 x 480 "), Ok((640, 480)));
        assert!(parse_size("x480").is_err());
    }
}
