// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-tof-reader requires the 'std' feature");

use asimov_module::SysexitsError::{self, *};
use asimov_tof_module::{
    cli,
    shared::{
        CameraError, CameraEvent, DepthCamera, DepthCameraConfig, DepthFrame, FrameSink, open_host,
    },
};
use clap::Parser;
use clientele::StandardOptions;
use serde_json::json;
use std::{
    error::Error as StdError,
    io::{self, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    /// Camera ID to open instead of the first front depth camera.
    #[arg(long)]
    device: Option<String>,

    #[arg(short, long = "size", value_parser = parse_dimensions, default_value = "240x180")]
    size: (u32, u32),

    /// Stop after this many frames.
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    limit: Option<u64>,

    /// Skip the vendor depth-tag probe.
    #[arg(long)]
    no_vendor_tags: bool,
}

pub fn main() -> Result<SysexitsError, Box<dyn StdError>> {
    asimov_module::dotenv().ok();
    let args = asimov_module::args_os()?;
    let options = Options::parse_from(args);

    if options.flags.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EX_OK);
    }

    if options.flags.license {
        print!("{}", include_str!("../../UNLICENSE"));
        return Ok(EX_OK);
    }

    #[cfg(feature = "tracing")]
    asimov_module::init_tracing_subscriber(&options.flags).expect("failed to initialize logging");

    let exit_code = match run_reader(&options) {
        Ok(()) => EX_OK,
        Err(err) => cli::handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_reader(opts: &Options) -> Result<(), CameraError> {
    cli::info_user(&opts.flags, "starting depth camera reader");

    let quit = Arc::new(AtomicBool::new(false));
    {
        let quit2 = Arc::clone(&quit);
        ctrlc::set_handler(move || {
            quit2.store(true, Ordering::SeqCst);
        })
        .map_err(|e| CameraError::other(format!("{e}")))?;
    }

    let (width, height) = opts.size;
    let mut config = DepthCameraConfig::new(width, height)
        .with_vendor_tags(!opts.no_vendor_tags)
        .with_diagnostics(opts.flags.debug || opts.flags.verbose >= 3);
    if let Some(device) = opts.device.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        config = config.with_device(device);
    }

    let count = Arc::new(AtomicU64::new(0));
    let limit = opts.limit;

    let quit_cb = Arc::clone(&quit);
    let count_cb = Arc::clone(&count);
    let sink: FrameSink = Arc::new(move |frame: DepthFrame| {
        if quit_cb.load(Ordering::SeqCst) {
            return;
        }

        let n = count_cb.fetch_add(1, Ordering::SeqCst);
        let line = json!({
            "camera": frame.camera_id,
            "frame": n,
            "width": frame.width,
            "height": frame.height,
            "timestamp_ns": frame.timestamp_ns,
        });

        let mut out = io::stdout().lock();
        if let Err(err) = writeln!(&mut out, "{line}") {
            if err.kind() == io::ErrorKind::BrokenPipe {
                quit_cb.store(true, Ordering::SeqCst);
            }
        }

        if limit.is_some_and(|l| n + 1 >= l) {
            quit_cb.store(true, Ordering::SeqCst);
        }
    });

    let mut camera = DepthCamera::new(open_host()?, config)?;
    camera.add_sink(sink);
    camera.open_front_depth_camera()?;

    while !quit.load(Ordering::SeqCst) {
        for event in camera.events().try_iter() {
            match event {
                CameraEvent::Disconnected { camera_id } => {
                    cli::warn_user(&opts.flags, &format!("camera {camera_id} disconnected"));
                    quit.store(true, Ordering::SeqCst);
                },
                CameraEvent::DeviceError { camera_id, code } => {
                    cli::warn_user(&opts.flags, &format!("camera {camera_id} error {code}"));
                },
                CameraEvent::Warning { message } => cli::warn_user(&opts.flags, &message),
                CameraEvent::Diagnostics { camera_id, detail } => {
                    cli::info_user(&opts.flags, &format!("camera {camera_id}: {detail}"));
                },
                CameraEvent::FrameDropped if opts.flags.verbose >= 2 => {
                    cli::warn_user(&opts.flags, "frame dropped");
                },
                _ => {},
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    if let Err(err) = camera.stop() {
        cli::warn_user(&opts.flags, &format!("stopping camera failed: {err}"));
    }
    cli::info_user(
        &opts.flags,
        &format!("stopped after {} frames", count.load(Ordering::SeqCst)),
    );
    Ok(())
}

fn parse_dimensions(s: &str) -> Result<(u32, u32), String> {
    let s = s.trim().replace('×', "x");
    let parts: Vec<&str> = s.split('x').map(|t| t.trim()).collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(format!("Invalid format '{s}'. Use WxH (e.g., 240x180)"));
    }

    let width: u32 = parts[0].parse().map_err(|_| format!("Invalid width: {}", parts[0]))?;
    let height: u32 = parts[1].parse().map_err(|_| format!("Invalid height: {}", parts[1]))?;

    if !(1..=4096).contains(&width) {
        return Err(format!("Width {width} is out of range (1-4096)"));
    }
    if !(1..=4096).contains(&height) {
        return Err(format!("Height {height} is out of range (1-4096)"));
    }

    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::{Options, parse_dimensions};
    use clap::Parser;

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_dimensions("240x180"), Ok((240, 180)));
        assert_eq!(parse_dimensions(" 320 × 240 "), Ok((320, 240)));
        assert!(parse_dimensions("240").is_err());
        assert!(parse_dimensions("0x180").is_err());
        assert!(parse_dimensions("axb").is_err());
    }

    #[test]
    fn limit_must_be_positive() {
        assert!(Options::try_parse_from(["asimov-tof-reader", "--limit", "0"]).is_err());
        let options = Options::try_parse_from(["asimov-tof-reader", "-n", "5"]).unwrap();
        assert_eq!(options.limit, Some(5));
        assert_eq!(options.size, (240, 180));
    }
}
