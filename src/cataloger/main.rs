// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-tof-cataloger requires the 'std' feature");

use asimov_module::SysexitsError::{self, *};
use asimov_tof_module::{
    cli,
    shared::{CameraError, log_all_depth_output_cameras, open_host},
};
use clap::Parser;
use clientele::StandardOptions;
use serde_json::json;
use std::error::Error as StdError;

#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    #[arg(
        value_name = "FORMAT",
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text"
    )]
    output: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Jsonl,
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

    let exit_code = match run_cataloger(&options) {
        Ok(()) => EX_OK,
        Err(err) => cli::handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

fn run_cataloger(options: &Options) -> Result<(), CameraError> {
    cli::info_user(&options.flags, "enumerating depth cameras");

    let host = open_host()?;
    let cameras = log_all_depth_output_cameras(host.as_ref())?;
    if cameras.is_empty() {
        cli::warn_user(&options.flags, "no depth-capable cameras found");
        return Ok(());
    }

    for c in cameras {
        let sizes: Vec<String> = c.depth16_sizes().map(|(w, h)| format!("{w}x{h}")).collect();
        match options.output {
            OutputFormat::Text => {
                let fov = c
                    .field_of_view()
                    .map(|f| format!(" fov={:.1}°", f.to_degrees()))
                    .unwrap_or_default();
                println!("{}: {}{} [{}]", c.id, c.facing_label(), fov, sizes.join(", "));
            },
            OutputFormat::Jsonl => {
                println!(
                    "{}",
                    json!({
                        "id": c.id,
                        "facing": c.facing_label(),
                        "fov": c.field_of_view(),
                        "depth_sizes": sizes,
                    })
                );
            },
        }
    }

    Ok(())
}
