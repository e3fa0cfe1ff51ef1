/*
This code is part of the DepthSweep geospatial analysis library.
Created: 19/10/2026
License: MIT
*/
use depth_volume_sweep::configs::get_configs;
use depth_volume_sweep::error::StageContext;
use depth_volume_sweep::tools::SurfaceVolume;
use depth_volume_sweep::utils::get_formatted_elapsed_time;
use depth_volume_sweep::workspace::ScratchWorkspace;
use depth_volume_sweep::{BufferSweep, Configs, FailurePolicy, LogFields, Pipeline, Stage};
use std::env;
use std::io::{Error, ErrorKind};
use std::path::{Path, MAIN_SEPARATOR};
use std::process;
use std::time::Instant;

fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.trim().to_lowercase()).unwrap_or_default();

    let result = match command.as_str() {
        "run" => run(&args[2..]),
        "report" => report(&args[2..]),
        "version" => {
            version();
            Ok(())
        }
        "" | "help" | "-h" | "--help" => {
            help();
            Ok(())
        }
        other => Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Unrecognized command '{}'. Use 'help' for usage.", other),
        )),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn help() {
    let mut ext = "";
    if cfg!(target_os = "windows") {
        ext = ".exe";
    }

    let exe_name = &format!("depth_volume_sweep{}", ext);
    let sep: String = MAIN_SEPARATOR.to_string();
    let s = r#"
    depth_volume_sweep Help

    Sweeps a series of channel buffer distances. For each distance, depth points inside
    the area mask and farther than the buffer from the selected channels are gridded by
    IDW, the grid is clipped to the mask, and its surface volume is appended to the log.

    The following commands are recognized:
    help       Prints help information.
    run        Runs the sweep.
    report     Prints the fields of a volume report.
    version    Prints the version information.

    The following flags can be used with the 'run' command:
    --wd           Working directory holding the inputs and the log.
    --start        First buffer distance (default 0).
    --end          Exclusive upper buffer distance (default 500).
    --step         Buffer distance increment (default 10).
    --buffer       Run a single buffer distance only.
    --resume       Continue after the largest buffer already in the log.
    --on_error     halt (default) or skip.
    --volume_only  Log only the buffer and volume.
    -v             Verbose output.

    The following flags can be used with the 'report' command:
    -i, --input    Name of the volume report file.

    Other settings are read from the settings.json file in the current directory.

    Example Usage:
    >> .*EXE_NAME run --wd="*path*to*data*" --start=0 --end=500 --step=10 --on_error=skip -v
    >> .*EXE_NAME report -i=VOL_b10.txt
    "#
    .replace("*", &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "depth_volume_sweep v{}",
        VERSION.unwrap_or("Unknown version")
    );
}

fn get_tool_name() -> String {
    String::from("DepthVolumeSweep")
}

/// Splits `--flag=value` or `--flag value` into a lowercase flag and optional value.
fn parse_flag(args: &[String], i: usize) -> (String, Option<String>) {
    let arg = args[i].replace('"', "").replace('\'', "");
    let mut vec = arg.splitn(2, '=');
    let flag = vec
        .next()
        .unwrap_or_default()
        .to_lowercase()
        .replace("--", "-");
    let value = match vec.next() {
        Some(v) => Some(v.to_string()),
        None => args
            .get(i + 1)
            .filter(|v| !v.starts_with('-'))
            .map(|v| v.replace('"', "").replace('\'', "")),
    };
    (flag, value)
}

fn required(flag: &str, value: Option<String>) -> Result<String, Error> {
    value.ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("The {} flag requires a value.", flag),
        )
    })
}

fn parse_number(flag: &str, value: Option<String>) -> Result<f64, Error> {
    let v = required(flag, value)?;
    v.trim().parse::<f64>().map_err(|_| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Could not parse '{}' as a number for {}.", v, flag),
        )
    })
}

fn run(args: &[String]) -> Result<(), Error> {
    let tool_name = get_tool_name();
    let mut configs: Configs = get_configs()?;
    let mut single_buffer: Option<f64> = None;
    let mut resume = false;

    for i in 0..args.len() {
        if !args[i].starts_with('-') {
            continue;
        }
        let (flag, value) = parse_flag(args, i);
        match flag.as_str() {
            "-wd" | "-cd" => configs.working_directory = required(&flag, value)?,
            "-start" => configs.sweep_start = parse_number(&flag, value)?,
            "-end" => configs.sweep_end = parse_number(&flag, value)?,
            "-step" => configs.sweep_step = parse_number(&flag, value)?,
            "-buffer" => single_buffer = Some(parse_number(&flag, value)?),
            "-resume" => resume = true,
            "-on_error" => configs.on_error = required(&flag, value)?.parse::<FailurePolicy>()?,
            "-volume_only" => configs.log_fields = LogFields::Volume,
            "-v" | "-verbose" => configs.verbose_mode = true,
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("Unrecognized flag '{}'.", args[i]),
                ))
            }
        }
    }

    if configs.verbose_mode {
        let welcome_len = format!("* Welcome to {} *", tool_name).len().max(28);
        println!("{}", "*".repeat(welcome_len));
        println!("* Welcome to {} {}*", tool_name, " ".repeat(welcome_len - 15 - tool_name.len()));
        println!("* Powered by DepthSweep {}*", " ".repeat(welcome_len - 25));
        println!("{}", "*".repeat(welcome_len));
    }

    let start = Instant::now();
    let to_io = |e: depth_volume_sweep::PipelineError| Error::new(ErrorKind::Other, e.to_string());

    match single_buffer {
        Some(buffer) => {
            let pipeline = Pipeline::new(&configs)?;
            let record = {
                let mut scratch =
                    ScratchWorkspace::acquire(&configs.scratch_dir(), configs.keep_artifacts)
                        .at_stage(buffer, Stage::Load)
                        .map_err(to_io)?;
                pipeline.run_iteration(buffer, &mut scratch).map_err(to_io)?
            };
            println!("{}", record.to_line(configs.log_fields)?);
        }
        None => {
            let mut sweep = BufferSweep::new(configs.clone());
            sweep.resume = resume;
            let summary = sweep.run().map_err(to_io)?;
            for e in &summary.failures {
                eprintln!("Skipped {}", e);
            }
            if !summary.failures.is_empty() {
                println!(
                    "{} buffer distances failed; rerun them with --buffer.",
                    summary.failures.len()
                );
            }
        }
    }

    if configs.verbose_mode {
        println!("Elapsed Time (Including I/O): {}", get_formatted_elapsed_time(start));
    }
    Ok(())
}

fn report(args: &[String]) -> Result<(), Error> {
    let mut input_file = String::new();
    for i in 0..args.len() {
        if !args[i].starts_with('-') {
            continue;
        }
        let (flag, value) = parse_flag(args, i);
        if flag == "-i" || flag == "-input" {
            input_file = required(&flag, value)?;
        }
    }
    if input_file.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "No report file was specified; use -i=<file>.",
        ));
    }
    let r = SurfaceVolume::read_report(Path::new(&input_file))?;
    println!("Dataset:      {}", r.dataset);
    println!("Plane height: {}", r.plane_height);
    println!("Reference:    {}", r.reference);
    println!("Z factor:     {}", r.z_factor);
    println!("Area 2D:      {}", r.area_2d);
    println!("Area 3D:      {}", r.area_3d);
    println!("Volume:       {}", r.volume);
    Ok(())
}
