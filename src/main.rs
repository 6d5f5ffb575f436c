use nilm_prep::{Error, Pipeline};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn prompt(input: &mut impl BufRead, question: &str) -> nilm_prep::Result<String> {
    print!("{question}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "input closed",
        )));
    }

    Ok(line.trim().to_owned())
}

fn prompt_source_dir(input: &mut impl BufRead) -> nilm_prep::Result<PathBuf> {
    loop {
        let answer = prompt(
            input,
            "\nEnter directory containing appliance folders, or 'WD' to use the current working directory:\n",
        )?;

        if answer == "WD" {
            return Ok(std::env::current_dir()?);
        }

        let path = PathBuf::from(answer);
        if path.is_dir() {
            return Ok(path);
        }

        println!("Invalid or directory doesn't exist... try again");
    }
}

fn main() -> nilm_prep::Result<()> {
    env_logger::builder()
        .filter_module("lsm_tree", log::LevelFilter::Warn)
        .filter_module("fjall", log::LevelFilter::Info)
        .filter_module("nilm_prep", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut input = std::io::stdin().lock();

    let source_dir = prompt_source_dir(&mut input)?;
    log::info!("source: {source_dir:?}");

    let date = prompt(&mut input, "Input file generation date as mm-dd: ")?;

    let scale = prompt(
        &mut input,
        "Input desired timescale (samples per output sample, no unit): ",
    )?;
    let scale = scale
        .parse::<i64>()
        .map_err(|_| Error::InvalidConfiguration(format!("scale must be an integer, got {scale:?}")))?;

    // NOTE: Meters are written next to the folder holding the recordings
    let output_dir = source_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    let pipeline = Pipeline::builder(&source_dir)
        .output_dir(&output_dir)
        .date(date)
        .scale(scale)
        .store(output_dir.join("store"))
        .build()?;

    let start = Instant::now();
    let report = pipeline.run()?;

    log::info!("done in {:?}", start.elapsed());
    log::info!("{report}");

    if report.malformed_cells > 0 {
        log::warn!(
            "{} cells were not numbers and counted as 0 in the mains trace",
            report.malformed_cells
        );
    }

    Ok(())
}
