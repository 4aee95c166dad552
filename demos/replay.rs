//! Replays a detections dump through the counter.
//!
//! Input lines look like `<frame_index>:<json array of detections>`, e.g.
//! `12:[{"x":10,"y":20,"w":40,"h":90,"p":0.8,"c":0}]`.
//!
//! usage: replay <detections file> [--config <json>] [--dims <WxH>] [--db <sqlite path>]
//!
//! Frame dimensions default to 1920x1080; they only matter when the config
//! leaves `line_y` unset and the line falls back to the frame midpoint.

use std::io::BufRead;
use std::time::Instant;

use smart_counter::fps::FpsMeter;
use smart_counter::{CountSink, CounterConfig, Detection, Frame, MemorySink, PeopleCounter, SqliteSink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIMS: (u32, u32) = (1920, 1080);

fn parse_dims(src: &str) -> Result<(u32, u32), anyhow::Error> {
    let (w, h) = src
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("dims should look like 1280x720, got `{}`", src))?;

    Ok((w.trim().parse()?, h.trim().parse()?))
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let in_file_name = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("expected detections file name"))?;

    let mut config = CounterConfig::default();
    let mut dims = DEFAULT_DIMS;
    let mut db = None;

    while let Some(flag) = args.next() {
        let value = args
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing value for `{}`", flag))?;

        match flag.as_str() {
            "--config" => config = CounterConfig::from_json(&std::fs::read_to_string(value)?)?,
            "--dims" => dims = parse_dims(&value)?,
            "--db" => db = Some(value),
            other => anyhow::bail!("unknown argument `{}`", other),
        }
    }

    info!(?config, width = dims.0, height = dims.1, "starting replay");

    let sink: Box<dyn CountSink> = match db {
        Some(db) => Box::new(SqliteSink::open(db)?),
        None => Box::new(MemorySink::new()),
    };

    let mut counter = PeopleCounter::new(config, sink)?;
    let mut fps = FpsMeter::default();

    let reader = std::io::BufReader::new(std::fs::File::open(in_file_name)?);

    for line in reader.lines() {
        let line = line?;
        let Some((idx, vector)) = line.split_once(':') else {
            warn!("wrong file format: expected `:`");
            continue;
        };

        let (index, detections) = match (
            idx.trim().parse::<u64>(),
            serde_json::from_str::<Vec<Detection>>(vector),
        ) {
            (Ok(index), Ok(dets)) => (index, dets),
            (Ok(_), Err(err)) => {
                warn!(%err, "wrong file format: parse json failed");
                continue;
            }
            (Err(err), _) => {
                warn!(%err, "wrong file format: parse frame index failed");
                continue;
            }
        };

        let started = Instant::now();
        let report = counter.process_frame(&Frame::new(index, dims, detections));
        fps.push(started.elapsed());

        if fps.frames() % 60 == 0 {
            info!(
                frames = fps.frames(),
                fps = fps.average(),
                tracks = report.tracks.len(),
                "progress"
            );
        }
    }

    let counts = counter.counts();
    let occupancy = counter.occupancy();
    info!(
        entered = counts.entered,
        exited = counts.exited,
        inside = occupancy.display,
        drift = occupancy.is_drifting(),
        avg_fps = fps.average(),
        "done"
    );

    Ok(())
}
