//! bounce - offline metronome render
//!
//! Run with: cargo run --bin bounce -- --duration 4 --bpm 120

mod analysis;
mod cli;
mod logger;
mod playback;

use std::time::Instant;

use color_eyre::eyre::{eyre, WrapErr};
use log::{debug, info, warn};
use saavy_offline::{
    graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode},
    OfflineContext, TimeSource,
};

use cli::{Args, Parser};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    logger::init(args.level_filter()).wrap_err("failed to install logger")?;

    let mut ctx = OfflineContext::new(args.channels, args.duration, args.sample_rate)
        .wrap_err("invalid render configuration")?;

    let mut click = ctx
        .engine_mut()
        .ok_or_else(|| eyre!("offline context closed before setup"))?
        .add_track(
            OscNode::sine()
                .with_frequency(args.frequency)
                .amplify(EnvNode::adsr(0.001, 0.03, 0.0, 0.01)),
        );

    // Downbeat at zero, then one click per beat
    click.note_on(0.0, 60, 100)?;
    ctx.set_interval(args.beat_interval(), move |time| {
        if let Err(err) = click.note_on(time, 60, 100) {
            warn!("dropped click at {:.3}s: {}", time, err);
        }
    })?;

    let source = ctx.time_source();
    let mut last_second = 0u64;
    ctx.on_tick(move |_| {
        let second = source.now() as u64;
        if second > last_second {
            last_second = second;
            debug!("simulated {}s", second);
        }
    });

    let started = Instant::now();
    let buffer = ctx.render().wait().wrap_err("offline render failed")?;
    info!(
        "rendered {:.2}s of audio in {:.1?}",
        buffer.duration(),
        started.elapsed()
    );
    ctx.close().wait()?;

    println!("=== bounce ===");
    println!("Channels:    {}", buffer.number_of_channels());
    println!("Frames:      {}", buffer.length());
    println!("Sample rate: {} Hz", buffer.sample_rate);
    println!("Peak:        {:.3}", buffer.peak());
    println!("RMS:         {:.3}", buffer.rms());
    match buffer
        .channel(0)
        .and_then(|c| analysis::dominant_frequency(c, buffer.sample_rate))
    {
        Some(freq) => println!("Dominant:    {:.1} Hz", freq),
        None => println!("Dominant:    (silent)"),
    }

    if args.play {
        playback::play(&buffer)?;
    }

    Ok(())
}
