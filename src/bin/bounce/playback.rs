//! Play a rendered buffer on the default output device

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info, warn};
use saavy_offline::AudioBuffer;

/// Blocks until every frame has been handed to the device
pub fn play(buffer: &AudioBuffer) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let device_rate = config.sample_rate().0 as f32;
    if device_rate != buffer.sample_rate {
        warn!(
            "device runs at {} Hz but the buffer was rendered at {} Hz; pitch will shift",
            device_rate, buffer.sample_rate
        );
    }

    let device_channels = config.channels() as usize;
    let source = Arc::new(buffer.clone());
    let position = Arc::new(AtomicUsize::new(0));

    let stream_source = Arc::clone(&source);
    let stream_position = Arc::clone(&position);
    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let last_channel = stream_source.number_of_channels().saturating_sub(1);
            for frame in data.chunks_mut(device_channels) {
                let pos = stream_position.fetch_add(1, Ordering::Relaxed);
                // Extra device channels repeat the last rendered channel
                for (ch, out) in frame.iter_mut().enumerate() {
                    *out = stream_source
                        .channel(ch.min(last_channel))
                        .and_then(|c| c.get(pos))
                        .copied()
                        .unwrap_or(0.0);
                }
            }
        },
        |err| error!("audio error: {}", err),
        None,
    )?;

    info!("playing {:.2}s", source.duration());
    stream.play()?;

    while position.load(Ordering::Relaxed) < source.length() {
        std::thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}
