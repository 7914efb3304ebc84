pub use clap::Parser;

/// bounce - render a metronome offline and report on the result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of output channels
    #[arg(short, long, default_value_t = 2)]
    pub channels: usize,
    /// Length of the render in seconds
    #[arg(short, long, default_value_t = 4.0)]
    pub duration: f64,
    /// Sample rate in Hz
    #[arg(short = 'r', long, default_value_t = 48_000.0)]
    pub sample_rate: f32,
    /// Metronome tempo in beats per minute
    #[arg(short, long, default_value_t = 120.0)]
    pub bpm: f64,
    /// Click frequency in Hz
    #[arg(short, long, default_value_t = 1_000.0)]
    pub frequency: f32,
    /// Log level (1:trace 2:debug 3:info 4:warn 5:error 0:off)
    #[arg(short, long, default_value_t = 3)]
    pub log_level: u8,
    /// Play the rendered buffer on the default output device
    #[arg(short, long)]
    pub play: bool,
}

impl Args {
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Trace,
            2 => log::LevelFilter::Debug,
            3 => log::LevelFilter::Info,
            4 => log::LevelFilter::Warn,
            _ => log::LevelFilter::Error,
        }
    }

    /// Seconds between clicks
    pub fn beat_interval(&self) -> f64 {
        60.0 / self.bpm
    }
}
