#[cfg(not(feature = "streaming"))]
fn main() {
    eprintln!(
        "The synthstream CLI requires the \"streaming\" feature. Rebuild with `--features streaming` to enable playback."
    );
}

#[cfg(feature = "streaming")]
mod cli {
    use std::env;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use anyhow::{bail, Context, Result};
    use tracing_subscriber::EnvFilter;

    use synthstream::driver::CpalDriver;
    use synthstream::{
        AudioPlayer, AudioSource, AudioSourceConsumer, SineSource, StreamPlayer, Synthesizer,
        SynthesizerBase, DEFAULT_SAMPLE_RATE,
    };

    const DEFAULT_FREQUENCY_HZ: f32 = 440.0;
    const DEFAULT_DURATION_SECS: f32 = 3.0;
    const DEFAULT_VOLUME: f32 = 0.8;

    /// Single sine-voice synthesizer wired through the cpal driver
    struct ToneSynth {
        base: SynthesizerBase,
        voice: Arc<SineSource>,
    }

    impl ToneSynth {
        fn new(driver: CpalDriver, frequency: f32) -> Self {
            let voice = Arc::new(SineSource::new(DEFAULT_SAMPLE_RATE, frequency));
            let player = StreamPlayer::with_source(driver, voice.clone(), DEFAULT_SAMPLE_RATE);
            ToneSynth {
                base: SynthesizerBase::new(Box::new(player)),
                voice,
            }
        }
    }

    impl AudioSourceConsumer for ToneSynth {
        fn set_audio_source(&mut self, source: Arc<dyn AudioSource>) {
            self.base.set_audio_source(source);
        }

        fn get_audio_source(&self) -> Option<Arc<dyn AudioSource>> {
            self.base.get_audio_source()
        }
    }

    impl Synthesizer for ToneSynth {
        fn play(&mut self) -> synthstream::Result<()> {
            self.base.start_player()
        }

        fn stop(&mut self) {
            self.base.stop_player();
        }

        fn is_playing(&self) -> bool {
            self.base.is_playing()
        }

        fn set_volume(&mut self, gain: f32) {
            self.voice.set_amplitude(gain);
        }
    }

    fn print_usage(program: &str) {
        println!("Usage: {program} [FREQUENCY_HZ] [DURATION_SECS] [VOLUME]");
        println!();
        println!("Plays a sine tone through the default output device.");
        println!("  FREQUENCY_HZ   oscillator frequency (default {DEFAULT_FREQUENCY_HZ})");
        println!("  DURATION_SECS  playback duration (default {DEFAULT_DURATION_SECS})");
        println!("  VOLUME         linear gain 0..1 (default {DEFAULT_VOLUME})");
    }

    fn parse_arg(value: &str, name: &str) -> Result<f32> {
        value
            .parse::<f32>()
            .with_context(|| format!("invalid {name}: {value}"))
    }

    pub fn run() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();

        let args: Vec<String> = env::args().collect();
        if args.iter().any(|a| a == "-h" || a == "--help") {
            print_usage(&args[0]);
            return Ok(());
        }
        if args.len() > 4 {
            print_usage(&args[0]);
            bail!("too many arguments");
        }

        let frequency = match args.get(1) {
            Some(v) => parse_arg(v, "frequency")?,
            None => DEFAULT_FREQUENCY_HZ,
        };
        let duration = match args.get(2) {
            Some(v) => parse_arg(v, "duration")?,
            None => DEFAULT_DURATION_SECS,
        };
        let volume = match args.get(3) {
            Some(v) => parse_arg(v, "volume")?,
            None => DEFAULT_VOLUME,
        };
        if !(0.0..=20_000.0).contains(&frequency) {
            bail!("frequency out of range: {frequency}");
        }

        let driver = CpalDriver::new().context("no usable audio output device")?;
        let mut synth = ToneSynth::new(driver, frequency);
        synth.set_volume(volume);

        synth.play().context("failed to start playback")?;
        println!("Playing {frequency} Hz at volume {volume:.2} for {duration} s");
        if let Some(player) = synth.base.player() {
            println!(
                "Negotiated: {} channel(s), {} frames per callback at {} Hz",
                player.get_channel_count(),
                player.get_frames_per_data_callback(),
                DEFAULT_SAMPLE_RATE
            );
        }

        thread::sleep(Duration::from_secs_f32(duration.max(0.0)));

        synth.stop();
        println!("Stopped.");
        Ok(())
    }
}

#[cfg(feature = "streaming")]
fn main() {
    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
