//! Headless microphone recorder.
//!
//! Records from the default (or named) input device until the given number
//! of seconds has passed or Ctrl-C is pressed, then prints the file path.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{bounded, RecvTimeoutError};

use mic_recorder_core::{CaptureError, RecorderConfig};
use mic_recorder_cpal::{CpalBackend, CpalBackendConfig, CpalRecorder, RecorderExt};

#[derive(Debug, Parser)]
#[command(name = "mic-record", version, about = "Record the microphone to a WAV file")]
struct Args {
    /// Audio host to use (e.g. ALSA, JACK). Defaults to the platform host.
    #[arg(long)]
    host: Option<String>,

    /// Input device name. Defaults to the system default input.
    #[arg(long)]
    device: Option<String>,

    /// Directory to write recordings into.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long, short)]
    seconds: Option<f64>,

    /// Also write a JSON metadata sidecar.
    #[arg(long)]
    metadata: bool,

    /// List input devices and exit.
    #[arg(long)]
    list: bool,
}

impl Args {
    fn backend_config(&self) -> CpalBackendConfig {
        CpalBackendConfig {
            host: self.host.clone(),
            device_name: self.device.clone(),
            ..Default::default()
        }
    }

    fn recorder_config(&self) -> RecorderConfig {
        let mut config = match &self.output {
            Some(dir) => RecorderConfig::with_output_directory(dir),
            None => RecorderConfig::default(),
        };
        config.write_metadata = self.metadata;
        config
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let result = if args.list { list(&args) } else { record(&args) };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mic-record: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn list(args: &Args) -> Result<(), CaptureError> {
    let backend = CpalBackend::new(args.backend_config())?;
    for device in backend.list_input_devices()? {
        println!(
            "{} {}  ({} Hz, {} ch, {:?})",
            if device.is_default { "*" } else { " " },
            device.name,
            device.format.sample_rate,
            device.format.channels,
            device.format.sample_format
        );
    }
    Ok(())
}

fn record(args: &Args) -> Result<(), CaptureError> {
    let limit = match args.seconds {
        Some(s) if s.is_finite() && s > 0.0 => Some(Duration::from_secs_f64(s)),
        Some(s) => return Err(CaptureError::InvalidConfiguration(format!("invalid duration: {}", s))),
        None => None,
    };

    let recorder = CpalRecorder::with_backend_config(args.recorder_config(), args.backend_config())?;

    let (interrupt_tx, interrupt_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })
    .map_err(|e| CaptureError::InvalidConfiguration(format!("failed to install Ctrl-C handler: {}", e)))?;

    recorder.start_recording()?;
    match limit {
        Some(limit) => {
            log::info!("Recording for {:.1}s (Ctrl-C to stop early)", limit.as_secs_f64());
            if let Err(RecvTimeoutError::Timeout) = interrupt_rx.recv_timeout(limit) {
                log::debug!("Recording duration reached");
            }
        }
        None => {
            log::info!("Recording; press Ctrl-C to stop");
            let _ = interrupt_rx.recv();
        }
    }

    let path = recorder.stop_recording()?;
    println!("{}", path.display());
    Ok(())
}
