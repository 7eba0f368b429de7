use anyhow::Result;
use micpipe::{Recorder, RecordingOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

const CONFIG_PATH: &str = "config/micpipe";
const OUTPUT_PATH: &str = "recording.wav";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let options = if std::path::Path::new(&format!("{CONFIG_PATH}.toml")).exists() {
        RecordingOptions::load(CONFIG_PATH)?
    } else {
        RecordingOptions::default()
    };

    info!("micpipe v0.1.0");
    info!(
        "Recording via {} at {} Hz, {} channel(s), {} output",
        options.backend, options.sample_rate, options.channels, options.audio_type
    );
    info!("Writing captured audio to {OUTPUT_PATH}; press Ctrl-C to stop");

    let recorder = Recorder::new(options)?;
    recorder.start();

    let Some(stream) = recorder.stream() else {
        anyhow::bail!("recording did not start; is the capture utility installed?");
    };

    let mut output = tokio::fs::File::create(OUTPUT_PATH).await?;
    let mut bytes_written = 0u64;

    loop {
        tokio::select! {
            chunk = stream.next_chunk() => {
                match chunk {
                    Some(chunk) => {
                        bytes_written += chunk.len() as u64;
                        output.write_all(&chunk).await?;
                    }
                    None => {
                        info!("Capture stream ended");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping recording");
                recorder.stop();
            }
        }
    }

    output.flush().await?;
    info!("Wrote {bytes_written} bytes to {OUTPUT_PATH}");

    Ok(())
}
