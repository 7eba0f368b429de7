// Reference backend: sox (Sound eXchange) capturing from the default
// device and writing the encoded stream to stdout.

use super::BackendDescriptor;
use crate::config::RecordingOptions;

const DEFAULT_THRESHOLD: f64 = 0.5;

/// Build the sox capture command for the given options.
///
/// The argument list always captures from the default device, suppresses
/// progress output, and ends with `-` so audio goes to stdout instead of a
/// file. When `end_on_silence` is set, a `silence` effect is appended that
/// stops the recording after `silence` seconds below the trailing
/// threshold.
pub fn sox_command(options: &RecordingOptions) -> BackendDescriptor {
    let mut args = vec![
        "--default-device".to_string(),
        "--no-show-progress".to_string(),
        "--rate".to_string(),
        options.sample_rate.to_string(),
        "--channels".to_string(),
        options.channels.to_string(),
        "--encoding".to_string(),
        "signed-integer".to_string(),
        "--bits".to_string(),
        "16".to_string(),
        "--type".to_string(),
        options.audio_type.to_string(),
        // stdout, not a file
        "-".to_string(),
    ];

    if options.end_on_silence {
        let start = options.threshold_start.unwrap_or(DEFAULT_THRESHOLD);
        let end = options.threshold_end.unwrap_or(DEFAULT_THRESHOLD);
        args.extend([
            "silence".to_string(),
            "1".to_string(),
            "0.1".to_string(),
            format_percentage(start),
            "1".to_string(),
            format_seconds(options.silence),
            format_percentage(end),
        ]);
    }

    BackendDescriptor {
        command: "sox".to_string(),
        args,
    }
}

/// Render a fractional threshold as a sox percentage token (0.3 -> "30%").
fn format_percentage(fraction: f64) -> String {
    format!("{}%", format_number(fraction * 100.0))
}

/// Render a duration in seconds the way sox expects (2.0 -> "2", 1.5 -> "1.5").
fn format_seconds(seconds: f64) -> String {
    format_number(seconds)
}

fn format_number(value: f64) -> String {
    // Round away float noise (0.3 * 100 = 30.000000000000004) before
    // relying on the shortest Display form.
    let rounded = (value * 1e6).round() / 1e6;
    format!("{rounded}")
}
