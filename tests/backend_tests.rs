// Unit tests for backend resolution and the sox command builder
//
// These tests verify that the registry resolves names to builders and that
// the reference builder maps options to the exact sox argument syntax.

use micpipe::backend::{register_backend, resolve_backend, sox_command, BackendDescriptor};
use micpipe::{AudioType, BackendError, RecordingOptions};

/// Value following a `--flag` token, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let at = args.iter().position(|a| a == flag)?;
    args.get(at + 1).map(String::as_str)
}

#[test]
fn test_sox_builder_is_deterministic() {
    let options = RecordingOptions {
        sample_rate: 44100,
        channels: 2,
        end_on_silence: true,
        threshold_start: Some(0.25),
        ..Default::default()
    };

    assert_eq!(sox_command(&options), sox_command(&options));
}

#[test]
fn test_sox_defaults() {
    let descriptor = sox_command(&RecordingOptions::default());

    assert_eq!(descriptor.command, "sox");
    assert_eq!(descriptor.args[0], "--default-device");
    assert_eq!(descriptor.args[1], "--no-show-progress");
    assert_eq!(flag_value(&descriptor.args, "--rate"), Some("16000"));
    assert_eq!(flag_value(&descriptor.args, "--channels"), Some("1"));
    assert_eq!(flag_value(&descriptor.args, "--encoding"), Some("signed-integer"));
    assert_eq!(flag_value(&descriptor.args, "--bits"), Some("16"));
    assert_eq!(flag_value(&descriptor.args, "--type"), Some("wav"));
    assert_eq!(descriptor.args.last().map(String::as_str), Some("-"));
}

#[test]
fn test_no_silence_arguments_by_default() {
    let descriptor = sox_command(&RecordingOptions::default());
    assert!(!descriptor.args.iter().any(|a| a == "silence"));
}

#[test]
fn test_silence_arguments_render_thresholds_as_percentages() {
    let options = RecordingOptions {
        sample_rate: 8000,
        channels: 1,
        audio_type: AudioType::Wav,
        end_on_silence: true,
        silence: 2.0,
        threshold_start: Some(0.3),
        threshold_end: Some(0.4),
        ..Default::default()
    };

    let descriptor = sox_command(&options);

    assert_eq!(flag_value(&descriptor.args, "--rate"), Some("8000"));
    assert_eq!(flag_value(&descriptor.args, "--channels"), Some("1"));
    assert_eq!(flag_value(&descriptor.args, "--type"), Some("wav"));

    let tail: Vec<&str> = descriptor
        .args
        .iter()
        .skip_while(|a| *a != "silence")
        .map(String::as_str)
        .collect();
    assert_eq!(tail, ["silence", "1", "0.1", "30%", "1", "2", "40%"]);
}

#[test]
fn test_silence_thresholds_default_to_fifty_percent() {
    let options = RecordingOptions {
        end_on_silence: true,
        ..Default::default()
    };

    let descriptor = sox_command(&options);
    let tail: Vec<&str> = descriptor
        .args
        .iter()
        .skip_while(|a| *a != "silence")
        .map(String::as_str)
        .collect();
    assert_eq!(tail, ["silence", "1", "0.1", "50%", "1", "1", "50%"]);
}

#[test]
fn test_registry_resolves_sox_by_default() {
    let descriptor = resolve_backend("sox", &RecordingOptions::default()).unwrap();
    assert_eq!(descriptor.command, "sox");
    assert!(!descriptor.args.is_empty());
}

#[test]
fn test_unknown_backend_fails_resolution() {
    let err = resolve_backend("nonexistent", &RecordingOptions::default()).unwrap_err();
    assert_eq!(err, BackendError::UnknownBackend("nonexistent".to_string()));
}

#[test]
fn test_registered_backend_resolves() {
    fn fake_builder(options: &RecordingOptions) -> BackendDescriptor {
        BackendDescriptor {
            command: "fakerec".to_string(),
            args: vec!["--rate".to_string(), options.sample_rate.to_string()],
        }
    }

    register_backend("fakerec", fake_builder);

    let descriptor = resolve_backend("fakerec", &RecordingOptions::default()).unwrap();
    assert_eq!(descriptor.command, "fakerec");
    assert_eq!(descriptor.args, vec!["--rate", "16000"]);
}

#[test]
fn test_incomplete_descriptor_is_rejected() {
    fn broken_builder(_options: &RecordingOptions) -> BackendDescriptor {
        BackendDescriptor {
            command: String::new(),
            args: Vec::new(),
        }
    }

    register_backend("broken", broken_builder);

    let err = resolve_backend("broken", &RecordingOptions::default()).unwrap_err();
    assert_eq!(err, BackendError::InvalidDescriptor("broken".to_string()));
}

#[test]
fn test_options_deserialize_over_defaults() {
    let options: RecordingOptions = toml_like(
        r#"{"sample_rate": 8000, "end_on_silence": true, "audio_type": "mp3"}"#,
    );

    assert_eq!(options.sample_rate, 8000);
    assert!(options.end_on_silence);
    assert_eq!(options.audio_type, AudioType::Mp3);
    // Untouched fields keep their documented defaults.
    assert_eq!(options.channels, 1);
    assert_eq!(options.backend, "sox");
    assert_eq!(options.silence, 1.0);
}

fn toml_like(json: &str) -> RecordingOptions {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(json, config::FileFormat::Json))
        .build()
        .unwrap();
    settings.try_deserialize().unwrap()
}
