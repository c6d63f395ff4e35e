use super::*;
use std::io::Cursor;

#[test]
fn defaults_are_valid() {
    let opts = BakeOpts::default();
    opts.validate().unwrap();
    assert_eq!(opts.frame_budget(), 36_000);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let opts = BakeOpts::from_reader(Cursor::new(r#"{ "max_length_secs": 2.0 }"#)).unwrap();
    assert_eq!(opts.max_length_secs, 2.0);
    assert_eq!(opts.fps, Fps { num: 60, den: 1 });
    assert_eq!(opts.sample_rate, 44_100);
}

#[test]
fn budget_rounds_to_nearest_frame() {
    let opts = BakeOpts {
        fps: Fps { num: 30, den: 1 },
        max_length_secs: 0.51,
        ..BakeOpts::default()
    };
    assert_eq!(opts.frame_budget(), 15);

    let ntsc = BakeOpts {
        fps: Fps {
            num: 30_000,
            den: 1_001,
        },
        max_length_secs: 1.0,
        ..BakeOpts::default()
    };
    assert_eq!(ntsc.frame_budget(), 30);
}

#[test]
fn rejects_bad_values() {
    let bad = [
        r#"{ "fps": { "num": 0, "den": 1 } }"#,
        r#"{ "fps": { "num": 30, "den": 0 } }"#,
        r#"{ "max_length_secs": -1.0 }"#,
        r#"{ "sample_rate": 0 }"#,
        r#"{ "channels": 0 }"#,
        r#"{ "channels": 9 }"#,
    ];
    for json in bad {
        let err = BakeOpts::from_reader(Cursor::new(json)).unwrap_err();
        assert!(matches!(err, WavyteError::Validation(_)), "{json}: {err}");
    }
}

#[test]
fn malformed_json_is_a_serde_error() {
    for json in [r#"{ "fps": 30 }"#, "not json"] {
        let err = BakeOpts::from_reader(Cursor::new(json)).unwrap_err();
        assert!(matches!(err, WavyteError::Serde(_)), "{json}: {err}");
    }
}

#[test]
fn from_path_reports_missing_file() {
    let err = BakeOpts::from_path("/nonexistent/bake-opts.json").unwrap_err();
    assert!(err.to_string().contains("open bake options"));
}
