use super::*;
use std::sync::Arc;

fn track(len_secs: f64) -> SoundTrack {
    create_track(4, 2, len_secs).unwrap()
}

#[test]
fn create_track_rounds_length() {
    let t = create_track(44_100, 2, 1.5).unwrap();
    assert_eq!(t.len(), 66_150);
    assert_eq!(t.channel_count(), 2);
    assert!(t.channel(0).unwrap().iter().all(|&s| s == 0));

    assert!(create_track(0, 2, 1.0).is_err());
    assert!(create_track(44_100, 0, 1.0).is_err());
    assert!(create_track(44_100, 2, -1.0).is_err());
    assert_eq!(create_track(44_100, 1, 0.0).unwrap().len(), 0);
}

#[test]
fn two_full_scale_samples_saturate_instead_of_wrapping() {
    let mut t = track(1.0);
    let loud = SoundSample::mono("loud", 4, vec![i16::MAX; 4]).unwrap();
    mix_sample(&mut t, &loud, 0.0, 1.0);
    mix_sample(&mut t, &loud, 0.0, 1.0);
    assert!(t.channel(0).unwrap().iter().all(|&s| s == i16::MAX));

    let quiet = SoundSample::mono("neg", 4, vec![i16::MIN; 4]).unwrap();
    let mut t = track(1.0);
    mix_sample(&mut t, &quiet, 0.0, 1.0);
    mix_sample(&mut t, &quiet, 0.0, 1.0);
    assert!(t.channel(1).unwrap().iter().all(|&s| s == i16::MIN));
}

#[test]
fn trigger_at_or_after_end_leaves_track_untouched() {
    let mut t = track(1.0);
    let before = t.clone();
    let s = SoundSample::mono("s", 4, vec![1000; 4]).unwrap();
    mix_sample(&mut t, &s, 1.0, 1.0);
    mix_sample(&mut t, &s, 5.0, 1.0);
    mix_sample(&mut t, &s, f64::INFINITY, 1.0);
    assert_eq!(t, before);
}

#[test]
fn only_overlap_is_mixed() {
    let mut t = track(1.0);
    let s = SoundSample::mono("s", 4, vec![10, 20, 30, 40]).unwrap();
    mix_sample(&mut t, &s, 0.5, 1.0);
    assert_eq!(t.channel(0).unwrap(), &[0, 0, 10, 20]);
}

#[test]
fn volume_is_rounded_per_sample() {
    let mut t = track(1.0);
    let s = SoundSample::mono("s", 4, vec![3, 5, -3, 100]).unwrap();
    mix_sample(&mut t, &s, 0.0, 0.5);
    // round-half-away-from-zero: 1.5 -> 2, 2.5 -> 3, -1.5 -> -2
    assert_eq!(t.channel(0).unwrap(), &[2, 3, -2, 50]);
}

#[test]
fn mono_sample_feeds_every_channel_and_stereo_stays_separate() {
    let mut t = track(1.0);
    let mono = SoundSample::mono("m", 4, vec![7; 4]).unwrap();
    mix_sample(&mut t, &mono, 0.0, 1.0);
    assert_eq!(t.channel(0), t.channel(1));

    let mut t = track(1.0);
    let stereo = SoundSample::new("st", 4, vec![vec![1; 4], vec![-1; 4]]).unwrap();
    mix_sample(&mut t, &stereo, 0.0, 1.0);
    assert_eq!(t.channel(0).unwrap(), &[1, 1, 1, 1]);
    assert_eq!(t.channel(1).unwrap(), &[-1, -1, -1, -1]);
    assert_eq!(t.interleaved(), vec![1, -1, 1, -1, 1, -1, 1, -1]);
}

#[test]
fn foreign_rate_is_mixed_without_resampling() {
    let mut t = track(1.0);
    let s = SoundSample::mono("fast", 8, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    mix_sample(&mut t, &s, 0.0, 1.0);
    assert_eq!(t.channel(0).unwrap(), &[1, 2, 3, 4]);
}

#[test]
fn mix_sound_commands_skips_other_commands() {
    let mut t = track(1.0);
    let s = Arc::new(SoundSample::mono("s", 4, vec![5; 2]).unwrap());
    let cmds = vec![
        Command {
            time: 0.0,
            kind: CommandKind::End,
        },
        Command {
            time: 0.25,
            kind: CommandKind::PlaySound {
                sample: s.clone(),
                volume: 2.0,
            },
        },
    ];
    assert_eq!(mix_sound_commands(&mut t, &cmds), 1);
    assert_eq!(t.channel(0).unwrap(), &[0, 10, 10, 0]);
}

#[test]
fn sample_validation() {
    assert!(SoundSample::new("x", 4, vec![]).is_err());
    assert!(SoundSample::new("x", 4, vec![vec![1], vec![1, 2]]).is_err());
    assert!(SoundSample::mono("x", 0, vec![1]).is_err());
    let tone = SoundSample::sine("tone", 8, 1.0, 1.0, 1000).unwrap();
    assert_eq!(tone.len(), 8);
    assert_eq!(tone.channel(0)[0], 0);
    assert_eq!(tone.channel(0)[2], 1000);
}
