//! End-to-end runs of the frame loop on the scripted platform.

use handmade::render::encode_ppm;
use handmade::{App, AppConfig, AudioSettings, ScriptedPlatform};
use handmade_core::{kilobytes, read_entire_file, write_file, Arena};

fn small_config(extra: &str) -> AppConfig {
    let text = format!(
        "[memory]\npermanent_mb = 1\ntransient_mb = 1\n\n[window]\nwidth = 64\nheight = 32\n\n{extra}"
    );
    AppConfig::from_toml_str(&text).unwrap()
}

fn app_for(config: AppConfig) -> App<ScriptedPlatform> {
    let platform = ScriptedPlatform::from_config(
        &config.headless,
        &AudioSettings::from_config(&config.audio),
        config.frame.target_fps,
    )
    .unwrap();
    App::new(platform, config).unwrap()
}

#[test]
fn test_default_script_moves_gradient_and_quits_on_escape() {
    let mut app = app_for(small_config(""));
    app.run().unwrap();

    // 60 frames right, 30 down, 30 idle, then Escape
    assert_eq!(app.frame_count(), 121);
    assert!(!app.platform().is_finished(), "quit came from Escape, not the script end");

    let state = app.game_state().unwrap();
    assert_eq!(state.blue_offset, 60);
    assert_eq!(state.green_offset, 30);

    let frame = app.platform().last_frame();
    assert_eq!(frame.pixel(0, 0), Some((30 << 8) | 60));
    assert_eq!(frame.pixel(4, 2), Some((32 << 8) | 64));
}

#[test]
fn test_audio_keeps_pace_with_device() {
    let mut app = app_for(small_config(
        "[[headless.script]]\nframes = 10\nkeys = []\n",
    ));
    app.run().unwrap();

    // One full queue up front, then one frame's worth per frame
    let frames = usize::try_from(app.frame_count()).unwrap();
    assert_eq!(
        app.platform().total_queued_frames(),
        4_800 + (frames - 1) * 800
    );
}

#[test]
fn test_analog_stick_script() {
    let mut app = app_for(small_config(
        r#"
        [[headless.script]]
        frames = 4
        gamepad = { slot = 0, stick_x = 32767, stick_y = 32767 }

        [[headless.script]]
        frames = 1
        gamepad = { slot = 0, buttons = ["start"] }
        "#,
    ));
    app.run().unwrap();

    assert_eq!(app.frame_count(), 5);
    let state = app.game_state().unwrap();
    assert_eq!(state.blue_offset, 16);
    // Stick pulled fully down lowers the tone by 128 Hz
    assert!((state.tone_hz - (440.0 - 128.0)).abs() < 1e-3);
}

#[test]
fn test_snapshot_round_trip_through_arena() {
    let mut app = app_for(small_config(
        "[[headless.script]]\nframes = 3\nkeys = [\"D\"]\n",
    ));
    app.run().unwrap();

    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("handmade_snapshot_{id}.ppm"));
    let ppm = encode_ppm(app.platform().last_frame());
    write_file(&path, &ppm).unwrap();

    let mut arena = Arena::create(kilobytes(16)).unwrap();
    let file = read_entire_file(&path, &mut arena).unwrap();
    assert_eq!(file.size, ppm.len());
    assert_eq!(arena.bytes(&file.bytes).unwrap(), ppm.as_slice());
    assert!(ppm.starts_with(b"P6\n64 32\n255\n"));

    std::fs::remove_file(&path).ok();
}
