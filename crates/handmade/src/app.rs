//! # Application Context and Frame Loop
//!
//! One frame:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. POLL EVENTS          quit, resize, focus, gamepad plug/unplug    │
//! │ 2. BEGIN INPUT FRAME    copy last frame forward, clear transitions  │
//! │ 3. POLL DEVICES         keyboard slot, then each gamepad slot       │
//! │ 4. UPDATE GAME          state in permanent memory, draws the buffer │
//! │ 5. QUEUE AUDIO          top the device queue up to target latency   │
//! │ 6. PRESENT              hand the buffer to the platform             │
//! │ 7. END INPUT FRAME      swap, current becomes previous              │
//! │ 8. RECORD STATS                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Between frames the loop may check the config file for changes and sleep
//! out the rest of the frame budget.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use handmade_core::input::{process_gamepad, process_keyboard, KeyboardState, MAX_GAMEPADS};
use handmade_core::{last_modified, GameMemory, InputFrames};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::game::{output_sound, Game, GameState};
use crate::platform::{Platform, PlatformEvent};
use crate::render::OffscreenBuffer;
use crate::sound::{frames_to_queue, AudioSettings, ToneGenerator};

/// Config file being watched for changes.
#[derive(Debug, Clone)]
struct ConfigWatch {
    path: PathBuf,
    last_modified: i64,
}

/// Everything the loop owns. No globals.
///
/// The platform is the last field so it drops after game memory.
pub struct App<P: Platform> {
    config: AppConfig,
    audio: AudioSettings,
    memory: GameMemory,
    input: InputFrames,
    buffer: OffscreenBuffer,
    tone: ToneGenerator,
    game: Game,
    events: Vec<PlatformEvent>,
    running: bool,
    focused: bool,
    frame_count: u64,
    last_frame_time: Instant,
    watch: Option<ConfigWatch>,
    stats: FrameStatsAccumulator,
    platform: P,
}

impl<P: Platform> App<P> {
    /// Reserves game memory and the back buffer.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid or memory cannot be reserved.
    pub fn new(platform: P, config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let memory = GameMemory::create(
            config.memory.permanent_bytes(),
            config.memory.transient_bytes(),
        )?;
        let buffer = OffscreenBuffer::new(config.window.width, config.window.height);

        tracing::info!(
            title = %config.window.title,
            width = config.window.width,
            height = config.window.height,
            target_fps = config.frame.target_fps,
            "application ready"
        );

        Ok(Self {
            audio: AudioSettings::from_config(&config.audio),
            game: Game::new(config.audio.tone_hz),
            stats: FrameStatsAccumulator::new(config.frame.target_fps),
            config,
            memory,
            input: InputFrames::new(),
            buffer,
            tone: ToneGenerator::new(),
            events: Vec::new(),
            running: true,
            focused: true,
            frame_count: 0,
            last_frame_time: Instant::now(),
            watch: None,
            platform,
        })
    }

    /// Reloads tuning values from `path` whenever its modification time
    /// passes `last_modified`.
    pub fn watch_config(&mut self, path: impl Into<PathBuf>, last_modified: i64) {
        self.watch = Some(ConfigWatch {
            path: path.into(),
            last_modified,
        });
    }

    /// Runs frames until something asks to quit.
    ///
    /// # Errors
    ///
    /// Stops at the first frame that fails.
    pub fn run(&mut self) -> AppResult<()> {
        tracing::info!("entering frame loop");

        while self.running {
            let frame_start = Instant::now();
            self.run_frame()?;

            let every = u64::from(self.config.frame.reload_check_frames);
            if every > 0 && self.frame_count % every == 0 {
                self.reload_config_if_changed();
            }
            if self.config.frame.pace {
                self.pace(frame_start);
            }
        }

        tracing::info!(frames = self.frame_count, "frame loop finished");
        Ok(())
    }

    /// Runs one frame.
    ///
    /// # Errors
    ///
    /// Fails if transient memory runs out or the platform rejects audio or
    /// the frame.
    pub fn run_frame(&mut self) -> AppResult<FrameStats> {
        let frame_start = Instant::now();
        self.last_frame_time = frame_start;

        let mut events = std::mem::take(&mut self.events);
        events.clear();
        self.platform.poll_events(&mut events);

        self.input.begin_frame();
        self.memory.begin_frame();
        for &event in &events {
            self.handle_event(event);
        }
        #[allow(clippy::cast_possible_truncation)]
        let events_processed = events.len() as u32;
        self.events = events;

        self.poll_devices();
        let input_done = Instant::now();

        let output =
            self.game
                .update_and_render(&mut self.memory, self.input.current(), &mut self.buffer)?;
        if output.quit_requested {
            self.running = false;
        }
        let update_done = Instant::now();

        let frames = frames_to_queue(&self.audio, self.platform.queued_audio_frames());
        if frames > 0 {
            let scratch = self
                .memory
                .transient
                .alloc::<f32>(frames * usize::from(self.audio.channels))?;
            let samples = self.memory.transient.slice_mut(&scratch)?;
            output_sound(output.tone_hz, &mut self.tone, &self.audio, samples);
            self.platform.queue_audio(samples)?;
        }
        let audio_done = Instant::now();

        self.platform.present(&self.buffer)?;
        self.input.end_frame();
        let present_done = Instant::now();

        let stats = FrameStats {
            total_us: micros(present_done - frame_start),
            input_us: micros(input_done - frame_start),
            update_us: micros(update_done - input_done),
            audio_us: micros(audio_done - update_done),
            present_us: micros(present_done - audio_done),
            frame: self.frame_count,
            events_processed,
        };
        self.end_frame(stats);
        Ok(stats)
    }

    fn poll_devices(&mut self) {
        let keys = if self.focused {
            self.platform.keyboard()
        } else {
            KeyboardState::default()
        };
        let deadzone = self.config.input.stick_deadzone;

        let (previous, current) = self.input.split_mut();
        process_keyboard(current.keyboard_mut(), previous.keyboard(), &keys);

        for slot in 0..MAX_GAMEPADS {
            let Some(pad) = self.platform.gamepad(slot) else {
                continue;
            };
            let old = previous.gamepad(slot).copied().unwrap_or_default();
            if let Some(new) = current.gamepad_mut(slot) {
                process_gamepad(new, &old, &pad, deadzone);
            }
        }
    }

    fn handle_event(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Quit => {
                tracing::info!("quit requested by platform");
                self.running = false;
            }
            PlatformEvent::Resized { width, height } => {
                tracing::debug!(width, height, "back buffer resized");
                self.buffer.resize(width, height);
            }
            PlatformEvent::FocusChanged(focused) => {
                tracing::debug!(focused, "focus changed");
                self.focused = focused;
            }
            PlatformEvent::GamepadAdded { slot } => {
                tracing::info!(slot, "gamepad connected");
            }
            PlatformEvent::GamepadRemoved { slot } => {
                tracing::info!(slot, "gamepad disconnected");
                if let Some(controller) = self.input.current_mut().gamepad_mut(slot) {
                    controller.disconnect();
                }
            }
        }
    }

    fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats.record(stats);

        if self.config.frame.enable_timing_logs && stats.total_us > self.stats.budget_us() {
            tracing::warn!(
                frame = stats.frame,
                total_us = stats.total_us,
                budget_us = self.stats.budget_us(),
                "frame exceeded budget"
            );
        }
    }

    /// Reloads the watched config if its file changed. Returns true when
    /// new values were applied.
    ///
    /// Only tuning values take effect: tone, volume, dead zone and frame
    /// settings. Memory and window sizes stay as they were.
    pub fn reload_config_if_changed(&mut self) -> bool {
        let Some(watch) = self.watch.as_mut() else {
            return false;
        };

        let modified = match last_modified(&watch.path) {
            Ok(modified) => modified,
            Err(err) => {
                tracing::debug!(error = %err, "config not readable, skipping reload");
                return false;
            }
        };
        if modified <= watch.last_modified {
            return false;
        }
        watch.last_modified = modified;
        let path = watch.path.clone();

        match AppConfig::load(&path, &mut self.memory.transient) {
            Ok((config, _)) => {
                self.apply_reload(config);
                tracing::info!(path = %path.display(), "config reloaded");
                true
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "config reload failed, keeping old values");
                false
            }
        }
    }

    fn apply_reload(&mut self, config: AppConfig) {
        self.audio = AudioSettings::from_config(&config.audio);
        self.game.set_base_tone_hz(config.audio.tone_hz);
        self.stats.set_target_fps(config.frame.target_fps);

        self.config.audio = config.audio;
        self.config.input = config.input;
        self.config.frame = config.frame;
    }

    fn pace(&self, frame_start: Instant) {
        let budget = Duration::from_secs(1) / self.config.frame.target_fps.max(1);
        let elapsed = frame_start.elapsed();
        if elapsed < budget {
            std::thread::sleep(budget - elapsed);
        }
    }

    /// Returns true until something asks to quit.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Returns true while the window has focus.
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Frames completed.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Config in effect.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Game memory.
    #[must_use]
    pub const fn memory(&self) -> &GameMemory {
        &self.memory
    }

    /// Input frames.
    #[must_use]
    pub const fn input(&self) -> &InputFrames {
        &self.input
    }

    /// The back buffer.
    #[must_use]
    pub const fn buffer(&self) -> &OffscreenBuffer {
        &self.buffer
    }

    /// The game state, once the first frame has run.
    #[must_use]
    pub fn game_state(&self) -> Option<GameState> {
        self.game.state(&self.memory)
    }

    /// Accumulated frame statistics.
    #[must_use]
    pub const fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }

    /// The platform.
    #[must_use]
    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// The platform, for writing.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Event and device polling time in microseconds.
    pub input_us: u64,
    /// Game update and draw time in microseconds.
    pub update_us: u64,
    /// Sound generation time in microseconds.
    pub audio_us: u64,
    /// Present time in microseconds.
    pub present_us: u64,
    /// Frame number.
    pub frame: u64,
    /// Platform events handled this frame.
    pub events_processed: u32,
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of input times.
    pub input_us_sum: u64,
    /// Sum of update times.
    pub update_us_sum: u64,
    /// Sum of audio times.
    pub audio_us_sum: u64,
    /// Sum of present times.
    pub present_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
    target_fps: u32,
}

impl FrameStatsAccumulator {
    /// Creates an accumulator that budgets for `target_fps`.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            input_us_sum: 0,
            update_us_sum: 0,
            audio_us_sum: 0,
            present_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            target_fps: target_fps.max(1),
        }
    }

    /// Frame budget in microseconds.
    #[must_use]
    pub fn budget_us(&self) -> u64 {
        1_000_000 / u64::from(self.target_fps)
    }

    /// Changes the budget for frames recorded from now on.
    pub fn set_target_fps(&mut self, target_fps: u32) {
        self.target_fps = target_fps.max(1);
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.input_us_sum += stats.input_us;
        self.update_us_sum += stats.update_us;
        self.audio_us_sum += stats.audio_us;
        self.present_us_sum += stats.present_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        if stats.total_us > self.budget_us() {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Prints a summary of the statistics.
    #[allow(clippy::cast_precision_loss)]
    pub fn print_summary(&self) {
        let min_us = if self.frames_recorded == 0 { 0 } else { self.min_frame_us };

        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    FRAME STATISTICS SUMMARY                      ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ─────────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!("│ Average Frame:      {:.3} ms ({:.1} FPS)", self.avg_frame_ms(), self.avg_fps());
        println!("│ Min Frame:          {:.3} ms", min_us as f64 / 1000.0);
        println!("│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ BUDGET ─────────────────────────────────────────────────────────┐");
        println!(
            "│ Target:             {:.3} ms ({} FPS)",
            self.budget_us() as f64 / 1000.0,
            self.target_fps
        );
        println!(
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("└──────────────────────────────────────────────────────────────────┘");

        if self.frames_recorded > 0 {
            let avg = |sum: u64| (sum as f64 / self.frames_recorded as f64) / 1000.0;
            println!();
            println!("┌─ BREAKDOWN ──────────────────────────────────────────────────────┐");
            println!("│ Input:              {:.3} ms", avg(self.input_us_sum));
            println!("│ Update:             {:.3} ms", avg(self.update_us_sum));
            println!("│ Audio:              {:.3} ms", avg(self.audio_us_sum));
            println!("│ Present:            {:.3} ms", avg(self.present_us_sum));
            println!("└──────────────────────────────────────────────────────────────────┘");
        }
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new(crate::constants::TARGET_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MemoryConfig, WindowConfig};
    use crate::platform::{ScriptStep, ScriptedPlatform};
    use handmade_core::input::{Button, GamepadState, Key};

    fn small_config() -> AppConfig {
        AppConfig {
            memory: MemoryConfig {
                permanent_mb: 1,
                transient_mb: 1,
            },
            window: WindowConfig {
                width: 32,
                height: 16,
                ..WindowConfig::default()
            },
            ..AppConfig::default()
        }
    }

    fn hold(frames: u32, keys: &[Key]) -> ScriptStep {
        ScriptStep {
            frames,
            keys: KeyboardState::from_keys(keys),
            gamepad: None,
        }
    }

    fn app(steps: Vec<ScriptStep>) -> App<ScriptedPlatform> {
        App::new(ScriptedPlatform::new(steps, 2, 800), small_config()).unwrap()
    }

    #[test]
    fn test_app_creation() {
        let app = app(Vec::new());
        assert_eq!(app.frame_count(), 0);
        assert!(app.is_running());
        assert!(app.game_state().is_none());
        assert_eq!(app.buffer().width(), 32);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AppConfig {
            memory: MemoryConfig {
                permanent_mb: 0,
                transient_mb: 1,
            },
            ..AppConfig::default()
        };
        assert!(App::new(ScriptedPlatform::new(Vec::new(), 2, 0), config).is_err());
    }

    #[test]
    fn test_frame_cycle() {
        let mut app = app(vec![hold(2, &[Key::D])]);

        let stats = app.run_frame().unwrap();
        assert_eq!(stats.frame, 0);
        assert_eq!(app.frame_count(), 1);
        assert_eq!(app.platform().present_count(), 1);
        assert_eq!(app.input().frame_count(), 1);

        // Queue filled to 100 ms at 48 kHz on the first frame
        assert_eq!(app.platform().total_queued_frames(), 4_800);
        assert_eq!(app.memory().transient.used(), 4_800 * 2 * 4);

        app.run_frame().unwrap();
        // Device drained 800 frames, loop topped it back up
        assert_eq!(app.platform().total_queued_frames(), 5_600);
        assert_eq!(app.game_state().unwrap().blue_offset, 2);
    }

    #[test]
    fn test_run_until_script_ends() {
        let mut app = app(vec![hold(5, &[Key::S])]);
        app.run().unwrap();

        assert!(!app.is_running());
        assert_eq!(app.frame_count(), 6, "five scripted frames and the quit frame");
        assert_eq!(app.game_state().unwrap().green_offset, 5);
        assert_eq!(app.stats().frames_recorded, 6);
    }

    #[test]
    fn test_escape_quits() {
        let mut app = app(vec![hold(3, &[]), hold(1, &[Key::Escape]), hold(10, &[])]);
        app.run().unwrap();
        assert_eq!(app.frame_count(), 4);
    }

    #[test]
    fn test_resize_and_focus_events() {
        let mut app = app(vec![hold(3, &[Key::D])]);
        app.platform_mut().push_event(PlatformEvent::Resized {
            width: 8,
            height: 4,
        });
        app.platform_mut().push_event(PlatformEvent::FocusChanged(false));

        app.run_frame().unwrap();
        assert_eq!(app.buffer().pixels().len(), 32);
        assert_eq!(app.platform().last_frame().width(), 8);
        assert!(!app.is_focused());
        // Keys are ignored without focus
        assert_eq!(app.game_state().unwrap().blue_offset, 0);

        app.platform_mut().push_event(PlatformEvent::FocusChanged(true));
        app.run_frame().unwrap();
        assert_eq!(app.game_state().unwrap().blue_offset, 1);
    }

    #[test]
    fn test_gamepad_removed_releases_buttons() {
        let pad = GamepadState::default().with_button(Button::ActionDown);
        let mut app = app(vec![
            ScriptStep {
                frames: 1,
                gamepad: Some((1, pad)),
                ..ScriptStep::default()
            },
            hold(1, &[]),
        ]);

        app.run_frame().unwrap();
        let pad_input = app.input().previous().gamepad(1).copied().unwrap();
        assert!(pad_input.is_connected);
        assert!(pad_input.button(Button::ActionDown).was_pressed());

        app.run_frame().unwrap();
        let pad_input = app.input().previous().gamepad(1).copied().unwrap();
        assert!(!pad_input.is_connected);
        assert!(!pad_input.button(Button::ActionDown).is_down());
        assert!(pad_input.button(Button::ActionDown).was_released());
    }

    #[test]
    fn test_hot_reload_applies_tuning() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("handmade_reload_{id}.toml"));
        handmade_core::write_file(&path, b"[audio]\ntone_hz = 300.0\nvolume = 0.5\n").unwrap();

        let mut app = app(Vec::new());
        assert!(!app.reload_config_if_changed(), "nothing watched");

        app.watch_config(&path, 0);
        assert!(app.reload_config_if_changed());
        assert!((app.config().audio.tone_hz - 300.0).abs() < f32::EPSILON);
        assert!((app.config().audio.volume - 0.5).abs() < f32::EPSILON);
        assert!(!app.reload_config_if_changed(), "unchanged file");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_hot_reload_sees_same_second_edit() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("handmade_reload_subsec_{id}.toml"));
        let base = std::time::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        let set_mtime = |time| {
            std::fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(time)
                .unwrap();
        };

        handmade_core::write_file(&path, b"[audio]\ntone_hz = 300.0\n").unwrap();
        set_mtime(base);
        let mut app = app(Vec::new());
        app.watch_config(&path, last_modified(&path).unwrap());
        assert!(!app.reload_config_if_changed(), "unchanged file");

        handmade_core::write_file(&path, b"[audio]\ntone_hz = 320.0\n").unwrap();
        set_mtime(base + Duration::from_millis(500));
        assert!(app.reload_config_if_changed());
        assert!((app.config().audio.tone_hz - 320.0).abs() < f32::EPSILON);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_stats_accumulator() {
        let mut stats = FrameStatsAccumulator::new(100);
        assert_eq!(stats.budget_us(), 10_000);
        assert!(stats.avg_frame_ms().abs() < f64::EPSILON);

        for total_us in [5_000, 15_000] {
            stats.record(FrameStats {
                total_us,
                ..FrameStats::default()
            });
        }
        assert_eq!(stats.frames_recorded, 2);
        assert_eq!(stats.min_frame_us, 5_000);
        assert_eq!(stats.max_frame_us, 15_000);
        assert_eq!(stats.frames_over_budget, 1);
        assert!((stats.avg_frame_ms() - 10.0).abs() < 1e-9);
        assert!((stats.avg_fps() - 100.0).abs() < 1e-9);
        assert!((stats.over_budget_ratio() - 0.5).abs() < 1e-9);
    }
}
