//! TK2000 II emulator binary.
//!
//! Runs the machine with a winit window and pixels framebuffer, or in
//! headless mode for screenshots and scripted runs.

#![allow(clippy::cast_possible_truncation)]

use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use pixels::{Pixels, SurfaceTexture};
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapRb,
};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use emu_tk2000::{
    capture, keyboard_map, AudioSink, Ct2File, KeyStroke, MachineEvent, Tk2000, Tk2000Config,
    BATCH_MILLIS, SAMPLE_RATE,
};

/// Framebuffer dimensions.
const FB_WIDTH: u32 = emu_tk2000::video::DISPLAY_WIDTH;
const FB_HEIGHT: u32 = emu_tk2000::video::DISPLAY_HEIGHT;

/// Window scale factor.
const SCALE: u32 = 2;

/// Wall-clock pacing for one emulation batch (~10 Hz).
const BATCH_DURATION: Duration = Duration::from_millis(BATCH_MILLIS);

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

struct CliArgs {
    rom_path: Option<PathBuf>,
    tape_path: Option<PathBuf>,
    headless: bool,
    frames: u32,
    screenshot_path: Option<PathBuf>,
    type_text: Option<String>,
    type_at: u64,
    play_at: Option<u64>,
    color: bool,
    no_sound: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        rom_path: None,
        tape_path: None,
        headless: false,
        frames: 100,
        screenshot_path: None,
        type_text: None,
        type_at: 20,
        play_at: None,
        color: false,
        no_sound: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rom" => {
                i += 1;
                cli.rom_path = args.get(i).map(PathBuf::from);
            }
            "--tape" => {
                i += 1;
                cli.tape_path = args.get(i).map(PathBuf::from);
            }
            "--headless" => {
                cli.headless = true;
            }
            "--frames" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.frames = s.parse().unwrap_or(100);
                }
            }
            "--screenshot" => {
                i += 1;
                cli.screenshot_path = args.get(i).map(PathBuf::from);
            }
            "--type" => {
                i += 1;
                cli.type_text = args.get(i).cloned();
            }
            "--type-at" => {
                i += 1;
                if let Some(s) = args.get(i) {
                    cli.type_at = s.parse().unwrap_or(20);
                }
            }
            "--play-at" => {
                i += 1;
                cli.play_at = args.get(i).and_then(|s| s.parse().ok());
            }
            "--color" => {
                cli.color = true;
            }
            "--no-sound" => {
                cli.no_sound = true;
            }
            "--help" | "-h" => {
                eprintln!("Usage: emu-tk2000 [OPTIONS]");
                eprintln!();
                eprintln!("Options:");
                eprintln!("  --rom <file>         System ROM image [default: roms/tk2000.rom]");
                eprintln!("  --tape <file>        Insert a .ct2 cassette image");
                eprintln!("  --headless           Run without a window");
                eprintln!("  --frames <n>         Batches to run in headless mode [default: 100]");
                eprintln!("  --screenshot <file>  Save a PNG screenshot (headless)");
                eprintln!("  --type <text>        Type text into the machine (\\n for Enter)");
                eprintln!("  --type-at <batch>    Batch at which typing starts [default: 20]");
                eprintln!("  --play-at <batch>    Batch at which tape Play is pressed");
                eprintln!("  --color              Start in color mode instead of mono");
                eprintln!("  --no-sound           Do not open the host audio device");
                eprintln!();
                eprintln!("Window keys: F2 tape play, F3 tape stop, F10 reset, Esc quit");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

// ---------------------------------------------------------------------------
// Host audio sink (cpal + ring buffer)
// ---------------------------------------------------------------------------

/// Speaker sink backed by a cpal output stream.
///
/// The emulation thread pushes 8-bit segments into a ring buffer; the
/// audio callback drains it, playing silence on underrun.
struct CpalAudio {
    _stream: Stream,
    producer: ringbuf::HeapProd<f32>,
}

impl CpalAudio {
    /// Open the default output device at the speaker sample rate.
    fn new() -> Result<Self, String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| "no audio output device".to_string())?;

        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        // One second of buffer, a quarter pre-filled against startup
        // underrun.
        let ring = HeapRb::<f32>::new(SAMPLE_RATE as usize);
        let (mut producer, mut consumer) = ring.split();
        for _ in 0..SAMPLE_RATE as usize / 4 {
            let _ = producer.try_push(0.0);
        }

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for sample in data.iter_mut() {
                        *sample = consumer.try_pop().unwrap_or(0.0);
                    }
                },
                |err| eprintln!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| e.to_string())?;
        stream.play().map_err(|e| e.to_string())?;

        Ok(Self {
            _stream: stream,
            producer,
        })
    }
}

impl AudioSink for CpalAudio {
    fn push(&mut self, samples: &[u8]) {
        for &sample in samples {
            let value = f32::from(sample) / 127.0;
            // Blocking here back-pressures the speaker, not the CPU
            // model; dropped pushes would click.
            while self.producer.try_push(value).is_err() {
                std::thread::yield_now();
            }
        }
    }
}

/// Open host audio and install it on the machine's speaker, degrading
/// to a silent machine when no device is available.
fn install_audio(machine: &mut Tk2000) {
    match CpalAudio::new() {
        Ok(sink) => machine.bus_mut().speaker.set_sink(Box::new(sink)),
        Err(err) => {
            eprintln!("audio unavailable: {err}");
            machine.bus_mut().speaker.set_error(err);
        }
    }
}

// ---------------------------------------------------------------------------
// Headless mode
// ---------------------------------------------------------------------------

fn run_headless(cli: &CliArgs) {
    let mut machine = make_machine(cli);

    for batch in 0..u64::from(cli.frames) {
        if cli.play_at == Some(batch) {
            machine.play_tape();
        }
        machine.run_batch();
        while let Some(event) = machine.poll_event() {
            if event == MachineEvent::TapeEnded {
                eprintln!("tape finished at batch {batch}");
            }
        }
    }

    if let Some(ref path) = cli.screenshot_path {
        if let Err(e) = capture::save_screenshot(&machine, path) {
            eprintln!("Screenshot error: {e}");
            process::exit(1);
        }
        eprintln!("Screenshot saved to {}", path.display());
    }
}

// ---------------------------------------------------------------------------
// Windowed mode (winit + pixels)
// ---------------------------------------------------------------------------

struct App {
    machine: Tk2000,
    play_at: Option<u64>,
    batch: u64,
    shift: bool,
    ctrl: bool,
    window: Option<&'static Window>,
    pixels: Option<Pixels<'static>>,
    last_batch_time: Instant,
}

impl App {
    fn new(machine: Tk2000, play_at: Option<u64>) -> Self {
        Self {
            machine,
            play_at,
            batch: 0,
            shift: false,
            ctrl: false,
            window: None,
            pixels: None,
            last_batch_time: Instant::now(),
        }
    }

    fn handle_key(&mut self, keycode: KeyCode, pressed: bool) {
        match keycode {
            KeyCode::F2 if pressed => {
                self.machine.play_tape();
                return;
            }
            KeyCode::F3 if pressed => {
                self.machine.stop_tape();
                return;
            }
            KeyCode::F10 if pressed => {
                self.machine.reset();
                return;
            }
            _ => {}
        }

        if let Some(key) = keyboard_map::map_keycode(keycode) {
            if pressed {
                self.machine.press_key(KeyStroke {
                    key,
                    shift: self.shift,
                    ctrl: self.ctrl,
                });
            } else {
                self.machine.release_key();
            }
        }
    }

    fn update_pixels(&mut self) {
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };

        let fb = self.machine.framebuffer();
        let frame = pixels.frame_mut();

        for (i, &rgb) in fb.iter().enumerate() {
            let offset = i * 4;
            frame[offset] = ((rgb >> 16) & 0xFF) as u8;
            frame[offset + 1] = ((rgb >> 8) & 0xFF) as u8;
            frame[offset + 2] = (rgb & 0xFF) as u8;
            frame[offset + 3] = 0xFF;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_size = winit::dpi::LogicalSize::new(FB_WIDTH * SCALE, FB_HEIGHT * SCALE);
        let attrs = WindowAttributes::default()
            .with_title("TK2000 II Color Computer")
            .with_inner_size(window_size)
            .with_resizable(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let window: &'static Window = Box::leak(Box::new(window));
                let inner = window.inner_size();
                let surface = SurfaceTexture::new(inner.width, inner.height, window);
                match Pixels::new(FB_WIDTH, FB_HEIGHT, surface) {
                    Ok(pixels) => {
                        self.pixels = Some(pixels);
                    }
                    Err(e) => {
                        eprintln!("Failed to create pixels: {e}");
                        event_loop.exit();
                        return;
                    }
                }
                self.window = Some(window);
            }
            Err(e) => {
                eprintln!("Failed to create window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift = modifiers.state().shift_key();
                self.ctrl = modifiers.state().control_key();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(keycode) = event.physical_key {
                    if keycode == KeyCode::Escape && event.state == ElementState::Pressed {
                        event_loop.exit();
                        return;
                    }
                    self.handle_key(keycode, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if now.duration_since(self.last_batch_time) >= BATCH_DURATION {
                    if self.play_at == Some(self.batch) {
                        self.machine.play_tape();
                    }
                    self.batch += 1;
                    self.machine.run_batch();
                    while let Some(event) = self.machine.poll_event() {
                        if event == MachineEvent::TapeEnded {
                            eprintln!("tape finished");
                        }
                    }
                    if self.machine.take_damage() {
                        self.update_pixels();
                    }
                    self.last_batch_time = now;
                }

                if let Some(pixels) = self.pixels.as_ref() {
                    if let Err(e) = pixels.render() {
                        eprintln!("Render error: {e}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window {
            window.request_redraw();
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load the ROM image, or exit with an error message.
fn load_rom(path: &Path) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Cannot read ROM at {}: {e}", path.display());
            eprintln!();
            eprintln!("Place the system ROM at roms/tk2000.rom (16384 bytes),");
            eprintln!("or pass --rom <file>.");
            process::exit(1);
        }
    }
}

/// Find the roms/ directory relative to the executable or current
/// directory.
fn find_roms_dir() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        // Walk up from target/debug or target/release to workspace root
        let mut dir = exe.parent().map(Path::to_path_buf);
        for _ in 0..5 {
            if let Some(ref d) = dir {
                let roms = d.join("roms");
                if roms.is_dir() {
                    return roms;
                }
                dir = d.parent().map(Path::to_path_buf);
            }
        }
    }
    PathBuf::from("roms")
}

fn make_machine(cli: &CliArgs) -> Tk2000 {
    let rom_path = cli
        .rom_path
        .clone()
        .unwrap_or_else(|| find_roms_dir().join("tk2000.rom"));
    let config = Tk2000Config {
        rom: load_rom(&rom_path),
    };

    let mut machine = match Tk2000::new(&config) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Failed to build machine: {e}");
            process::exit(1);
        }
    };

    if let Some(ref path) = cli.tape_path {
        let data = match std::fs::read(path) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Failed to read tape {}: {e}", path.display());
                process::exit(1);
            }
        };
        match Ct2File::parse(&data) {
            Ok(tape) => {
                machine.insert_tape(&tape);
                eprintln!("Inserted tape: {}", path.display());
            }
            Err(e) => {
                eprintln!("Failed to parse tape: {e}");
                process::exit(1);
            }
        }
    }

    if let Some(ref text) = cli.type_text {
        let text = text.replace("\\n", "\n");
        machine.input_queue().enqueue_text(&text, cli.type_at);
    }

    if !cli.headless && !cli.no_sound {
        install_audio(&mut machine);
    }

    machine.power_on();
    machine.set_color_mode(cli.color);
    if !machine.bus().speaker.is_available() {
        if let Some(err) = machine.bus().speaker.last_error() {
            eprintln!("speaker disabled: {err}");
        }
    }

    machine
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cli = parse_args();

    if cli.headless {
        run_headless(&cli);
        return;
    }

    let machine = make_machine(&cli);
    let mut app = App::new(machine, cli.play_at);

    let event_loop = match EventLoop::new() {
        Ok(el) => el,
        Err(e) => {
            eprintln!("Failed to create event loop: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {e}");
        process::exit(1);
    }
}
