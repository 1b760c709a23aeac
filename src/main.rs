use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use log::info;
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{Key, NamedKey};
use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
use winit::window::WindowBuilder;

use glyph_lighting::{KeyCode, Renderer, SceneConfig, Session};

const USAGE: &str =
    "Usage: glyph-lighting [--config <path>] [--headless] [--keys <chars>] [--frames <n>]";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let config = match &options.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    if options.headless {
        return run_headless(&config, &options);
    }
    match run_interactive(&config) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --headless mode (set DISPLAY or WAYLAND_DISPLAY to enable rendering)."
                );
                run_headless(&config, &options)
            } else {
                Err(err)
            }
        }
    }
}

fn run_headless(config: &SceneConfig, options: &CliOptions) -> Result<()> {
    let mut session = Session::start(config);
    session
        .wait_for_glyphs()
        .context("failed to build glyph surfaces")?;
    if let Some(glyphs) = session.glyphs() {
        println!(
            "Loaded glyphs {:?} ({}) and {:?} ({})",
            glyphs.letter.character(),
            glyphs.letter.material(),
            glyphs.digit.character(),
            glyphs.digit.material()
        );
    }

    let mut applied = 0;
    for ch in options.keys.chars() {
        if session.handle_key(KeyCode::Character(ch)).is_some() {
            applied += 1;
        }
        session.tick()?;
    }
    for _ in 0..options.frames {
        session.tick()?;
    }
    println!(
        "Applied {applied} of {} key(s) over {} frame(s)",
        options.keys.chars().count(),
        session.frames()
    );

    print_final_state(&session);
    Ok(())
}

fn run_interactive(config: &SceneConfig) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let mut event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(LogicalSize::new(
                f64::from(config.window.width),
                f64::from(config.window.height),
            ))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window)))?;
    let mut app = AppState {
        renderer,
        session: Session::start(config),
        last_error: None,
    };

    event_loop.run_on_demand(|event, target| {
        target.set_control_flow(ControlFlow::Poll);
        if let Err(err) = app.process_event(&event, target) {
            app.last_error = Some(err);
            target.exit();
        }
    })?;

    print_final_state(&app.session);

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    renderer: Renderer,
    session: Session,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(
        &mut self,
        event: &Event<()>,
        target: &EventLoopWindowTarget<()>,
    ) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(size) => self.renderer.resize(*size),
                    WindowEvent::KeyboardInput {
                        event,
                        is_synthetic,
                        ..
                    } => {
                        if is_user_press(event.state, *is_synthetic) && self.handle_keyboard(event) {
                            target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => self.redraw()?,
                    _ => {}
                }
            }
            Event::AboutToWait => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    /// Synchronizes the materials for this frame, then draws it.
    fn redraw(&mut self) -> Result<()> {
        self.session
            .tick()
            .context("failed to build glyph surfaces")?;
        self.renderer.update_globals(self.session.camera());
        match self.renderer.render(&self.session.scene()) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.renderer.window().inner_size();
                self.renderer.resize(size);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU is out of memory")),
            Err(err) => {
                info!("Surface error ({err}); retrying next frame");
                Ok(())
            }
        }
    }

    /// Forwards a press to the session. Returns `true` when the window should
    /// close.
    fn handle_keyboard(&mut self, event: &KeyEvent) -> bool {
        match map_key(&event.logical_key) {
            Some(KeyCode::Escape) => true,
            Some(key) => {
                self.session.handle_key(key);
                false
            }
            None => false,
        }
    }
}

/// Real presses, auto-repeats included. Synthetic presses replayed for keys
/// held while the window gains focus are dropped.
fn is_user_press(state: ElementState, is_synthetic: bool) -> bool {
    state == ElementState::Pressed && !is_synthetic
}

fn map_key(key: &Key) -> Option<KeyCode> {
    match key {
        Key::Character(text) => KeyCode::from_text(text.as_str()),
        Key::Named(NamedKey::Escape) => Some(KeyCode::Escape),
        _ => None,
    }
}

fn print_final_state(session: &Session) {
    println!("Light position: {}", format_vec(session.light().position));
    println!("Camera position: {}", format_vec(session.camera().position));
    let Some(glyphs) = session.glyphs() else {
        println!("Glyphs not loaded");
        return;
    };
    println!("Materials:");
    for surface in glyphs.surfaces() {
        let uniforms = surface.uniforms();
        println!(
            " - {} {} light={} base=({:.3}, {:.3}, {:.3}) ambient={:.3} shininess={}",
            surface.character(),
            surface.material(),
            format_vec(uniforms.light_position),
            uniforms.base_color.x,
            uniforms.base_color.y,
            uniforms.base_color.z,
            uniforms.ambient_intensity,
            uniforms.specular_exponent
        );
    }
    println!("Front-face samples:");
    for surface in glyphs.surfaces() {
        let color = surface.shade_front_centre();
        println!(
            " - {} {} rgb=({:.3}, {:.3}, {:.3})",
            surface.character(),
            surface.material(),
            color.x,
            color.y,
            color.z
        );
    }
}

fn format_vec(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

struct CliOptions {
    config: Option<PathBuf>,
    headless: bool,
    keys: String,
    frames: u32,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            config: None,
            headless: false,
            keys: String::new(),
            frames: 1,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => options.headless = true,
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow!("--config needs a path. {USAGE}"))?;
                    options.config = Some(PathBuf::from(path));
                }
                "--keys" => {
                    options.keys = args
                        .next()
                        .ok_or_else(|| anyhow!("--keys needs a value. {USAGE}"))?;
                }
                "--frames" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--frames needs a count. {USAGE}"))?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value:?}"))?;
                }
                "--help" | "-h" => return Err(anyhow!(USAGE)),
                other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
            }
        }
        Ok(options)
    }
}
