/// Terminal front-end: frame loop, keyboard controls and ASCII rasterization
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{info, warn};
use sr3d_core::{
    render_frame, update_camera, update_model_transform, Camera, CameraPose, FrameContext,
    HomogeneousExt, Mesh, ModelObject, RendererConfig, Transform, Viewport,
};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

/// Seconds of motion applied per key press
const KEY_STEP: f32 = 0.1;

/// Command line: `[mesh.obj|mesh.stl] [--config path.toml]`
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub mesh: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl CliArgs {
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--config needs a file path"))?;
                    parsed.config = Some(PathBuf::from(path));
                }
                flag if flag.starts_with('-') => anyhow::bail!("unknown option {}", flag),
                _ if parsed.mesh.is_some() => anyhow::bail!("only one mesh file can be given"),
                _ => parsed.mesh = Some(PathBuf::from(arg)),
            }
        }

        Ok(parsed)
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    model: ModelObject,
    transform: Transform,
    camera: Camera,
    pose: CameraPose,
    yaw: f32,
    pitch: f32,
    context: FrameContext,
    renderer: AsciiRenderer,
    config: RendererConfig,
    running: bool,
    last_frame: Instant,
    last_update: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, config: RendererConfig) -> io::Result<Self> {
        let (width, height) = terminal::size().unwrap_or_else(|e| {
            warn!("terminal size unavailable ({}), using configured viewport", e);
            config.viewport.cell_size()
        });

        Ok(Self::with_size(mesh, config, width as u32, height as u32))
    }

    pub fn with_size(mesh: Mesh, config: RendererConfig, width: u32, height: u32) -> Self {
        let viewport = Viewport::new(width, height);
        let mut camera = Camera::new(config.camera_settings(viewport.aspect_ratio() * CELL_ASPECT));

        let mut pose = config.camera_pose();
        if let Err(e) = update_camera(&mut camera, &pose) {
            warn!("configured camera pose rejected ({}), using default", e);
            pose = *camera.pose();
        }

        let (yaw, pitch) = match pose.front.try_normalize3() {
            Ok(front) => (front.z.atan2(front.x).to_degrees(), front.y.asin().to_degrees()),
            Err(_) => (-90.0, 0.0),
        };

        let context = FrameContext::new(viewport)
            .with_debug_normals(config.debug.normals, config.debug.normal_length);

        Self {
            model: ModelObject::new(Arc::new(mesh)),
            transform: Transform::default(),
            camera,
            pose,
            yaw,
            pitch,
            context,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            config,
            running: true,
            last_frame: Instant::now(),
            last_update: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn context(&self) -> &FrameContext {
        &self.context
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        self.last_update = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Update
            let dt = (frame_start - self.last_update).as_secs_f32();
            self.last_update = frame_start;
            self.update(dt);

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                self.handle_key(code);
            }
            Event::Resize(width, height) => self.resize(width as u32, height as u32),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let movement = self.config.controls.movement_speed * KEY_STEP;
        let turn = self.config.controls.turn_speed * KEY_STEP;

        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') => self.pose.position += self.pose.front * movement,
            KeyCode::Char('s') => self.pose.position -= self.pose.front * movement,
            KeyCode::Char('a') | KeyCode::Char('d') => match self.pose.right() {
                Ok(right) if code == KeyCode::Char('a') => self.pose.position -= right * movement,
                Ok(right) => self.pose.position += right * movement,
                Err(e) => warn!("cannot strafe: {}", e),
            },
            KeyCode::Left => self.turn(-turn, 0.0),
            KeyCode::Right => self.turn(turn, 0.0),
            KeyCode::Up => self.turn(0.0, turn),
            KeyCode::Down => self.turn(0.0, -turn),
            KeyCode::Char('e') => self.transform.rotate(0.0, 0.0, turn.to_radians()),
            KeyCode::Char('r') => self.transform.rotate(0.0, 0.0, -turn.to_radians()),
            KeyCode::Char('n') => {
                self.context.debug_normals = !self.context.debug_normals;
                info!("debug normals {}", if self.context.debug_normals { "on" } else { "off" });
            }
            _ => {}
        }
    }

    fn turn(&mut self, yaw: f32, pitch: f32) {
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-89.0, 89.0);
        self.pose.front = CameraPose::front_from_angles(self.yaw, self.pitch);
    }

    fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        self.context.viewport = viewport;
        self.renderer.resize(width as usize, height as usize);
        self.camera
            .set_settings(self.config.camera_settings(viewport.aspect_ratio() * CELL_ASPECT));
    }

    /// Advance the idle spin by `dt` seconds and push model and camera state
    /// into the pipeline
    pub fn update(&mut self, dt: f32) {
        let spin = self.config.controls.spin.to_radians() * dt;
        self.transform.rotate(spin * 2.0 / 3.0, spin, 0.0);
        update_model_transform(&mut self.model, self.transform);

        if let Err(e) = update_camera(&mut self.camera, &self.pose) {
            warn!("camera update rejected: {}", e);
            self.pose = *self.camera.pose();
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();

        let batch = render_frame(&self.model, &self.camera, &mut self.context);
        self.renderer.render_batch(batch);
        let triangle_count = batch.len();

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "SR3D | FPS: {:.1} | Triangles: {} | WASD=Move Arrows=Look E/R=Roll N=Normals Q=Quit",
                self.fps, triangle_count
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
