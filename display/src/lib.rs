// display/src/lib.rs

// Importamos crates externos para ventana y gráficos.
// - winit: Manejo de ventanas multiplataforma.
// - pixels: Superficie de píxeles acelerada por hardware.
use std::time::{Duration, Instant};

use log::{error, info};
use pixels::{Pixels, SurfaceTexture};
use thiserror::Error;
use winit::dpi::LogicalSize;
use winit::error::OsError;
use winit::event::{ElementState, Event, KeyboardInput, StartCause, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::WindowBuilder;
use winit_input_helper::WinitInputHelper;

use bridge::Bridge;

pub mod blit;
pub mod keys;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("no se pudo crear la ventana: {0}")]
    CreateWindow(#[source] OsError),
    #[error("no se pudo crear la superficie de píxeles: {0}")]
    CreateSurface(#[source] pixels::Error),
}

/// Ajustes del panel. El ritmo de repintado es independiente del ritmo del motor.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub title: String,
    /// Escala inicial de la ventana respecto al frame.
    pub scale: u32,
    pub repaint_hz: u32,
    /// Color de las bandas alrededor del frame (RGBA).
    pub background: [u8; 4],
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            title: "Doomed".to_string(),
            scale: 2,
            repaint_hz: 60,
            background: [0x00, 0x00, 0x00, 0xFF],
        }
    }
}

/// Superficie de pintado: el buffer de `pixels` mide lo mismo que la ventana
/// y el escalado con bandas lo hacemos nosotros en `blit`.
struct Surface {
    pixels: Pixels,
    width: u32,
    height: u32,
    background: [u8; 4],
}

impl Surface {
    fn resize(&mut self, width: u32, height: u32) {
        // Ventana minimizada: nos quedamos con el tamaño anterior
        if width == 0 || height == 0 {
            return;
        }
        if let Err(e) = self.pixels.resize_surface(width, height) {
            error!("no se pudo redimensionar la superficie: {}", e);
            return;
        }
        if let Err(e) = self.pixels.resize_buffer(width, height) {
            error!("no se pudo redimensionar el buffer: {}", e);
            return;
        }
        self.width = width;
        self.height = height;
    }

    fn paint(&mut self, bridge: &Bridge) {
        let (width, height) = (self.width as usize, self.height as usize);
        let background = self.background;
        let target = self.pixels.frame_mut();

        let result = bridge.read_frame(|frame| blit::blit(frame, &mut *target, width, height, background));
        if let Err(e) = result {
            error!("fallo al pintar el frame: {}", e);
            blit::draw_error_indicator(target, width, background);
        }

        if let Err(e) = self.pixels.render() {
            error!("fallo al presentar el frame: {}", e);
        }
    }
}

/// Abre la ventana y toma el control del hilo principal hasta que se cierra.
/// Al cerrar, el motor se detiene antes de soltar nada.
pub fn run(mut bridge: Bridge, config: PanelConfig) -> Result<(), DisplayError> {
    let (frame_w, frame_h) = bridge.read_frame(|f| (f.width() as u32, f.height() as u32));
    let scale = config.scale.max(1);

    // 1. Configurar la ventana
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(LogicalSize::new(frame_w * scale, frame_h * scale))
        .with_min_inner_size(LogicalSize::new(frame_w, frame_h))
        .build(&event_loop)
        .map_err(DisplayError::CreateWindow)?;

    // 2. Superficie del mismo tamaño que la ventana
    let mut surface = {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        let texture = SurfaceTexture::new(width, height, &window);
        let pixels = Pixels::new(width, height, texture).map_err(DisplayError::CreateSurface)?;
        Surface { pixels, width, height, background: config.background }
    };

    let mut helper = WinitInputHelper::new();
    let period = Duration::from_secs(1) / config.repaint_hz.max(1);
    let mut next_repaint = Instant::now() + period;
    let mut closing = false;

    info!("panel abierto: frame {}x{}, repintado a {} Hz", frame_w, frame_h, config.repaint_hz);

    // 3. Bucle de eventos. Las teclas se reenvían en bruto para no perder el orden
    // ni juntar un press+release que ocurran en el mismo frame.
    event_loop.run(move |event, _, control_flow| {
        match &event {
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                window.request_redraw();
                let now = Instant::now();
                next_repaint += period;
                if next_repaint <= now {
                    next_repaint = now + period;
                }
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { input, .. },
                ..
            } => forward_key(&bridge, input),
            Event::RedrawRequested(_) => surface.paint(&bridge),
            Event::LoopDestroyed => bridge.dispose(),
            _ => {}
        }

        if helper.update(&event) {
            if helper.close_requested() && !closing {
                closing = true;
                bridge.dispose();
                control_flow.set_exit();
                return;
            }
            if let Some(size) = helper.window_resized() {
                surface.resize(size.width, size.height);
            }
        }

        if !closing {
            control_flow.set_wait_until(next_repaint);
        }
    });
}

fn forward_key(bridge: &Bridge, input: &KeyboardInput) {
    let Some(code) = input.virtual_keycode.and_then(keys::host_key_code) else {
        return;
    };
    match input.state {
        ElementState::Pressed => bridge.handle_key_down(code),
        ElementState::Released => bridge.handle_key_up(code),
    };
}
