// engine/src/testcard.rs

use std::fs::File;
use std::path::Path;

use input::engine_key;
use input::Phase;
use log::info;

use crate::{DATA_FLAG, Engine, EngineError, EngineHost, arg_value};

/// Ticks por segundo a los que se acompasa la carta.
pub const TICRATE: u32 = 35;

// Píxeles que se desplaza el patrón por tick con una flecha pulsada
const SCROLL_STEP: i32 = 4;

/// Motor mínimo que cumple el contrato sin depender de una librería nativa:
/// dibuja un degradado que se desplaza con las flechas.
pub struct TestCard {
    width: usize,
    height: usize,
    buffer: Vec<u8>,
    scroll_x: i32,
    scroll_y: i32,
    // Flechas mantenidas: izquierda, derecha, arriba, abajo
    held: [bool; 4],
    frames: u64,
    keys_seen: u64,
    last_tick_ms: Option<u32>,
}

impl TestCard {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0; width * height * 4],
            scroll_x: 0,
            scroll_y: 0,
            held: [false; 4],
            frames: 0,
            keys_seen: 0,
            last_tick_ms: None,
        }
    }

    pub fn frames_drawn(&self) -> u64 { self.frames }
    pub fn keys_seen(&self) -> u64 { self.keys_seen }
    pub fn scroll(&self) -> (i32, i32) { (self.scroll_x, self.scroll_y) }

    /// Vacía todas las teclas pendientes de este tick.
    fn poll_keys(&mut self, host: &mut dyn EngineHost) {
        while let Some((phase, code)) = input::decode(host.get_key()) {
            self.keys_seen += 1;
            let down = phase == Phase::Pressed;
            match code.get() {
                engine_key::LEFT_ARROW => self.held[0] = down,
                engine_key::RIGHT_ARROW => self.held[1] = down,
                engine_key::UP_ARROW => self.held[2] = down,
                engine_key::DOWN_ARROW => self.held[3] = down,
                _ => {}
            }
        }
    }

    fn advance(&mut self) {
        let [left, right, up, down] = self.held;
        self.scroll_x += (right as i32 - left as i32) * SCROLL_STEP;
        self.scroll_y += (down as i32 - up as i32) * SCROLL_STEP;
        self.frames += 1;
    }

    /// Rellena el buffer en el formato nativo: 0x00RRGGBB en little-endian.
    fn render(&mut self) {
        let blue = (self.frames.wrapping_mul(2) & 0xFF) as u32;
        let width = self.width;
        for (i, bytes) in self.buffer.chunks_exact_mut(4).enumerate() {
            let x = (i % width) as i32;
            let y = (i / width) as i32;
            let red = (x.wrapping_add(self.scroll_x) & 0xFF) as u32;
            let green = (y.wrapping_add(self.scroll_y) & 0xFF) as u32;
            let word = (red << 16) | (green << 8) | blue;
            bytes.copy_from_slice(&word.to_le_bytes());
        }
    }

    /// Duerme lo que falte para completar el periodo del tick.
    fn pace(&mut self, host: &mut dyn EngineHost) {
        let period = 1000 / TICRATE;
        let now = host.tick_ms();
        if let Some(last) = self.last_tick_ms {
            let elapsed = now.wrapping_sub(last);
            if elapsed < period {
                host.sleep_ms(period - elapsed);
            }
        }
        self.last_tick_ms = Some(host.tick_ms());
    }
}

impl Engine for TestCard {
    fn create(&mut self, args: &[String], host: &mut dyn EngineHost) -> Result<(), EngineError> {
        let path = arg_value(args, DATA_FLAG).ok_or(EngineError::MissingArgument(DATA_FLAG))?;
        File::open(path).map_err(|source| EngineError::DataUnavailable {
            path: path.into(),
            source,
        })?;

        host.init();
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        host.set_window_title(&format!("Carta de ajuste - {}", name));
        info!("carta de ajuste lista: {}x{} con datos {}", self.width, self.height, path);
        Ok(())
    }

    fn tick(&mut self, host: &mut dyn EngineHost) -> Result<(), EngineError> {
        self.poll_keys(host);
        self.advance();
        self.render();
        host.draw_frame(&self.buffer);
        self.pace(host);
        Ok(())
    }
}
