// frame/src/lib.rs

use log::error;
use parking_lot::Mutex;
use thiserror::Error;

pub const SCREEN_WIDTH: usize = 640;
pub const SCREEN_HEIGHT: usize = 400;
pub const BYTES_PER_PIXEL: usize = 4;

/// Canal alfa forzado a opaco en cada píxel convertido.
pub const OPAQUE: u32 = 0xFF00_0000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("tamaño de buffer inesperado: se esperaban {expected} bytes, llegaron {actual}")]
    BadLength { expected: usize, actual: usize },
}

/// Reordena una palabra del motor (0x00RRGGBB en little-endian) al formato del host (ARGB).
pub fn swizzle(word: u32) -> u32 {
    let r = (word >> 16) & 0xFF;
    let g = (word >> 8) & 0xFF;
    let b = word & 0xFF;
    OPAQUE | (r << 16) | (g << 8) | b
}

/// Convierte el buffer crudo del motor en píxeles ARGB.
/// Valida la longitud antes de tocar `dst`, así un error nunca deja el destino a medias.
pub fn convert(raw: &[u8], dst: &mut [u32]) -> Result<(), FrameError> {
    // 1. Validar antes de escribir: un buffer corto no deja el destino a medias.
    let expected = dst.len() * BYTES_PER_PIXEL;
    if raw.len() != expected {
        return Err(FrameError::BadLength { expected, actual: raw.len() });
    }

    // 2. Cada palabra del motor es 0x00RRGGBB en little-endian.
    for (pixel, bytes) in dst.iter_mut().zip(raw.chunks_exact(BYTES_PER_PIXEL)) {
        let word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        *pixel = swizzle(word);
    }
    Ok(())
}

/// Una imagen completa lista para pintar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    // Número de publicaciones correctas que produjeron esta imagen (0 = inicial)
    sequence: u64,
}

impl Frame {
    /// Imagen negra opaca.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![OPAQUE; width * height],
            sequence: 0,
        }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn sequence(&self) -> u64 { self.sequence }

    /// Píxeles ARGB, fila a fila.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }
}

/// Receptor de frames: el hilo del motor publica, el hilo de pintado lee.
/// Ambos lados pasan por el mismo candado, así nunca se ve un frame mezclado.
pub struct FrameSink {
    frame: Mutex<Frame>,
}

impl FrameSink {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            frame: Mutex::new(Frame::blank(width, height)),
        }
    }

    /// Bytes que debe medir cada buffer crudo.
    pub fn expected_len(&self) -> usize {
        let frame = self.frame.lock();
        frame.width * frame.height * BYTES_PER_PIXEL
    }

    /// Convierte y publica. Devuelve el número de secuencia del nuevo frame.
    pub fn try_publish(&self, raw: &[u8]) -> Result<u64, FrameError> {
        // La conversión entera ocurre con el lock tomado: el pintor nunca
        // ve un frame mezclado entre el anterior y el nuevo.
        let mut frame = self.frame.lock();
        convert(raw, &mut frame.pixels)?;
        // Solo se cuenta si la conversión fue completa.
        frame.sequence += 1;
        Ok(frame.sequence)
    }

    /// Igual que `try_publish`, pero un fallo solo se registra: el frame anterior se queda.
    pub fn publish(&self, raw: &[u8]) {
        if let Err(e) = self.try_publish(raw) {
            error!("no se pudo convertir el frame: {}", e);
        }
    }

    /// Copia del último frame completo.
    pub fn snapshot(&self) -> Frame {
        self.frame.lock().clone()
    }

    /// Lee el frame actual sin copiarlo, con el candado tomado durante `f`.
    pub fn read<R>(&self, f: impl FnOnce(&Frame) -> R) -> R {
        let frame = self.frame.lock();
        f(&*frame)
    }

    pub fn frames_published(&self) -> u64 {
        self.frame.lock().sequence
    }
}

impl Default for FrameSink {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}
