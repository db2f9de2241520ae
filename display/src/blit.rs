// display/src/blit.rs

use frame::Frame;
use thiserror::Error;

/// Color de la franja que sustituye al frame cuando el pintado falla (RGBA).
pub const ERROR_COLOR: [u8; 4] = [0xFF, 0x00, 0x00, 0xFF];

// Alto de la franja de error, en píxeles de superficie
const ERROR_BAND: usize = 24;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlitError {
    #[error("la superficie mide {actual} bytes, se esperaban {expected} para {width}x{height}")]
    Destination {
        expected: usize,
        actual: usize,
        width: usize,
        height: usize,
    },
}

/// Rectángulo de la superficie donde cae el frame escalado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Escala el frame para que quepa entero conservando la proporción, centrado.
/// Lo que sobra por los lados (o arriba y abajo) queda para el fondo.
pub fn fit(src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Option<Viewport> {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return None;
    }
    let scale = f64::min(dst_w as f64 / src_w as f64, dst_h as f64 / src_h as f64);
    let width = ((src_w as f64 * scale) as usize).min(dst_w);
    let height = ((src_h as f64 * scale) as usize).min(dst_h);
    if width == 0 || height == 0 {
        return None;
    }
    Some(Viewport {
        x: (dst_w - width) / 2,
        y: (dst_h - height) / 2,
        width,
        height,
    })
}

/// ARGB del frame -> RGBA de la superficie de `pixels`.
pub fn argb_to_rgba(pixel: u32) -> [u8; 4] {
    [(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8, (pixel >> 24) as u8]
}

/// Copia el frame a la superficie con vecino más cercano y rellena el resto con `background`.
pub fn blit(
    frame: &Frame,
    dst: &mut [u8],
    dst_w: usize,
    dst_h: usize,
    background: [u8; 4],
) -> Result<(), BlitError> {
    check_destination(dst, dst_w, dst_h)?;

    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&background);
    }

    let Some(view) = fit(frame.width(), frame.height(), dst_w, dst_h) else {
        return Ok(());
    };

    let src = frame.pixels();
    for row in 0..view.height {
        let sy = row * frame.height() / view.height;
        let src_row = &src[sy * frame.width()..(sy + 1) * frame.width()];
        let start = ((view.y + row) * dst_w + view.x) * 4;
        let dst_row = &mut dst[start..start + view.width * 4];

        for (col, px) in dst_row.chunks_exact_mut(4).enumerate() {
            let sx = col * frame.width() / view.width;
            px.copy_from_slice(&argb_to_rgba(src_row[sx]));
        }
    }
    Ok(())
}

/// Indicador visible de fallo: fondo oscuro y una franja roja arriba.
/// Si el tamaño no cuadra, se pinta lo que quepa.
pub fn draw_error_indicator(dst: &mut [u8], dst_w: usize, background: [u8; 4]) {
    let band_bytes = dst_w * ERROR_BAND * 4;
    for (i, px) in dst.chunks_exact_mut(4).enumerate() {
        let color = if i * 4 < band_bytes { ERROR_COLOR } else { background };
        px.copy_from_slice(&color);
    }
}

fn check_destination(dst: &[u8], width: usize, height: usize) -> Result<(), BlitError> {
    let expected = width * height * 4;
    if dst.len() != expected {
        return Err(BlitError::Destination {
            expected,
            actual: dst.len(),
            width,
            height,
        });
    }
    Ok(())
}
