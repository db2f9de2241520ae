// input/src/lib.rs

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroU8;

use log::debug;
use parking_lot::Mutex;
use thiserror::Error;

pub mod keys;

pub use keys::{STANDARD_BINDINGS, engine_key, vk};

/// Valor reservado que devuelve `pop()` cuando no hay nada en cola.
pub const NO_EVENT: u16 = 0;

/// Fase de una transición de tecla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Pressed,
    Released,
}

impl Phase {
    /// Bit que viaja en la posición 8 del valor codificado.
    fn bit(self) -> u16 {
        match self {
            Phase::Pressed => 1,
            Phase::Released => 0,
        }
    }
}

/// Una pulsación o liberación, con el código de tecla del host (VK_*).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTransition {
    pub code: u32,
    pub phase: Phase,
}

impl KeyTransition {
    pub fn pressed(code: u32) -> Self {
        Self { code, phase: Phase::Pressed }
    }

    pub fn released(code: u32) -> Self {
        Self { code, phase: Phase::Released }
    }
}

/// Empaqueta fase y código del motor: `(fase << 8) | código`.
/// Como el código nunca es 0, el resultado nunca choca con `NO_EVENT`.
pub fn encode(phase: Phase, engine_code: NonZeroU8) -> u16 {
    (phase.bit() << 8) | engine_code.get() as u16
}

/// Operación inversa, pensada para el lado del motor.
/// `NO_EVENT` (o un código 0) devuelve `None`.
pub fn decode(value: u16) -> Option<(Phase, NonZeroU8)> {
    let code = NonZeroU8::new((value & 0xFF) as u8)?;
    let phase = if (value >> 8) & 1 == 1 { Phase::Pressed } else { Phase::Released };
    Some((phase, code))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyMapError {
    #[error("la tecla del host {host} se asigna al código 0, reservado para 'sin evento'")]
    ZeroEngineCode { host: u32 },
    #[error("la tecla del host {host} aparece más de una vez en la tabla")]
    DuplicateHostKey { host: u32 },
}

/// Traducción de teclas del host a teclas del motor.
///
/// Las teclas que no están en la tabla caen en una regla derivada:
/// si el código es ASCII imprimible, se usa su minúscula.
/// El resto queda sin asignar (`None`).
#[derive(Debug, Clone)]
pub struct KeyCodeMap {
    bindings: HashMap<u32, NonZeroU8>,
}

impl KeyCodeMap {
    /// Construye una tabla a medida. Rechaza el código 0 y claves repetidas.
    pub fn new(entries: impl IntoIterator<Item = (u32, u8)>) -> Result<Self, KeyMapError> {
        let mut bindings = HashMap::new();
        for (host, engine) in entries {
            let code = NonZeroU8::new(engine).ok_or(KeyMapError::ZeroEngineCode { host })?;
            if bindings.insert(host, code).is_some() {
                return Err(KeyMapError::DuplicateHostKey { host });
            }
        }
        Ok(Self { bindings })
    }

    /// La tabla estándar (flechas, F1-F12, modificadores...).
    /// Sus valores ya son `NonZeroU8` comprobados en compilación.
    pub fn standard() -> Self {
        Self {
            bindings: STANDARD_BINDINGS.iter().copied().collect(),
        }
    }

    pub fn translate(&self, host: u32) -> Option<NonZeroU8> {
        if let Some(code) = self.bindings.get(&host) {
            return Some(*code);
        }
        // Fallback: ASCII imprimible (0x20..=0x7E) -> minúscula
        let byte = u8::try_from(host).ok().filter(|b| (0x20..=0x7E).contains(b))?;
        NonZeroU8::new(byte.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for KeyCodeMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Cola FIFO de transiciones entre los hilos de entrada del host y el motor.
///
/// Las transiciones se traducen al entrar; así `pop()` solo devuelve
/// `NO_EVENT` cuando la cola está realmente vacía.
pub struct InputQueue {
    map: KeyCodeMap,
    pending: Mutex<VecDeque<(Phase, NonZeroU8)>>,
}

impl InputQueue {
    pub fn new(map: KeyCodeMap) -> Self {
        Self {
            map,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Añade al final. Devuelve `false` si la tecla no tiene traducción y se descarta.
    pub fn push(&self, event: KeyTransition) -> bool {
        match self.map.translate(event.code) {
            Some(code) => {
                self.pending.lock().push_back((event.phase, code));
                true
            }
            None => {
                debug!("tecla del host {} sin asignar, se descarta ({:?})", event.code, event.phase);
                false
            }
        }
    }

    /// Saca la cabeza ya codificada, o `NO_EVENT`. Nunca bloquea más allá del candado.
    pub fn pop(&self) -> u16 {
        match self.pending.lock().pop_front() {
            Some((phase, code)) => encode(phase, code),
            None => NO_EVENT,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub fn clear(&self) {
        self.pending.lock().clear();
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new(KeyCodeMap::standard())
    }
}
