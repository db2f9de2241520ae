// engine/src/lib.rs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod testcard;

pub use testcard::TestCard;

/// Bandera que precede a la ruta del archivo de datos del juego.
pub const DATA_FLAG: &str = "-iwad";

/// Nombre de programa por defecto en `argv[0]`.
pub const DEFAULT_PROGRAM: &str = "kdoom";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("falta el argumento obligatorio {0}")]
    MissingArgument(&'static str),
    #[error("no se pudo abrir el archivo de datos {path:?}: {source}")]
    DataUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fallo del motor: {0}")]
    Fault(String),
    #[error("el motor entró en pánico: {0}")]
    Panicked(String),
}

/// Las llamadas que el motor hace hacia el host en mitad de un tick.
/// Todas se ejecutan en el hilo del motor.
pub trait EngineHost {
    /// Gancho de arranque, solo informativo.
    fn init(&mut self);
    /// Buffer crudo del frame recién dibujado. Solo vale durante la llamada.
    fn draw_frame(&mut self, raw: &[u8]);
    fn sleep_ms(&mut self, ms: u32);
    fn tick_ms(&mut self) -> u32;
    /// Siguiente tecla codificada, o `input::NO_EVENT`.
    fn get_key(&mut self) -> u16;
    fn set_window_title(&mut self, title: &str);
}

/// Interfaz (Trait) del motor externo.
/// Permite al driver avanzar cualquier motor sin saber qué hay detrás
/// (una librería nativa, la carta de ajuste, un doble de pruebas...).
pub trait Engine: Send {
    /// Inicialización única, con argumentos estilo `argv`.
    fn create(&mut self, args: &[String], host: &mut dyn EngineHost) -> Result<(), EngineError>;
    /// Un paso de simulación + dibujo.
    fn tick(&mut self, host: &mut dyn EngineHost) -> Result<(), EngineError>;
}

/// Construye `argv`: `[programa, "-iwad", ruta]`.
pub fn launch_args(program: &str, data_path: &str) -> Vec<String> {
    vec![program.to_string(), DATA_FLAG.to_string(), data_path.to_string()]
}

/// Busca el valor que sigue a `flag` en `args` (saltando `argv[0]`).
pub fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .skip(1)
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 2))
        .map(String::as_str)
}
