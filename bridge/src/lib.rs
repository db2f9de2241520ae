// bridge/src/lib.rs

// El puente conecta el motor (en su propio hilo) con el host (entrada y pintado).
// Solo hay dos zonas compartidas: la cola de teclas y el frame; cada una con su candado.
use std::path::PathBuf;
use std::sync::Arc;

use clock::{Clock, StopSignal};
use driver::{DriverError, DriverState, EngineDriver};
use engine::{Engine, EngineHost};
use frame::{Frame, FrameSink};
use input::{InputQueue, KeyCodeMap, KeyTransition};
use log::{debug, info};
use parking_lot::Mutex;
use thiserror::Error;

/// Título mientras el motor no haya puesto uno.
pub const UNKNOWN_TITLE: &str = "<unknown>";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("el archivo de datos del juego no existe: {0:?}")]
    DataFileMissing(PathBuf),
    #[error("la ruta del archivo de datos no es UTF-8: {0:?}")]
    DataPathEncoding(PathBuf),
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Todo lo que el puente necesita, ya resuelto por quien lo construye.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub width: usize,
    pub height: usize,
    /// `argv[0]` para el motor.
    pub program_name: String,
    /// Archivo de datos del juego (se pasa tras `-iwad`).
    pub data_path: PathBuf,
    pub key_map: KeyCodeMap,
}

impl BridgeConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            width: frame::SCREEN_WIDTH,
            height: frame::SCREEN_HEIGHT,
            program_name: engine::DEFAULT_PROGRAM.to_string(),
            data_path: data_path.into(),
            key_map: KeyCodeMap::standard(),
        }
    }
}

/// Cara del puente que ve el host: entrada, pintado y ciclo de vida.
pub struct Bridge {
    input: Arc<InputQueue>,
    frames: Arc<FrameSink>,
    title: Arc<Mutex<String>>,
    driver: EngineDriver,
}

impl Bridge {
    /// Monta las piezas y arranca el motor.
    /// Devuelve error si faltan los datos o si la inicialización del motor falla.
    pub fn start(engine: Box<dyn Engine>, config: BridgeConfig) -> Result<Self, BridgeError> {
        if !config.data_path.is_file() {
            return Err(BridgeError::DataFileMissing(config.data_path));
        }
        let data_path = config
            .data_path
            .to_str()
            .ok_or_else(|| BridgeError::DataPathEncoding(config.data_path.clone()))?;

        let input = Arc::new(InputQueue::new(config.key_map.clone()));
        let frames = Arc::new(FrameSink::new(config.width, config.height));
        let title = Arc::new(Mutex::new(UNKNOWN_TITLE.to_string()));
        let stop = StopSignal::new();

        let callbacks = EngineCallbacks {
            clock: Clock::new(),
            stop: stop.clone(),
            input: Arc::clone(&input),
            frames: Arc::clone(&frames),
            title: Arc::clone(&title),
        };

        let args = engine::launch_args(&config.program_name, data_path);
        let driver = EngineDriver::start(engine, Box::new(callbacks), args, stop)?;

        Ok(Self { input, frames, title, driver })
    }

    /// Encola una pulsación. Devuelve `false` si la tecla no tiene traducción
    /// o si el motor ya no corre (nadie la leería).
    pub fn handle_key_down(&self, code: u32) -> bool {
        self.forward_key(KeyTransition::pressed(code))
    }

    pub fn handle_key_up(&self, code: u32) -> bool {
        self.forward_key(KeyTransition::released(code))
    }

    fn forward_key(&self, transition: KeyTransition) -> bool {
        let state = self.driver.state();
        if state != DriverState::Running {
            debug!("tecla {:?} descartada: el motor está en {:?}", transition, state);
            return false;
        }
        self.input.push(transition)
    }

    /// Copia del último frame publicado.
    pub fn current_frame(&self) -> Frame {
        self.frames.snapshot()
    }

    /// Acceso al frame actual sin copiarlo (con el candado tomado durante `f`).
    pub fn read_frame<R>(&self, f: impl FnOnce(&Frame) -> R) -> R {
        self.frames.read(f)
    }

    pub fn window_title(&self) -> String {
        self.title.lock().clone()
    }

    pub fn driver_state(&self) -> DriverState {
        self.driver.state()
    }

    pub fn ticks(&self) -> u64 {
        self.driver.ticks()
    }

    /// Transiciones aún no consumidas por el motor.
    pub fn pending_keys(&self) -> usize {
        self.input.len()
    }

    /// Para el motor y espera a su hilo. Idempotente.
    pub fn dispose(&mut self) {
        debug!("cerrando el puente (estado del motor: {:?})", self.driver.state());
        self.driver.stop();
        // El hilo ya no existe: lo que quede en cola no lo va a consumir nadie.
        self.input.clear();
    }
}

/// Cara del puente que ve el motor: implementa sus callbacks delegando en cada pieza.
struct EngineCallbacks {
    clock: Clock,
    stop: StopSignal,
    input: Arc<InputQueue>,
    frames: Arc<FrameSink>,
    title: Arc<Mutex<String>>,
}

impl EngineHost for EngineCallbacks {
    fn init(&mut self) {
        info!("inicializando el motor del juego...");
    }

    fn draw_frame(&mut self, raw: &[u8]) {
        self.frames.publish(raw);
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.clock.sleep(ms as u64, &self.stop);
    }

    fn tick_ms(&mut self) -> u32 {
        // El contrato del motor es de 32 bits: se da la vuelta a los ~49 días
        self.clock.now_ms() as u32
    }

    fn get_key(&mut self) -> u16 {
        self.input.pop()
    }

    fn set_window_title(&mut self, title: &str) {
        debug!("título del motor: {}", title);
        *self.title.lock() = title.to_string();
    }
}
