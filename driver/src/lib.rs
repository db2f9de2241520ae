// driver/src/lib.rs

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use clock::StopSignal;
use engine::{Engine, EngineError, EngineHost};
use log::{error, info};
use thiserror::Error;

/// Nombre del hilo del motor, visible en logs y depuradores.
pub const THREAD_NAME: &str = "GameThread";

/// Estados del driver. Solo avanzan hacia `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DriverState {
    Uninitialized = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl DriverState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DriverState::Uninitialized,
            1 => DriverState::Running,
            2 => DriverState::Stopping,
            _ => DriverState::Stopped,
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no se pudo lanzar el hilo del motor: {0}")]
    Spawn(#[source] io::Error),
    #[error("la inicialización del motor falló: {0}")]
    Init(#[source] EngineError),
    #[error("el hilo del motor terminó sin informar de la inicialización")]
    InitAborted,
}

/// Vista de solo lectura del estado del driver, clonable y usable desde otro hilo.
#[derive(Debug, Clone)]
pub struct DriverStatus {
    state: Arc<AtomicU8>,
}

impl DriverStatus {
    pub fn state(&self) -> DriverState {
        DriverState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// Dueño del hilo que hace `create()` una vez y luego `tick()` en bucle.
pub struct EngineDriver {
    state: Arc<AtomicU8>,
    ticks: Arc<AtomicU64>,
    stop: StopSignal,
    handle: Option<JoinHandle<()>>,
}

impl EngineDriver {
    /// Lanza el hilo y espera a que `create()` termine.
    /// Si la inicialización falla, el hilo ya está recogido cuando devolvemos el error.
    pub fn start(
        mut engine: Box<dyn Engine>,
        mut host: Box<dyn EngineHost + Send>,
        args: Vec<String>,
        stop: StopSignal,
    ) -> Result<Self, DriverError> {
        let state = Arc::new(AtomicU8::new(DriverState::Uninitialized as u8));
        let ticks = Arc::new(AtomicU64::new(0));
        let (init_tx, init_rx) = crossbeam_channel::bounded::<Result<(), EngineError>>(1);

        let thread_state = Arc::clone(&state);
        let thread_ticks = Arc::clone(&ticks);
        let thread_stop = stop.clone();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                info!("iniciando el motor con argumentos {:?}", args);
                // 1. Inicialización única. `catch_unwind` es la frontera: un pánico
                // del motor se convierte en error y no cruza hacia el host.
                let init = panic::catch_unwind(AssertUnwindSafe(|| engine.create(&args, host.as_mut())))
                    .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(payload))));

                // 2. Publicamos el estado ANTES de avisar por el canal: quien recibe
                // el resultado ya ve Running (o Stopped) al leer el atómico.
                if init.is_err() {
                    thread_state.store(DriverState::Stopped as u8, Ordering::Release);
                    let _ = init_tx.send(init);
                    return;
                }
                thread_state.store(DriverState::Running as u8, Ordering::Release);
                let _ = init_tx.send(Ok(()));

                // 3. Bucle de ticks hasta que pidan parar o el motor falle.
                // Tanto si venimos de Stopping como de un fallo, el final es Stopped.
                run_loop(engine.as_mut(), host.as_mut(), &thread_stop, &thread_ticks);
                thread_state.store(DriverState::Stopped as u8, Ordering::Release);
            })
            .map_err(DriverError::Spawn)?;

        let mut driver = Self {
            state,
            ticks,
            stop,
            handle: Some(handle),
        };

        // Bloqueamos hasta saber cómo fue `create()`. Si el hilo muere sin
        // enviar nada, el emisor se suelta y `recv` devuelve error.
        match init_rx.recv() {
            Ok(Ok(())) => Ok(driver),
            Ok(Err(e)) => {
                driver.join();
                Err(DriverError::Init(e))
            }
            Err(_) => {
                driver.join();
                Err(DriverError::InitAborted)
            }
        }
    }

    pub fn state(&self) -> DriverState {
        self.status().state()
    }

    /// Handle del estado que sobrevive al driver (p. ej. si otro hilo lo está parando).
    pub fn status(&self) -> DriverStatus {
        DriverStatus { state: Arc::clone(&self.state) }
    }

    /// Ticks completados con éxito.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// `true` cuando el hilo ya no va a llamar a nadie más (parado o caído).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Running -> Stopping -> Stopped. Pide la parada y espera al hilo.
    /// Llamarlo dos veces no hace nada.
    pub fn stop(&mut self) {
        if self.handle.is_none() {
            return;
        }
        self.stop.request();
        // Solo Running pasa a Stopping. Si el hilo ya cayó (Stopped), el CAS
        // falla y no retrocedemos el estado.
        let _ = self.state.compare_exchange(
            DriverState::Running as u8,
            DriverState::Stopping as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.join();
        info!("motor detenido tras {} ticks", self.ticks());
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("el hilo del motor terminó con pánico");
            }
        }
        self.state.store(DriverState::Stopped as u8, Ordering::Release);
    }
}

impl Drop for EngineDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Bucle principal del hilo. La parada se mira entre ticks, nunca en mitad de uno.
fn run_loop(engine: &mut dyn Engine, host: &mut dyn EngineHost, stop: &StopSignal, ticks: &AtomicU64) {
    while !stop.is_requested() {
        // Un pánico dentro del tick se trata igual que un `Err`: se registra y paramos.
        // `AssertUnwindSafe` es aceptable porque tras un fallo no se vuelve a tocar el motor.
        let result = panic::catch_unwind(AssertUnwindSafe(|| engine.tick(&mut *host)))
            .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(payload))));

        if let Err(e) = result {
            error!("tick {} falló, el motor se detiene: {}", ticks.load(Ordering::Relaxed) + 1, e);
            return;
        }
        ticks.fetch_add(1, Ordering::AcqRel);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "pánico sin mensaje".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock::Clock;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    /// Cuenta las llamadas que llegan desde el hilo del motor.
    #[derive(Clone, Default)]
    struct Counters {
        draws: Arc<AtomicUsize>,
        keys: Arc<AtomicUsize>,
        inits: Arc<AtomicUsize>,
    }

    struct CountingHost {
        counters: Counters,
        clock: Clock,
        stop: StopSignal,
    }

    impl EngineHost for CountingHost {
        fn init(&mut self) { self.counters.inits.fetch_add(1, Ordering::SeqCst); }
        fn draw_frame(&mut self, _raw: &[u8]) { self.counters.draws.fetch_add(1, Ordering::SeqCst); }
        fn sleep_ms(&mut self, ms: u32) { self.clock.sleep(ms as u64, &self.stop); }
        fn tick_ms(&mut self) -> u32 { self.clock.now_ms() as u32 }
        fn get_key(&mut self) -> u16 {
            self.counters.keys.fetch_add(1, Ordering::SeqCst);
            input::NO_EVENT
        }
        fn set_window_title(&mut self, _title: &str) {}
    }

    #[derive(Clone, Copy)]
    enum Script {
        Steady,
        FailCreate,
        PanicCreate,
        FailAt(u64),
        PanicAt(u64),
        SleepLong,
    }

    struct ScriptedEngine {
        script: Script,
        ticks: u64,
    }

    impl Engine for ScriptedEngine {
        fn create(&mut self, _args: &[String], host: &mut dyn EngineHost) -> Result<(), EngineError> {
            match self.script {
                Script::FailCreate => Err(EngineError::Fault("sin datos".into())),
                Script::PanicCreate => panic!("boom en create"),
                _ => {
                    host.init();
                    Ok(())
                }
            }
        }

        fn tick(&mut self, host: &mut dyn EngineHost) -> Result<(), EngineError> {
            self.ticks += 1;
            match self.script {
                Script::FailAt(n) if self.ticks == n => return Err(EngineError::Fault("tick roto".into())),
                Script::PanicAt(n) if self.ticks == n => panic!("boom en tick"),
                Script::SleepLong => host.sleep_ms(60_000),
                _ => host.sleep_ms(1),
            }
            host.get_key();
            host.draw_frame(&[0; 4]);
            Ok(())
        }
    }

    fn start(script: Script) -> (Result<EngineDriver, DriverError>, Counters) {
        let counters = Counters::default();
        let stop = StopSignal::new();
        let host = CountingHost {
            counters: counters.clone(),
            clock: Clock::new(),
            stop: stop.clone(),
        };
        let engine = ScriptedEngine { script, ticks: 0 };
        let driver = EngineDriver::start(Box::new(engine), Box::new(host), vec!["test".into()], stop);
        (driver, counters)
    }

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "la condición no se cumplió a tiempo");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_start_runs_and_stop_freezes_callbacks() {
        let (driver, counters) = start(Script::Steady);
        let mut driver = driver.unwrap();
        assert_eq!(driver.state(), DriverState::Running);
        assert_eq!(counters.inits.load(Ordering::SeqCst), 1);

        wait_until(|| driver.ticks() >= 5);
        driver.stop();
        assert_eq!(driver.state(), DriverState::Stopped);
        assert!(driver.is_finished());

        let draws = counters.draws.load(Ordering::SeqCst);
        let keys = counters.keys.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(counters.draws.load(Ordering::SeqCst), draws);
        assert_eq!(counters.keys.load(Ordering::SeqCst), keys);

        // Segunda parada: sin efecto
        driver.stop();
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    #[test]
    fn test_create_failure_is_reported() {
        let (driver, counters) = start(Script::FailCreate);
        assert!(matches!(driver, Err(DriverError::Init(EngineError::Fault(_)))));
        assert_eq!(counters.draws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_create_panic_is_reported() {
        let (driver, _) = start(Script::PanicCreate);
        match driver {
            Err(DriverError::Init(EngineError::Panicked(msg))) => assert!(msg.contains("boom")),
            other => panic!("resultado inesperado: {:?}", other.map(|d| d.state())),
        }
    }

    #[test]
    fn test_tick_error_stops_driver() {
        let (driver, counters) = start(Script::FailAt(3));
        let driver = driver.unwrap();
        wait_until(|| driver.is_finished());
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.ticks(), 2);
        assert_eq!(counters.draws.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_tick_panic_stops_driver() {
        let (driver, counters) = start(Script::PanicAt(1));
        let driver = driver.unwrap();
        wait_until(|| driver.is_finished());
        assert_eq!(driver.state(), DriverState::Stopped);
        assert_eq!(driver.ticks(), 0);
        assert_eq!(counters.draws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_interrupts_long_sleep() {
        let (driver, _) = start(Script::SleepLong);
        let mut driver = driver.unwrap();
        thread::sleep(Duration::from_millis(20));

        let before = Instant::now();
        driver.stop();
        assert!(before.elapsed() < Duration::from_secs(5));
        assert_eq!(driver.state(), DriverState::Stopped);
    }

    /// Host que avisa al entrar en `sleep_ms` y, una vez despertado por la
    /// parada, se queda retenido hasta que el test lo suelte.
    struct BlockingHost {
        clock: Clock,
        stop: StopSignal,
        entered: crossbeam_channel::Sender<()>,
        release: crossbeam_channel::Receiver<()>,
    }

    impl EngineHost for BlockingHost {
        fn init(&mut self) {}
        fn draw_frame(&mut self, _raw: &[u8]) {}
        fn sleep_ms(&mut self, ms: u32) {
            let _ = self.entered.send(());
            self.clock.sleep(ms as u64, &self.stop);
            let _ = self.release.recv();
        }
        fn tick_ms(&mut self) -> u32 { self.clock.now_ms() as u32 }
        fn get_key(&mut self) -> u16 { input::NO_EVENT }
        fn set_window_title(&mut self, _title: &str) {}
    }

    #[test]
    fn test_state_is_stopping_while_tick_finishes() {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let stop = StopSignal::new();
        let host = BlockingHost {
            clock: Clock::new(),
            stop: stop.clone(),
            entered: entered_tx,
            release: release_rx,
        };
        let engine = ScriptedEngine { script: Script::SleepLong, ticks: 0 };
        let mut driver = EngineDriver::start(Box::new(engine), Box::new(host), vec!["test".into()], stop).unwrap();

        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let status = driver.status();
        assert_eq!(status.state(), DriverState::Running);

        let stopper = thread::spawn(move || {
            driver.stop();
            driver.state()
        });

        // El tick sigue dentro del host: el driver está parando, no parado
        wait_until(|| status.state() == DriverState::Stopping);
        assert!(!stopper.is_finished());

        release_tx.send(()).unwrap();
        assert_eq!(stopper.join().unwrap(), DriverState::Stopped);
        assert_eq!(status.state(), DriverState::Stopped);
    }

    #[test]
    fn test_drop_stops_thread() {
        let (driver, counters) = start(Script::Steady);
        let driver = driver.unwrap();
        wait_until(|| driver.ticks() >= 1);
        drop(driver);

        let draws = counters.draws.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(counters.draws.load(Ordering::SeqCst), draws);
    }
}
