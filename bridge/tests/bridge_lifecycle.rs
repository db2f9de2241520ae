// bridge/tests/bridge_lifecycle.rs

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use bridge::{Bridge, BridgeConfig, BridgeError, UNKNOWN_TITLE};
use driver::{DriverError, DriverState};
use engine::{Engine, EngineError, EngineHost, TestCard};
use input::vk;
use parking_lot::Mutex;

const W: usize = 8;
const H: usize = 4;

/// Lo que el motor de prueba ha visto desde su hilo.
#[derive(Clone, Default)]
struct Recorder {
    keys: Arc<Mutex<Vec<u16>>>,
    draws: Arc<AtomicUsize>,
    polls: Arc<AtomicUsize>,
    args: Arc<Mutex<Vec<String>>>,
}

struct RecordingEngine {
    recorder: Recorder,
    fail_create: bool,
    fail_at: Option<usize>,
    ignore_keys: bool,
    ticks: usize,
}

impl RecordingEngine {
    fn new(recorder: &Recorder) -> Self {
        Self { recorder: recorder.clone(), fail_create: false, fail_at: None, ignore_keys: false, ticks: 0 }
    }
}

impl Engine for RecordingEngine {
    fn create(&mut self, args: &[String], host: &mut dyn EngineHost) -> Result<(), EngineError> {
        *self.recorder.args.lock() = args.to_vec();
        if self.fail_create {
            return Err(EngineError::Fault("motor no disponible".into()));
        }
        host.init();
        host.set_window_title("Recorder");
        Ok(())
    }

    fn tick(&mut self, host: &mut dyn EngineHost) -> Result<(), EngineError> {
        self.ticks += 1;
        if self.fail_at == Some(self.ticks) {
            return Err(EngineError::Fault("tick roto".into()));
        }
        while !self.ignore_keys {
            self.recorder.polls.fetch_add(1, Ordering::SeqCst);
            let key = host.get_key();
            if key == input::NO_EVENT {
                break;
            }
            self.recorder.keys.lock().push(key);
        }
        let raw: Vec<u8> = 0x0011_2233u32.to_le_bytes().repeat(W * H);
        host.draw_frame(&raw);
        self.recorder.draws.fetch_add(1, Ordering::SeqCst);
        host.sleep_ms(1);
        Ok(())
    }
}

fn data_file(name: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("bridge-{}-{}", std::process::id(), name));
    fs::write(&path, b"IWAD").unwrap();
    path
}

fn config(path: &PathBuf) -> BridgeConfig {
    let mut config = BridgeConfig::new(path);
    config.width = W;
    config.height = H;
    config
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "la condición no se cumplió a tiempo");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_keys_reach_engine_in_order() {
    let path = data_file("keys.wad");
    let recorder = Recorder::default();
    let mut bridge = Bridge::start(Box::new(RecordingEngine::new(&recorder)), config(&path)).unwrap();

    assert!(bridge.handle_key_down(vk::ENTER));
    assert!(bridge.handle_key_up(vk::ENTER));
    assert!(bridge.handle_key_down(b'Y' as u32));
    assert!(!bridge.handle_key_down(222));

    wait_until(|| recorder.keys.lock().len() == 3);
    assert_eq!(*recorder.keys.lock(), vec![269, 13, 0x100 | b'y' as u16]);
    assert_eq!(bridge.pending_keys(), 0);

    bridge.dispose();
    fs::remove_file(path).ok();
}

#[test]
fn test_frames_and_title_are_published() {
    let path = data_file("frames.wad");
    let recorder = Recorder::default();
    let mut bridge = Bridge::start(Box::new(RecordingEngine::new(&recorder)), config(&path)).unwrap();

    assert_eq!(bridge.driver_state(), DriverState::Running);
    // create() ya terminó: el título está puesto antes de devolver
    assert_eq!(bridge.window_title(), "Recorder");

    let args = recorder.args.lock().clone();
    assert_eq!(args, vec!["kdoom".to_string(), "-iwad".to_string(), path.to_string_lossy().into_owned()]);

    wait_until(|| bridge.current_frame().sequence() > 0);
    let frame = bridge.current_frame();
    assert_eq!((frame.width(), frame.height()), (W, H));
    assert!(frame.pixels().iter().all(|p| *p == 0xFF11_2233));

    bridge.dispose();
    fs::remove_file(path).ok();
}

#[test]
fn test_dispose_freezes_engine_callbacks() {
    let path = data_file("dispose.wad");
    let recorder = Recorder::default();
    let mut bridge = Bridge::start(Box::new(RecordingEngine::new(&recorder)), config(&path)).unwrap();
    wait_until(|| recorder.draws.load(Ordering::SeqCst) >= 3);

    bridge.dispose();
    assert_eq!(bridge.driver_state(), DriverState::Stopped);

    let draws = recorder.draws.load(Ordering::SeqCst);
    let polls = recorder.polls.load(Ordering::SeqCst);
    let sequence = bridge.current_frame().sequence();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(recorder.draws.load(Ordering::SeqCst), draws);
    assert_eq!(recorder.polls.load(Ordering::SeqCst), polls);
    assert_eq!(bridge.current_frame().sequence(), sequence);

    // Las teclas que llegan después se descartan
    assert!(!bridge.handle_key_down(vk::ESCAPE));
    assert!(!bridge.handle_key_up(vk::ESCAPE));
    assert_eq!(bridge.pending_keys(), 0);

    bridge.dispose();
    fs::remove_file(path).ok();
}

#[test]
fn test_dispose_clears_unread_keys() {
    let path = data_file("unread.wad");
    let recorder = Recorder::default();
    let mut engine = RecordingEngine::new(&recorder);
    engine.ignore_keys = true;
    let mut bridge = Bridge::start(Box::new(engine), config(&path)).unwrap();

    // El motor no lee la cola: todo se acumula mientras corre
    for _ in 0..10 {
        assert!(bridge.handle_key_down(vk::UP));
        assert!(bridge.handle_key_up(vk::UP));
    }
    assert_eq!(bridge.pending_keys(), 20);

    bridge.dispose();
    assert_eq!(bridge.pending_keys(), 0);
    assert!(recorder.keys.lock().is_empty());
    fs::remove_file(path).ok();
}

#[test]
fn test_keys_after_tick_fault_are_dropped() {
    let path = data_file("after-fault.wad");
    let recorder = Recorder::default();
    let mut engine = RecordingEngine::new(&recorder);
    engine.fail_at = Some(1);
    let bridge = Bridge::start(Box::new(engine), config(&path)).unwrap();

    // El motor cae solo, sin dispose: el host sigue mandando teclas
    wait_until(|| bridge.driver_state() == DriverState::Stopped);
    for _ in 0..10_000 {
        assert!(!bridge.handle_key_down(vk::ENTER));
        assert!(!bridge.handle_key_up(vk::ENTER));
    }
    assert_eq!(bridge.pending_keys(), 0);
    assert!(recorder.keys.lock().is_empty());

    drop(bridge);
    fs::remove_file(path).ok();
}

#[test]
fn test_engine_init_failure_fails_construction() {
    let path = data_file("init.wad");
    let recorder = Recorder::default();
    let mut engine = RecordingEngine::new(&recorder);
    engine.fail_create = true;

    match Bridge::start(Box::new(engine), config(&path)) {
        Err(BridgeError::Driver(DriverError::Init(EngineError::Fault(msg)))) => {
            assert!(msg.contains("no disponible"));
        }
        Err(e) => panic!("error inesperado: {e}"),
        Ok(_) => panic!("el puente no debería arrancar"),
    }
    assert_eq!(recorder.draws.load(Ordering::SeqCst), 0);
    fs::remove_file(path).ok();
}

#[test]
fn test_tick_fault_keeps_last_frame_visible() {
    let path = data_file("fault.wad");
    let recorder = Recorder::default();
    let mut engine = RecordingEngine::new(&recorder);
    engine.fail_at = Some(3);
    let mut bridge = Bridge::start(Box::new(engine), config(&path)).unwrap();

    wait_until(|| bridge.driver_state() == DriverState::Stopped);
    assert_eq!(bridge.ticks(), 2);
    let frame = bridge.current_frame();
    assert_eq!(frame.sequence(), 2);
    assert_eq!(frame.pixel(0, 0), Some(0xFF11_2233));

    bridge.dispose();
    fs::remove_file(path).ok();
}

#[test]
fn test_testcard_runs_behind_the_bridge() {
    let path = data_file("card.wad");
    let config = config(&path);
    let engine = TestCard::new(config.width, config.height);
    let mut bridge = Bridge::start(Box::new(engine), config).unwrap();

    assert_ne!(bridge.window_title(), UNKNOWN_TITLE);
    assert!(bridge.window_title().ends_with("card.wad"));

    wait_until(|| bridge.current_frame().sequence() >= 2);
    bridge.handle_key_down(vk::RIGHT);
    wait_until(|| bridge.pending_keys() == 0);
    bridge.read_frame(|frame| {
        assert!(frame.pixels().iter().all(|p| p >> 24 == 0xFF));
    });

    bridge.dispose();
    assert_eq!(bridge.driver_state(), DriverState::Stopped);
    fs::remove_file(path).ok();
}
