// clock/src/lib.rs

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::warn;
use parking_lot::{Condvar, Mutex};

/// Resultado de una espera en `Clock::sleep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// Se durmió el intervalo completo.
    Completed,
    /// Alguien pidió parar mientras esperábamos: despertamos antes.
    Interrupted,
}

/// Reloj del motor.
/// El instante de arranque se captura una sola vez y nunca cambia;
/// los milisegundos transcurridos son un valor derivado.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Milisegundos desde la construcción. `Instant` es monótono, así que nunca retrocede.
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Suspende el hilo llamante al menos `ms` milisegundos.
    ///
    /// Si `stop` se activa durante la espera, volvemos antes y la petición
    /// queda pendiente (no se consume) para que el bucle del motor la vea.
    pub fn sleep(&self, ms: u64, stop: &StopSignal) -> SleepOutcome {
        if stop.wait_for(Duration::from_millis(ms)) {
            warn!(
                "sleep interrumpido en el hilo {}",
                thread::current().name().unwrap_or("<sin nombre>")
            );
            return SleepOutcome::Interrupted;
        }
        SleepOutcome::Completed
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Petición de parada cooperativa compartida entre el host y el hilo del motor.
/// Clonar la señal comparte el mismo estado interno.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<SignalInner>,
}

#[derive(Debug, Default)]
struct SignalInner {
    requested: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marca la parada y despierta a cualquiera que esté esperando.
    pub fn request(&self) {
        let mut requested = self.inner.requested.lock();
        *requested = true;
        self.inner.wake.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        *self.inner.requested.lock()
    }

    /// Espera hasta `timeout` o hasta que se pida parar.
    /// Devuelve `true` si la parada está pedida.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        // Plazo absoluto: si hay despertares espurios, volver a esperar
        // no alarga el sleep total.
        let deadline = Instant::now() + timeout;
        let mut requested = self.inner.requested.lock();
        // El condvar puede despertar sin aviso real, por eso se vuelve a mirar la bandera.
        while !*requested {
            if self.inner.wake.wait_until(&mut requested, deadline).timed_out() {
                // Plazo vencido. Devolvemos la bandera por si `request()` llegó
                // justo en el límite.
                return *requested;
            }
        }
        // Nunca se limpia: la petición queda marcada para el bucle del driver.
        true
    }
}
