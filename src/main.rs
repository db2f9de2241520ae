use std::env;
use std::process;

use bridge::Bridge;
use engine::TestCard;
use log::{error, info};

mod config;

use config::{AppConfig, DATA_ENV};

fn main() {
    // 1. Logs: nivel "info" salvo que RUST_LOG diga otra cosa
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Leer argumentos de la línea de comandos
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("rust-doomed", String::as_str);
    let config = match AppConfig::from_args(args.get(1..).unwrap_or_default(), env::var(DATA_ENV).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", config::usage(program));
            process::exit(1);
        }
    };

    info!("Cargando datos del juego: {}", config.data_path.display());

    // 3. Ensamblaje: motor + puente. Si el motor no arranca, no hay panel.
    let bridge_config = config.bridge_config();
    let engine = TestCard::new(bridge_config.width, bridge_config.height);
    let bridge = match Bridge::start(Box::new(engine), bridge_config) {
        Ok(bridge) => bridge,
        Err(e) => {
            error!("No se pudo iniciar el motor: {}", e);
            process::exit(1);
        }
    };

    info!("Sistema ensamblado. Iniciando panel...");

    // 4. Transferir control al panel (bucle de eventos hasta cerrar la ventana)
    if let Err(e) = display::run(bridge, config.panel_config()) {
        error!("Error en el panel: {}", e);
        process::exit(1);
    }
}
