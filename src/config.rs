// src/config.rs

use std::path::PathBuf;

use bridge::BridgeConfig;
use display::PanelConfig;
use thiserror::Error;

/// Variable de entorno alternativa al argumento posicional.
pub const DATA_ENV: &str = "DOOMED_IWAD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("falta el archivo de datos del juego (argumento o variable DOOMED_IWAD)")]
    MissingDataFile,
    #[error("falta el valor de {0}")]
    MissingValue(&'static str),
    #[error("valor inválido para {flag}: {value:?}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("argumento desconocido: {0}")]
    UnknownArgument(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub scale: u32,
    pub repaint_hz: u32,
}

impl AppConfig {
    /// `args` sin `argv[0]`: `<archivo> [--scale N] [--hz N]`.
    /// `env_data` es el valor de `DOOMED_IWAD`, si existe; el argumento manda.
    pub fn from_args(args: &[String], env_data: Option<String>) -> Result<Self, ConfigError> {
        let defaults = PanelConfig::default();
        let mut data_path = None;
        let mut scale = defaults.scale;
        let mut repaint_hz = defaults.repaint_hz;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--scale" => scale = parse_positive("--scale", iter.next())?,
                "--hz" => repaint_hz = parse_positive("--hz", iter.next())?,
                other if other.starts_with("--") => {
                    return Err(ConfigError::UnknownArgument(other.to_string()));
                }
                path if data_path.is_none() => data_path = Some(PathBuf::from(path)),
                extra => return Err(ConfigError::UnknownArgument(extra.to_string())),
            }
        }

        let data_path = data_path
            .or_else(|| env_data.filter(|v| !v.is_empty()).map(PathBuf::from))
            .ok_or(ConfigError::MissingDataFile)?;

        Ok(Self { data_path, scale, repaint_hz })
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::new(&self.data_path)
    }

    pub fn panel_config(&self) -> PanelConfig {
        PanelConfig {
            scale: self.scale,
            repaint_hz: self.repaint_hz,
            ..PanelConfig::default()
        }
    }
}

pub fn usage(program: &str) -> String {
    format!("Uso: {} <archivo_iwad> [--scale N] [--hz N]", program)
}

fn parse_positive(flag: &'static str, value: Option<&String>) -> Result<u32, ConfigError> {
    let value = value.ok_or(ConfigError::MissingValue(flag))?;
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue { flag, value: value.clone() }),
    }
}
