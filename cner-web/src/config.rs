//! Configuração do servidor via variáveis de ambiente (e `.env`, se existir).
//!
//! | Variável          | Padrão         |
//! |-------------------|----------------|
//! | `CNER_BIND_ADDR`  | `0.0.0.0:3000` |
//! | `CNER_MODEL_PATH` | obrigatória    |
//! | `RUST_LOG`        | `info`         |

use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub struct Config {
    pub bind_addr: String,
    /// `.json` → pesos do CRF em memória; outra extensão → modelo CRFsuite
    pub model_path: PathBuf,
    log_filter: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bind_addr =
            std::env::var("CNER_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let model_path = std::env::var("CNER_MODEL_PATH")
            .map(PathBuf::from)
            .context("CNER_MODEL_PATH não definida (caminho do modelo .crfsuite ou .json)")?;

        Ok(Self {
            bind_addr,
            model_path,
            log_filter: std::env::var("RUST_LOG").ok(),
        })
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
