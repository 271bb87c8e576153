//! Tipos de erro do `cner-core`.
//!
//! Só existem duas fontes reais de falha no pipeline:
//! - o corpus de treino (tokens sem o delimitador `palavra/POS`);
//! - o classificador externo (falha de inferência ou resposta desalinhada).
//!
//! Texto vazio **não** é erro: o reconhecimento devolve uma lista vazia.

use thiserror::Error;

/// Alias de `Result` para as operações do crate.
pub type Result<T> = std::result::Result<T, NerError>;

/// Erros do pipeline NER.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum NerError {
    /// Token do corpus sem o delimitador `/` entre palavra e POS.
    #[error("Token de corpus malformado (esperado `palavra/POS`): {0:?}")]
    MalformedToken(String),

    /// O classificador falhou ou devolveu uma sequência desalinhada.
    #[error("Falha no classificador: {0}")]
    Classifier(String),

    /// Artefato de modelo inválido.
    #[error("Falha ao carregar modelo: {0}")]
    ModelLoad(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl NerError {
    pub fn malformed_token(token: impl Into<String>) -> Self {
        NerError::MalformedToken(token.into())
    }

    pub fn classifier(msg: impl Into<String>) -> Self {
        NerError::Classifier(msg.into())
    }

    pub fn model_load(msg: impl Into<String>) -> Self {
        NerError::ModelLoad(msg.into())
    }
}
