//! # Pipeline NER — Texto Bruto → Entidades
//!
//! ```text
//! texto → normalização → caracteres → <BOS>…<EOS> → janelas → features
//!       → classificador → tags → fusão BIO → entidades
//! ```
//!
//! O classificador é injetado uma única vez na construção e reutilizado em
//! todas as chamadas. Cada chamada é independente: não há estado mutável
//! entre requisições, então `NerPipeline<C>` pode ser compartilhado entre
//! threads sempre que `C: Sync`.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::classifier::SequenceClassifier;
use crate::error::{NerError, Result};
use crate::features::sentence_features;
use crate::normalize::to_half_width;
use crate::tagger::{merge_entities, EntitySpan, TaggedChar};

/// Resultado completo de uma análise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Cada caractere (já normalizado) com a tag prevista
    pub characters: Vec<TaggedChar>,
    pub entities: Vec<EntitySpan>,
    pub processing_ms: u64,
}

/// O pipeline NER principal, dono do classificador.
pub struct NerPipeline<C> {
    classifier: C,
}

impl<C: SequenceClassifier> NerPipeline<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Reconhece as entidades de `text`.
    ///
    /// Texto vazio devolve lista vazia; falhas do classificador sobem intactas.
    pub fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        Ok(self.analyze(text)?.entities)
    }

    /// Igual a [`recognize`](Self::recognize), mas devolve também as tags por
    /// caractere e o tempo de processamento.
    #[instrument(level = "debug", skip_all, fields(chars = text.chars().count()))]
    pub fn analyze(&self, text: &str) -> Result<Analysis> {
        let start = Instant::now();

        let normalized = to_half_width(text);
        let chars: Vec<char> = normalized.chars().collect();
        if chars.is_empty() {
            return Ok(Analysis {
                characters: vec![],
                entities: vec![],
                processing_ms: 0,
            });
        }

        let features = sentence_features(&chars);
        let tags = single_sequence(
            self.classifier.predict(std::slice::from_ref(&features))?,
            chars.len(),
        )?;

        let entities = merge_entities(&chars, &tags);
        debug!(entities = entities.len(), "análise concluída");

        let characters = chars
            .into_iter()
            .zip(tags)
            .map(|(character, tag)| TaggedChar { character, tag })
            .collect();

        Ok(Analysis {
            characters,
            entities,
            processing_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Confere que o classificador respondeu uma sequência com `expected` tags
fn single_sequence(mut predicted: Vec<Vec<String>>, expected: usize) -> Result<Vec<String>> {
    if predicted.len() != 1 {
        return Err(NerError::classifier(format!(
            "esperada 1 sequência de tags, recebidas {}",
            predicted.len()
        )));
    }
    let tags = predicted.remove(0);
    if tags.len() != expected {
        return Err(NerError::classifier(format!(
            "esperadas {expected} tags (uma por caractere), recebidas {}",
            tags.len()
        )));
    }
    Ok(tags)
}

/// Ponto de entrada de inferência: `recognize(text) -> [(entidade, tags)]`.
pub fn recognize<C>(classifier: &C, text: &str) -> Result<Vec<EntitySpan>>
where
    C: SequenceClassifier + ?Sized,
{
    NerPipeline::new(classifier).recognize(text)
}
