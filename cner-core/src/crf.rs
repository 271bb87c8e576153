//! # CRF — Conditional Random Field Linear-Chain
//!
//! Implementação em memória de um CRF linear sobre o conjunto fechado de 9
//! tags (`O`, `B_T`, `I_T`, `B_PER`, ...). Serve como alternativa ao modelo
//! CRFsuite quando os pesos vêm de um JSON (testes, demonstrações, modelos
//! exportados).
//!
//! ## Estrutura do Modelo
//!
//! ```text
//! score(y, x) = Σ_i [emission_score(y_i, x_i) + transition_score(y_{i-1}, y_i)]
//! emission_score(y, x_i) = Σ_k peso("atributo_k|y") * valor_k
//! ```
//!
//! Os atributos são os mesmos que [`FeatureMap::attributes`] gera para o
//! CRFsuite (`w=迈`, `w-1:w=<BOS>迈`, `bias`, ...).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::SequenceClassifier;
use crate::error::{NerError, Result};
use crate::features::FeatureMap;
use crate::tagger::Tag;
use crate::viterbi::viterbi_decode;

/// Modelo CRF com pesos definidos
///
/// - `emission_weights`: `"atributo|rótulo"` → peso
/// - `transition_weights`: matriz `[tag_prev][tag_next]` indexada por [`Tag::index`]
///
/// Toda desserialização passa pela validação das dimensões, inclusive via
/// `serde` direto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CrfWeights")]
pub struct CrfModel {
    emission_weights: HashMap<String, f64>,
    transition_weights: Vec<Vec<f64>>,
}

/// Forma bruta do JSON, antes da validação
#[derive(Deserialize)]
struct CrfWeights {
    emission_weights: HashMap<String, f64>,
    transition_weights: Vec<Vec<f64>>,
}

impl TryFrom<CrfWeights> for CrfModel {
    type Error = NerError;

    fn try_from(raw: CrfWeights) -> Result<Self> {
        let n = Tag::COUNT;
        if raw.transition_weights.len() != n
            || raw.transition_weights.iter().any(|row| row.len() != n)
        {
            return Err(NerError::model_load(format!(
                "matriz de transição deve ser {n}x{n}"
            )));
        }
        Ok(Self {
            emission_weights: raw.emission_weights,
            transition_weights: raw.transition_weights,
        })
    }
}

impl CrfModel {
    /// Cria um modelo CRF com pesos zerados
    pub fn new() -> Self {
        let n = Tag::COUNT;
        Self {
            emission_weights: HashMap::new(),
            transition_weights: vec![vec![0.0f64; n]; n],
        }
    }

    /// Lê pesos de um JSON, validando as dimensões da matriz de transição.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: CrfWeights = serde_json::from_str(json)?;
        CrfModel::try_from(raw)
    }

    /// Lê pesos de um arquivo JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Score de emissão de uma tag para um caractere
    ///
    /// `score = Σ_k w_{k, tag} * f_k`
    pub fn emission_score(&self, features: &FeatureMap, tag: &Tag) -> f64 {
        let tag_label = tag.label();
        features
            .attributes()
            .iter()
            .map(|(name, value)| {
                let key = format!("{name}|{tag_label}");
                value * self.emission_weights.get(&key).unwrap_or(&0.0)
            })
            .sum()
    }

    pub fn transition_score(&self, prev: &Tag, next: &Tag) -> f64 {
        self.transition_weights[prev.index()][next.index()]
    }

    /// Configura um peso de emissão para um atributo (`"w=京"`, `"bias"`, ...)
    pub fn set_emission(&mut self, attribute: &str, tag: &Tag, weight: f64) {
        let key = format!("{attribute}|{}", tag.label());
        self.emission_weights.insert(key, weight);
    }

    pub fn set_transition(&mut self, from: &Tag, to: &Tag, weight: f64) {
        self.transition_weights[from.index()][to.index()] = weight;
    }
}

impl Default for CrfModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Scores de emissão `[caractere][tag]` para uma sequência
pub fn compute_emission_scores(model: &CrfModel, features: &[FeatureMap]) -> Vec<Vec<f64>> {
    let tags = Tag::all();
    features
        .iter()
        .map(|fm| tags.iter().map(|tag| model.emission_score(fm, tag)).collect())
        .collect()
}

impl SequenceClassifier for CrfModel {
    fn predict(&self, sequences: &[Vec<FeatureMap>]) -> Result<Vec<Vec<String>>> {
        Ok(sequences
            .iter()
            .map(|seq| {
                viterbi_decode(self, seq)
                    .best_sequence
                    .iter()
                    .map(Tag::label)
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sentence_features;
    use crate::tagger::EntityCategory;

    #[test]
    fn test_emission_score_positive() {
        let mut model = CrfModel::new();
        let tag = Tag::Begin(EntityCategory::Loc);
        model.set_emission("w=京", &tag, 2.5);

        let fm = &sentence_features(&['京'])[0];
        assert!((model.emission_score(fm, &tag) - 2.5).abs() < 1e-9);
        assert!(model.emission_score(fm, &Tag::Outside).abs() < 1e-9);
    }

    #[test]
    fn test_bias_weight_applies_everywhere() {
        let mut model = CrfModel::new();
        model.set_emission("bias", &Tag::Outside, 0.5);
        for fm in sentence_features(&['a', 'b', 'c']) {
            assert!((model.emission_score(&fm, &Tag::Outside) - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_transition_score() {
        let mut model = CrfModel::new();
        let b_per = Tag::Begin(EntityCategory::Per);
        let i_per = Tag::Inside(EntityCategory::Per);
        model.set_transition(&b_per, &i_per, 3.0);

        assert!((model.transition_score(&b_per, &i_per) - 3.0).abs() < 1e-9);
        assert!(model.transition_score(&Tag::Outside, &i_per).abs() < 1e-9);
    }

    #[test]
    fn test_json_roundtrip_and_validation() {
        let mut model = CrfModel::new();
        model.set_emission("w=京", &Tag::Begin(EntityCategory::Loc), 1.0);
        let back = CrfModel::from_json(&model.to_json().unwrap()).unwrap();
        assert_eq!(back.emission_weights, model.emission_weights);

        let bad = r#"{"emission_weights": {}, "transition_weights": [[0.0]]}"#;
        assert!(matches!(CrfModel::from_json(bad), Err(NerError::ModelLoad(_))));
        assert!(matches!(CrfModel::from_json("{"), Err(NerError::Json(_))));
    }

    #[test]
    fn test_serde_deserialize_validates_dimensions() {
        let bad = serde_json::json!({
            "emission_weights": {},
            "transition_weights": [[0.0, 1.0], [1.0, 0.0]]
        });
        let err = serde_json::from_value::<CrfModel>(bad).unwrap_err();
        assert!(err.to_string().contains("9x9"));

        let good = serde_json::to_value(CrfModel::new()).unwrap();
        let model: CrfModel = serde_json::from_value(good).unwrap();
        assert!(model.transition_score(&Tag::Outside, &Tag::Outside).abs() < 1e-9);
    }

    #[test]
    fn test_predict_shapes() {
        let model = CrfModel::new();
        let input = vec![sentence_features(&['一', '二']), Vec::new()];
        let output = model.predict(&input).unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].len(), 2);
        assert!(output[1].is_empty());
    }
}
