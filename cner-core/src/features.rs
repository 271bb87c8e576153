//! # Features em Janela Deslizante por Caractere
//!
//! Cada caractere é descrito pelo seu contexto imediato: o caractere
//! anterior, ele próprio, o seguinte e os dois bigramas formados. A sequência
//! recebe sentinelas `<BOS>`/`<EOS>` nas pontas para que o primeiro e o último
//! caractere também tenham vizinhos.
//!
//! ```text
//! ['<BOS>', '迈', '向', '<EOS>']
//!     janela 0: ['<BOS>', '迈', '向']  → w-1=<BOS> w=迈 w+1=向 w-1:w=<BOS>迈 w:w+1=迈向 bias=1.0
//!     janela 1: ['迈', '向', '<EOS>']  → w-1=迈 w=向 w+1=<EOS> w-1:w=迈向 w:w+1=向<EOS> bias=1.0
//! ```
//!
//! O mesmo extrator serve ao treino (corpus codificado) e à inferência (texto
//! bruto normalizado), o que garante que o modelo veja features equivalentes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinela de início de sequência
pub const BOS: &str = "<BOS>";
/// Sentinela de fim de sequência
pub const EOS: &str = "<EOS>";
/// Largura da janela: anterior, atual, seguinte
pub const WINDOW: usize = 3;

pub const KEY_PREV: &str = "w-1";
pub const KEY_CURRENT: &str = "w";
pub const KEY_NEXT: &str = "w+1";
pub const KEY_PREV_BIGRAM: &str = "w-1:w";
pub const KEY_NEXT_BIGRAM: &str = "w:w+1";
pub const KEY_BIAS: &str = "bias";

/// Valor de uma feature: texto (caractere ou bigrama) ou número (`bias`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Text(String),
    Number(f64),
}

/// Mapa de features de um caractere.
///
/// Construído uma vez por caractere e consumido pelo classificador.
/// Serializa como um objeto JSON plano (`{"bias": 1.0, "w": "迈", ...}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMap {
    entries: BTreeMap<String, FeatureValue>,
}

impl FeatureMap {
    /// Constrói o mapa a partir de uma janela (anterior, atual, seguinte).
    pub fn from_window(prev: &str, current: &str, next: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(KEY_PREV.to_string(), FeatureValue::Text(prev.to_string()));
        entries.insert(KEY_CURRENT.to_string(), FeatureValue::Text(current.to_string()));
        entries.insert(KEY_NEXT.to_string(), FeatureValue::Text(next.to_string()));
        entries.insert(
            KEY_PREV_BIGRAM.to_string(),
            FeatureValue::Text(format!("{prev}{current}")),
        );
        entries.insert(
            KEY_NEXT_BIGRAM.to_string(),
            FeatureValue::Text(format!("{current}{next}")),
        );
        entries.insert(KEY_BIAS.to_string(), FeatureValue::Number(1.0));
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.entries.get(key)
    }

    /// Valor textual de uma feature (None para ausentes ou numéricas)
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            FeatureValue::Text(s) => Some(s),
            FeatureValue::Number(_) => None,
        }
    }

    /// Valor numérico de uma feature (None para ausentes ou textuais)
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Achata o mapa em atributos `(nome, peso)` no formato CRFsuite.
    ///
    /// - valor textual → `"chave=valor"` com peso 1.0
    /// - valor numérico → `"chave"` com o próprio valor
    ///
    /// Ex: `{"w": "迈", "bias": 1.0}` → `[("bias", 1.0), ("w=迈", 1.0)]`
    pub fn attributes(&self) -> Vec<(String, f64)> {
        self.iter()
            .map(|(key, value)| match value {
                FeatureValue::Text(s) => (format!("{key}={s}"), 1.0),
                FeatureValue::Number(v) => (key.to_string(), *v),
            })
            .collect()
    }
}

/// Envolve os caracteres com as sentinelas `<BOS>` e `<EOS>`.
pub fn pad_sequence(chars: &[char]) -> Vec<String> {
    let mut padded = Vec::with_capacity(chars.len() + 2);
    padded.push(BOS.to_string());
    padded.extend(chars.iter().map(char::to_string));
    padded.push(EOS.to_string());
    padded
}

/// Corta `seq` em janelas de tamanho `window`, com passo 1.
///
/// Sequências menores que a janela (ou janela 0) produzem zero janelas.
pub fn segment_by_window<T>(seq: &[T], window: usize) -> Vec<&[T]> {
    if window == 0 {
        return Vec::new();
    }
    seq.windows(window).collect()
}

/// Extrai um [`FeatureMap`] por posição interna de uma sequência já com
/// sentinelas. O resultado tem `len - 2` itens (zero se `len < 3`).
pub fn extract_features<S: AsRef<str>>(padded: &[S]) -> Vec<FeatureMap> {
    segment_by_window(padded, WINDOW)
        .into_iter()
        .map(|w| FeatureMap::from_window(w[0].as_ref(), w[1].as_ref(), w[2].as_ref()))
        .collect()
}

/// Atalho: sentinelas + janela + features para uma sentença de caracteres.
///
/// Produz exatamente um mapa por caractere, na mesma ordem.
pub fn sentence_features(chars: &[char]) -> Vec<FeatureMap> {
    extract_features(&pad_sequence(chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_segmentation() {
        let seq = [BOS, "a", "b", EOS];
        let windows = segment_by_window(&seq, WINDOW);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0], &[BOS, "a", "b"]);
        assert_eq!(windows[1], &["a", "b", EOS]);
    }

    #[test]
    fn test_short_sequences_yield_no_windows() {
        assert!(segment_by_window(&[BOS, EOS], WINDOW).is_empty());
        assert!(segment_by_window(&["a", "b", "c"], 0).is_empty());
        assert!(extract_features(&[BOS, EOS]).is_empty());
    }

    #[test]
    fn test_feature_map_keys() {
        let features = extract_features(&[BOS, "a", "b", EOS]);
        assert_eq!(features.len(), 2);

        let first = &features[0];
        assert_eq!(first.len(), 6);
        assert_eq!(first.text(KEY_PREV), Some(BOS));
        assert_eq!(first.text(KEY_CURRENT), Some("a"));
        assert_eq!(first.text(KEY_NEXT), Some("b"));
        assert_eq!(first.text(KEY_PREV_BIGRAM), Some("<BOS>a"));
        assert_eq!(first.text(KEY_NEXT_BIGRAM), Some("ab"));
        assert_eq!(first.number(KEY_BIAS), Some(1.0));

        let second = &features[1];
        assert_eq!(second.text(KEY_CURRENT), Some("b"));
        assert_eq!(second.text(KEY_NEXT), Some(EOS));
        assert_eq!(second.text(KEY_NEXT_BIGRAM), Some("b<EOS>"));
    }

    #[test]
    fn test_sentence_features_one_per_char() {
        let chars: Vec<char> = "迈向充满希望".chars().collect();
        let features = sentence_features(&chars);
        assert_eq!(features.len(), chars.len());
        assert_eq!(features[2].text(KEY_PREV_BIGRAM), Some("向充"));
        assert_eq!(features[2].text(KEY_NEXT_BIGRAM), Some("充满"));
    }

    #[test]
    fn test_attributes_crfsuite_format() {
        let fm = FeatureMap::from_window(BOS, "迈", "向");
        let attrs = fm.attributes();
        assert!(attrs.contains(&("bias".to_string(), 1.0)));
        assert!(attrs.contains(&("w=迈".to_string(), 1.0)));
        assert!(attrs.contains(&("w-1:w=<BOS>迈".to_string(), 1.0)));
    }

    #[test]
    fn test_feature_map_get_and_iter() {
        let fm = FeatureMap::from_window("a", "b", "c");
        assert_eq!(fm.get(KEY_BIAS), Some(&FeatureValue::Number(1.0)));
        assert_eq!(fm.get(KEY_CURRENT), Some(&FeatureValue::Text("b".into())));
        assert_eq!(fm.get("inexistente"), None);
        assert_eq!(fm.text(KEY_BIAS), None);

        // Ordem do BTreeMap: chaves ordenadas
        let keys: Vec<&str> = fm.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["bias", "w", "w+1", "w-1", "w-1:w", "w:w+1"]);
    }

    #[test]
    fn test_feature_map_json_is_flat() {
        let fm = FeatureMap::from_window("a", "b", "c");
        let json = serde_json::to_value(&fm).unwrap();
        assert_eq!(json["w"], "b");
        assert_eq!(json["bias"], 1.0);
        let back: FeatureMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, fm);
    }
}
