//! # Classificador de Sequências (colaborador externo)
//!
//! O modelo estatístico é tratado como caixa-preta: recebe sequências de
//! [`FeatureMap`] e devolve, para cada uma, uma tag por caractere.
//!
//! Implementações disponíveis:
//! - [`CrfsuiteClassifier`]: modelo binário CRFsuite (o formato gerado por
//!   `sklearn-crfsuite`/`python-crfsuite`), lido pelo crate `crfs`.
//! - [`crate::crf::CrfModel`]: CRF linear em memória, com pesos em JSON.
//!
//! ## Concorrência
//!
//! O pipeline só usa `&self`. Para chamar o mesmo classificador de várias
//! threads a implementação precisa ser `Sync`; o núcleo não garante isso.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::crf::CrfModel;
use crate::error::{NerError, Result};
use crate::features::FeatureMap;

/// Capacidade consumida pelo pipeline: `predict(features) -> tags`.
///
/// Contrato: a saída tem o mesmo número de sequências da entrada, na mesma
/// ordem, e cada sequência tem exatamente uma tag por [`FeatureMap`].
pub trait SequenceClassifier {
    fn predict(&self, sequences: &[Vec<FeatureMap>]) -> Result<Vec<Vec<String>>>;
}

impl<C: SequenceClassifier + ?Sized> SequenceClassifier for &C {
    fn predict(&self, sequences: &[Vec<FeatureMap>]) -> Result<Vec<Vec<String>>> {
        (**self).predict(sequences)
    }
}

impl<C: SequenceClassifier + ?Sized> SequenceClassifier for Box<C> {
    fn predict(&self, sequences: &[Vec<FeatureMap>]) -> Result<Vec<Vec<String>>> {
        (**self).predict(sequences)
    }
}

impl<C: SequenceClassifier + ?Sized> SequenceClassifier for Arc<C> {
    fn predict(&self, sequences: &[Vec<FeatureMap>]) -> Result<Vec<Vec<String>>> {
        (**self).predict(sequences)
    }
}

/// Classificador compartilhável entre threads
pub type SharedClassifier = Box<dyn SequenceClassifier + Send + Sync>;

/// Converte um mapa de features em atributos do `crfs`
fn to_attributes(features: &FeatureMap) -> Vec<crfs::Attribute> {
    features
        .attributes()
        .into_iter()
        .map(|(name, value)| crfs::Attribute::new(name, value))
        .collect()
}

/// Adaptador para modelos CRFsuite.
///
/// O arquivo é lido e validado uma única vez, em [`open`](Self::open) ou
/// [`from_bytes`](Self::from_bytes). Como `crfs::Model` empresta os bytes,
/// cada chamada a `predict` remonta a visão do modelo sobre o buffer já
/// carregado (só cabeçalho e índices, sem cópia nem I/O) e cria um tagger
/// novo, já que `Tagger::tag` exige `&mut`.
pub struct CrfsuiteClassifier {
    model_data: Vec<u8>,
}

impl CrfsuiteClassifier {
    /// Valida e adota os bytes de um modelo CRFsuite.
    pub fn from_bytes(model_data: Vec<u8>) -> Result<Self> {
        crfs::Model::new(&model_data)
            .map_err(|e| NerError::model_load(format!("modelo CRFsuite inválido: {e}")))?;
        Ok(Self { model_data })
    }

    /// Lê o modelo de um arquivo `.crfsuite`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        info!(path = %path.as_ref().display(), bytes = data.len(), "modelo CRFsuite carregado");
        Self::from_bytes(data)
    }
}

impl SequenceClassifier for CrfsuiteClassifier {
    fn predict(&self, sequences: &[Vec<FeatureMap>]) -> Result<Vec<Vec<String>>> {
        let model = crfs::Model::new(&self.model_data)
            .map_err(|e| NerError::classifier(e.to_string()))?;
        let mut tagger = model
            .tagger()
            .map_err(|e| NerError::classifier(e.to_string()))?;

        let mut output = Vec::with_capacity(sequences.len());
        for seq in sequences {
            if seq.is_empty() {
                output.push(Vec::new());
                continue;
            }
            let xseq: Vec<Vec<crfs::Attribute>> = seq.iter().map(to_attributes).collect();
            let tags = tagger
                .tag(&xseq)
                .map_err(|e| NerError::classifier(e.to_string()))?;
            output.push(tags.into_iter().map(|t| t.to_string()).collect());
        }
        Ok(output)
    }
}

/// Carrega um classificador escolhendo a implementação pela extensão:
/// `.json` → [`CrfModel`]; qualquer outra → [`CrfsuiteClassifier`].
pub fn load_classifier(path: impl AsRef<Path>) -> Result<SharedClassifier> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        debug!(path = %path.display(), "carregando pesos CRF em JSON");
        Ok(Box::new(CrfModel::load(path)?))
    } else {
        Ok(Box::new(CrfsuiteClassifier::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sentence_features;
    use std::io::Write;

    struct FixedClassifier(&'static str);

    impl SequenceClassifier for FixedClassifier {
        fn predict(&self, sequences: &[Vec<FeatureMap>]) -> Result<Vec<Vec<String>>> {
            Ok(sequences
                .iter()
                .map(|s| vec![self.0.to_string(); s.len()])
                .collect())
        }
    }

    #[test]
    fn test_wrappers_delegate() {
        let features = vec![sentence_features(&['a', 'b'])];
        let boxed: Box<dyn SequenceClassifier> = Box::new(FixedClassifier("O"));
        let shared = Arc::new(FixedClassifier("O"));
        assert_eq!(boxed.predict(&features).unwrap(), vec![vec!["O", "O"]]);
        assert_eq!(shared.predict(&features).unwrap(), vec![vec!["O", "O"]]);
        assert_eq!(predict_one(&FixedClassifier("O"), &features), 2);
    }

    fn predict_one<C: SequenceClassifier>(classifier: C, features: &[Vec<FeatureMap>]) -> usize {
        classifier.predict(features).unwrap()[0].len()
    }

    #[test]
    fn test_to_attributes_count() {
        let fm = &sentence_features(&['迈'])[0];
        assert_eq!(to_attributes(fm).len(), 6);
    }

    #[test]
    fn test_crfsuite_rejects_garbage() {
        let result = CrfsuiteClassifier::from_bytes(vec![b'x'; 128]);
        assert!(matches!(result, Err(NerError::ModelLoad(_))));
    }

    #[test]
    fn test_load_classifier_missing_file() {
        let result = load_classifier("/nonexistent/model.crfsuite");
        assert!(matches!(result, Err(NerError::Io(_))));
    }

    #[test]
    fn test_load_classifier_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::to_string(&CrfModel::new()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let classifier = load_classifier(file.path()).unwrap();
        let tags = classifier.predict(&[sentence_features(&['好'])]).unwrap();
        assert_eq!(tags[0].len(), 1);
    }
}
