//! # cner-core — Reconhecimento de Entidades Nomeadas em Chinês
//!
//! Este crate implementa a engenharia de features por caractere e a
//! reconstrução de entidades em torno de um classificador de sequências já
//! treinado (CRF). Reconhece pessoas, locais, organizações e expressões de
//! tempo.
//!
//! ## Arquitetura do Sistema
//!
//! **Inferência**
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Normalização** ([`normalize`]): largura total → meia largura.
//! 3.  **Features** ([`features`]): janela `[anterior, atual, seguinte]` com
//!     sentinelas `<BOS>`/`<EOS>`, um mapa de features por caractere.
//! 4.  **Classificação** ([`classifier`]): colaborador externo que devolve uma
//!     tag BIO por caractere (CRFsuite via `crfs`, ou [`crf`] + [`viterbi`]).
//! 5.  **Reconstrução** ([`tagger`]): funde caracteres consecutivos em
//!     [`EntitySpan`] (ex: "习近平" → `B_PER,I_PER,I_PER`).
//!
//! **Preparação de treino** ([`corpus`]): sentenças `palavra/POS` do corpus
//! passam por fusões (tempo, nomes, colchetes) e viram pares
//! (caracteres, tags) que alimentam o mesmo extrator de features.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use cner_core::crf::CrfModel;
//! use cner_core::tagger::{EntityCategory, Tag};
//! use cner_core::NerPipeline;
//!
//! // Pesos carregados uma vez (aqui montados à mão)
//! let mut model = CrfModel::new();
//! model.set_emission("bias", &Tag::Outside, 1.0);
//! model.set_emission("w=南", &Tag::Begin(EntityCategory::Loc), 5.0);
//! model.set_emission("w=非", &Tag::Inside(EntityCategory::Loc), 5.0);
//!
//! let pipeline = NerPipeline::new(model);
//! let entities = pipeline.recognize("出访南非").unwrap();
//!
//! assert_eq!(entities[0].text, "南非");
//! assert_eq!(entities[0].tag, "B_LOC,I_LOC");
//! ```

pub mod classifier;
pub mod corpus;
pub mod crf;
pub mod error;
pub mod features;
pub mod normalize;
pub mod pipeline;
pub mod tagger;
pub mod viterbi;

pub use classifier::{load_classifier, CrfsuiteClassifier, SequenceClassifier, SharedClassifier};
pub use corpus::prepare_training_sequences;
pub use error::{NerError, Result};
pub use features::FeatureMap;
pub use pipeline::{recognize, Analysis, NerPipeline};
pub use tagger::{EntityCategory, EntitySpan, Tag, TaggedChar};
