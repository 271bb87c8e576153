//! # Corpus Anotado com Palavras e POS (formato Diário do Povo)
//!
//! O corpus de treino já vem segmentado em palavras, cada uma com sua classe
//! gramatical: `迈向/v 充满/v 希望/n 的/u 新/a 世纪/n`. Este módulo converte
//! essas sentenças em sequências **por caractere** com tags BIO.
//!
//! ## Etapas
//!
//! 1. **Pré-fusões** sobre os tokens crus `palavra/POS`:
//!    - colchetes: `[中央/n 人民/n 广播/vn 电台/n]nt` → `中央人民广播电台/nt`
//!    - tempo: `7月/t 19日/t` → `7月19日/t`
//!    - nomes: `习/nr 近平/nr` → `习近平/nr` (só pares imediatos)
//! 2. **Parsing** de cada token em [`WordPos`] (falha se faltar o `/`).
//! 3. **Codificação**: cada caractere da palavra recebe `B_X`/`I_X` conforme
//!    a tabela POS → entidade, ou `O`.

use std::sync::OnceLock;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NerError, Result};
use crate::features::{sentence_features, FeatureMap};
use crate::tagger::{EntityCategory, Tag};

/// POS sentinela nas pontas da sequência de POS
pub const SENTINEL_POS: &str = "un";

const TIME_POS: &str = "t";
const PERSON_POS: &str = "nr";

/// Par (palavra, POS) do corpus anotado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPos {
    pub word: String,
    pub pos: String,
}

impl WordPos {
    pub fn new(word: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            pos: pos.into(),
        }
    }

    /// Parseia `palavra/POS`, dividindo no **último** `/`.
    ///
    /// Assim o token de pontuação `//w` vira a palavra `/` com POS `w`.
    pub fn parse(token: &str) -> Result<Self> {
        token
            .rsplit_once('/')
            .map(|(word, pos)| WordPos::new(word, pos))
            .ok_or_else(|| NerError::malformed_token(token))
    }

    /// Categoria de entidade derivada do POS
    pub fn category(&self) -> Option<EntityCategory> {
        EntityCategory::from_pos(&self.pos)
    }
}

/// Sentença codificada por caractere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSentence {
    pub chars: Vec<char>,
    pub tags: Vec<Tag>,
    /// POS normalizado por caractere, com `un` nas duas pontas
    pub pos: Vec<String>,
}

/// Remove o conhecimento de entidade embutido no POS.
///
/// `nr`, `ns` e `nt` colapsam para `n`; `t` e os demais passam inalterados.
pub fn normalize_pos(pos: &str) -> &str {
    match pos {
        "nr" | "ns" | "nt" => "n",
        other => other,
    }
}

/// Divide uma linha do corpus em tokens crus.
pub fn parse_corpus_line(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

fn pos_of(token: &str) -> Option<&str> {
    token.rsplit_once('/').map(|(_, pos)| pos)
}

fn surface_of(token: &str) -> &str {
    token.rsplit_once('/').map_or(token, |(word, _)| word)
}

fn pos_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"/[a-zA-Z]*").expect("regex constante"))
}

/// Remove todos os marcadores `/pos` de um trecho
fn strip_pos_markers(text: &str) -> String {
    pos_marker().replace_all(text, "").into_owned()
}

/// Estado das pré-fusões
enum Carry {
    Idle,
    Accumulating(String),
}

/// Funde tokens consecutivos com POS `t` num único token `.../t`.
///
/// Um trecho de tempo pendente no fim da sentença é emitido normalmente.
pub fn merge_time_words<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut carry = Carry::Idle;

    for token in tokens.iter().map(AsRef::as_ref) {
        if pos_of(token) == Some(TIME_POS) {
            let surface = surface_of(token);
            carry = match carry {
                Carry::Idle => Carry::Accumulating(surface.to_string()),
                Carry::Accumulating(mut acc) => {
                    acc.push_str(surface);
                    Carry::Accumulating(acc)
                }
            };
            continue;
        }
        if let Carry::Accumulating(acc) = std::mem::replace(&mut carry, Carry::Idle) {
            out.push(format!("{acc}/{TIME_POS}"));
        }
        out.push(token.to_string());
    }

    if let Carry::Accumulating(acc) = carry {
        out.push(format!("{acc}/{TIME_POS}"));
    }
    out
}

/// Funde pares imediatos de tokens `nr` (sobrenome + nome).
///
/// Não é transitivo: em `a/nr b/nr c/nr`, `a` e `b` se fundem e `c` é
/// avaliado contra o seu próprio vizinho.
pub fn merge_person_names<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_ref();
        match tokens.get(i + 1).map(AsRef::as_ref) {
            Some(next)
                if pos_of(token) == Some(PERSON_POS) && pos_of(next) == Some(PERSON_POS) =>
            {
                out.push(format!("{}{next}", surface_of(token)));
                i += 2;
            }
            _ => {
                out.push(token.to_string());
                i += 1;
            }
        }
    }
    out
}

/// Funde termos compostos entre colchetes: `[中国/ns 共产党/n]nt` → `中国共产党/nt`.
///
/// O marcador de fechamento aceita `]nt` e `]/nt`. Um `[` sem `]` até o fim
/// da sentença emite a superfície acumulada **sem** POS; o parsing posterior
/// a rejeita como token malformado.
pub fn merge_brackets<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut carry = Carry::Idle;

    for token in tokens.iter().map(AsRef::as_ref) {
        let opened = token.contains('[');
        let body = if opened { token.replace('[', "") } else { token.to_string() };

        if let Some((inner, tag)) = body.split_once(']') {
            let mut acc = match std::mem::replace(&mut carry, Carry::Idle) {
                Carry::Accumulating(acc) => acc,
                Carry::Idle => String::new(),
            };
            acc.push_str(&strip_pos_markers(inner));
            out.push(format!("{acc}/{}", tag.trim_start_matches('/')));
            continue;
        }

        carry = match carry {
            Carry::Accumulating(mut acc) => {
                acc.push_str(&strip_pos_markers(&body));
                Carry::Accumulating(acc)
            }
            Carry::Idle if opened => Carry::Accumulating(strip_pos_markers(&body)),
            Carry::Idle => {
                out.push(body);
                Carry::Idle
            }
        };
    }

    if let Carry::Accumulating(acc) = carry {
        debug!(partial = %acc, "colchete sem fechamento no fim da sentença");
        out.push(acc);
    }
    out
}

/// Aplica as pré-fusões na ordem colchetes → tempo → nomes.
pub fn preprocess_sentence<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    merge_person_names(&merge_time_words(&merge_brackets(tokens)))
}

/// Codifica palavras já parseadas em caracteres, tags BIO e POS normalizado.
pub fn encode_sentence(words: &[WordPos]) -> EncodedSentence {
    let mut chars = Vec::new();
    let mut tags = Vec::new();
    let mut pos = vec![SENTINEL_POS.to_string()];

    for wp in words {
        let category = wp.category();
        let normalized = normalize_pos(&wp.pos);
        for (i, c) in wp.word.chars().enumerate() {
            chars.push(c);
            tags.push(Tag::for_position(category, i));
            pos.push(normalized.to_string());
        }
    }
    pos.push(SENTINEL_POS.to_string());

    EncodedSentence { chars, tags, pos }
}

/// Pré-fusões + parsing + codificação de uma sentença crua.
pub fn encode_raw_sentence<S: AsRef<str>>(tokens: &[S]) -> Result<EncodedSentence> {
    let words = preprocess_sentence(tokens)
        .iter()
        .map(|t| WordPos::parse(t))
        .collect::<Result<Vec<_>>>()?;
    Ok(encode_sentence(&words))
}

/// Sequências de treino paralelas: caracteres e tags.
pub type TrainingSequences = (Vec<Vec<char>>, Vec<Vec<Tag>>);

/// Converte o corpus inteiro em sequências paralelas de caracteres e tags.
///
/// As sentenças são processadas em paralelo (ordem preservada). O primeiro
/// token malformado aborta a preparação.
pub fn prepare_training_sequences<S>(corpus: &[Vec<S>]) -> Result<TrainingSequences>
where
    S: AsRef<str> + Sync,
{
    let encoded = corpus
        .par_iter()
        .map(|sentence| encode_raw_sentence(sentence))
        .collect::<Result<Vec<_>>>()?;

    debug!(sentences = encoded.len(), "corpus codificado");
    Ok(encoded.into_iter().map(|s| (s.chars, s.tags)).unzip())
}

/// Features e rótulos prontos para um treinador externo.
pub fn training_features<S>(corpus: &[Vec<S>]) -> Result<(Vec<Vec<FeatureMap>>, Vec<Vec<String>>)>
where
    S: AsRef<str> + Sync,
{
    let (chars, tags) = prepare_training_sequences(corpus)?;
    let features = chars.par_iter().map(|c| sentence_features(c)).collect();
    let labels = tags
        .iter()
        .map(|seq| seq.iter().map(Tag::label).collect())
        .collect();
    Ok((features, labels))
}

/// Pequeno corpus de amostra no formato do Diário do Povo (1998).
pub fn sample_corpus() -> Vec<Vec<String>> {
    [
        "迈向/v 充满/v 希望/n 的/u 新/a 世纪/n ——/w 一九九八年/t 新年/t 讲话/n",
        "中共中央/nt 总书记/n 、/w 国家/n 主席/n 江/nr 泽民/nr",
        "（/w 一九九七年/t 十二月/t 三十一日/t ）/w",
        "12月/t 31日/t ，/w [中央/n 人民/n 广播/vn 电台/n]nt 发表/v 新年/t 讲话/n 。/w",
        "在/p 北京/ns 人民/n 大会堂/n 举行/v 新年/t 茶话会/n 。/w",
        "李/nr 鹏/nr 、/w 朱/nr 镕基/nr 出席/v 会议/n 。/w",
        "[香港/ns 特别/a 行政区/n]ns 成立/v 于/p 1997年/t 7月/t 1日/t 。/w",
    ]
    .iter()
    .map(|line| parse_corpus_line(line))
    .collect()
}

/// Textos de demonstração: (domínio, texto)
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "política",
            "7月19日至28日，国家主席习近平将对阿联酋、塞内加尔、卢旺达和南非进行国事访问，\
             出席在南非约翰内斯堡举行的金砖国家领导人第十次会晤，过境毛里求斯并进行友好访问。\
             此次中东非洲之行是习近平连任国家主席后的首次出访，是国际形势深刻演变背景下中国面向\
             发展中国家的重大外交行动，意义重大，世界瞩目。",
        ),
        ("新年", "１９９８年１月１日，中共中央总书记江泽民在北京发表新年讲话。"),
        ("地理", "香港特别行政区位于中国南部，毗邻广东省深圳市。"),
    ]
}
