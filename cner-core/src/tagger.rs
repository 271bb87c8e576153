//! # Esquema de Tags BIO e Reconstrução de Entidades
//!
//! Define o esquema de anotação **BIO** por caractere e a máquina de estados
//! que funde a saída "caractere a caractere" do classificador em entidades.
//!
//! ## Categorias de Entidades
//!
//! | Rótulo | Significado   | POS de origem | Exemplos            |
//! |--------|---------------|---------------|---------------------|
//! | T      | Tempo         | `t`           | 7月19日, 今年       |
//! | PER    | Pessoa        | `nr`          | 习近平              |
//! | LOC    | Local         | `ns`          | 南非, 约翰内斯堡    |
//! | ORG    | Organização   | `nt`          | 中共中央            |
//! | O      | Fora          | outros        | (demais caracteres) |
//!
//! ## Esquema BIO
//!
//! - `B_TAG`: primeiro caractere de uma entidade
//! - `I_TAG`: caracteres seguintes da mesma entidade
//! - `O`: fora de qualquer entidade
//!
//! Os rótulos usam `_` como separador (`B_PER`), que é o formato do modelo
//! treinado.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Categorias de entidade reconhecidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityCategory {
    /// **Tempo**: datas e expressões temporais. Ex: "7月19日".
    T,
    /// **Pessoa**: Ex: "习近平".
    Per,
    /// **Localização**: países, cidades, regiões. Ex: "塞内加尔".
    Loc,
    /// **Organização**: órgãos, empresas, instituições. Ex: "中共中央".
    Org,
}

impl EntityCategory {
    /// Nome da categoria como aparece nos rótulos
    pub fn name(&self) -> &'static str {
        match self {
            EntityCategory::T => "T",
            EntityCategory::Per => "PER",
            EntityCategory::Loc => "LOC",
            EntityCategory::Org => "ORG",
        }
    }

    /// Tenta parsear a partir de string (ex: "PER" → Some(Per))
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "T" => Some(EntityCategory::T),
            "PER" => Some(EntityCategory::Per),
            "LOC" => Some(EntityCategory::Loc),
            "ORG" => Some(EntityCategory::Org),
            _ => None,
        }
    }

    /// Mapeia um código POS do corpus para a categoria de entidade.
    ///
    /// Tabela fixa `{t: T, nr: PER, ns: LOC, nt: ORG}`; qualquer outro POS
    /// não carrega entidade.
    pub fn from_pos(pos: &str) -> Option<Self> {
        match pos {
            "t" => Some(EntityCategory::T),
            "nr" => Some(EntityCategory::Per),
            "ns" => Some(EntityCategory::Loc),
            "nt" => Some(EntityCategory::Org),
            _ => None,
        }
    }
}

/// Tag BIO aplicada a um caractere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: primeiro caractere. Ex: **习**近平 (B_PER).
    Begin(EntityCategory),
    /// **Inside**: continuação. Ex: 习**近平** (I_PER, I_PER).
    Inside(EntityCategory),
    /// **Outside**: não faz parte de entidade.
    Outside,
}

impl Tag {
    /// Número total de tags possíveis
    pub const COUNT: usize = 9;

    /// Representação textual da tag (ex: "B_PER", "I_LOC", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(cat) => format!("B_{}", cat.name()),
            Tag::Inside(cat) => format!("I_{}", cat.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Tag do caractere na posição `index` de uma palavra da categoria dada.
    ///
    /// Posição 0 recebe `B_`, as demais `I_`; sem categoria é sempre `O`.
    pub fn for_position(category: Option<EntityCategory>, index: usize) -> Tag {
        match category {
            Some(cat) if index == 0 => Tag::Begin(cat),
            Some(cat) => Tag::Inside(cat),
            None => Tag::Outside,
        }
    }

    /// Índice numérico da tag para a matriz de transição do CRF.
    pub fn index(&self) -> usize {
        match self {
            Tag::Outside => 0,
            Tag::Begin(EntityCategory::T) => 1,
            Tag::Inside(EntityCategory::T) => 2,
            Tag::Begin(EntityCategory::Per) => 3,
            Tag::Inside(EntityCategory::Per) => 4,
            Tag::Begin(EntityCategory::Loc) => 5,
            Tag::Inside(EntityCategory::Loc) => 6,
            Tag::Begin(EntityCategory::Org) => 7,
            Tag::Inside(EntityCategory::Org) => 8,
        }
    }

    /// Todas as tags em ordem de índice
    pub fn all() -> [Tag; Tag::COUNT] {
        [
            Tag::Outside,
            Tag::Begin(EntityCategory::T),
            Tag::Inside(EntityCategory::T),
            Tag::Begin(EntityCategory::Per),
            Tag::Inside(EntityCategory::Per),
            Tag::Begin(EntityCategory::Loc),
            Tag::Inside(EntityCategory::Loc),
            Tag::Begin(EntityCategory::Org),
            Tag::Inside(EntityCategory::Org),
        ]
    }

    /// Retorna a categoria desta tag (se for B_ ou I_)
    pub fn category(&self) -> Option<EntityCategory> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    /// Verifica se a transição prev → next é válida no esquema BIO
    ///
    /// - `I_X` só pode seguir `B_X` ou `I_X`
    /// - `B_X` e `O` podem seguir qualquer tag
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(cat) => match prev {
                Tag::Begin(prev_cat) | Tag::Inside(prev_cat) => prev_cat == cat,
                Tag::Outside => false,
            },
            _ => true,
        }
    }

    /// Parseia uma tag a partir do rótulo (ex: "B_PER" → Begin(Per))
    pub fn from_label(s: &str) -> Option<Self> {
        if s == "O" {
            return Some(Tag::Outside);
        }
        let (prefix, name) = s.split_once('_')?;
        let cat = EntityCategory::from_name(name)?;
        match prefix {
            "B" => Some(Tag::Begin(cat)),
            "I" => Some(Tag::Inside(cat)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Um caractere com a tag prevista pelo classificador
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedChar {
    #[serde(rename = "char")]
    pub character: char,
    pub tag: String,
}

/// Uma entidade reconhecida: texto fundido + tags unidas por vírgula.
///
/// Ex: `EntitySpan { text: "习近平", tag: "B_PER,I_PER,I_PER" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub tag: String,
}

impl EntitySpan {
    /// Categoria da primeira tag do span, se reconhecível
    pub fn category(&self) -> Option<EntityCategory> {
        self.tag
            .split(',')
            .next()
            .and_then(Tag::from_label)
            .and_then(|t| t.category())
    }
}

/// Rótulo que marca caracteres fora de entidade na saída do classificador
pub const OUTSIDE_LABEL: &str = "O";

/// Sentinela de fim usada pela varredura de fronteiras
const END_LABEL: &str = "END";

/// Funde a sequência (caractere, tag) em entidades.
///
/// Máquina de estados da esquerda para a direita:
/// 1. descarta os pares com tag `O`, mantendo a ordem;
/// 2. acrescenta o par sentinela `("END", "END")`;
/// 3. para cada par adjacente `(j, j+1)` com tags diferentes, se a tag de
///    saída `tag[j]` **não** contém `B`, emite o trecho `[início, j]` e o
///    próximo trecho começa em `j+1`.
///
/// A fronteira depende da tag que *sai*, não da que entra. Com isso, uma
/// entidade de um caractere (`B_X` sozinho) nunca fecha por conta própria:
/// ela é absorvida pela entidade seguinte, ou descartada se for a última.
/// O comportamento é mantido igual ao do modelo em produção.
///
/// Pares além do menor dos dois slices são ignorados.
pub fn merge_entities<S: AsRef<str>>(chars: &[char], tags: &[S]) -> Vec<EntitySpan> {
    let kept: Vec<(char, &str)> = chars
        .iter()
        .zip(tags.iter().map(AsRef::as_ref))
        .filter(|(_, tag)| *tag != OUTSIDE_LABEL)
        .map(|(c, tag)| (*c, tag))
        .collect();

    let mut spans = Vec::new();
    // Estado "acumulando": o trecho aberto começa em `start`
    let mut start = 0;

    for j in 0..kept.len() {
        let current = kept[j].1;
        let next = kept.get(j + 1).map_or(END_LABEL, |(_, tag)| *tag);
        if current != next && !current.contains('B') {
            let run = &kept[start..=j];
            spans.push(EntitySpan {
                text: run.iter().map(|(c, _)| *c).collect(),
                tag: run.iter().map(|(_, t)| *t).collect::<Vec<_>>().join(","),
            });
            start = j + 1;
        }
    }

    trace!(kept = kept.len(), entities = spans.len(), "entidades fundidas");
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_tag_labels() {
        assert_eq!(Tag::Outside.label(), "O");
        assert_eq!(Tag::Begin(EntityCategory::Per).label(), "B_PER");
        assert_eq!(Tag::Inside(EntityCategory::T).label(), "I_T");
    }

    #[test]
    fn test_tag_from_label() {
        assert_eq!(Tag::from_label("O"), Some(Tag::Outside));
        assert_eq!(Tag::from_label("B_ORG"), Some(Tag::Begin(EntityCategory::Org)));
        assert_eq!(Tag::from_label("I_LOC"), Some(Tag::Inside(EntityCategory::Loc)));
        assert_eq!(Tag::from_label("B-PER"), None);
        assert_eq!(Tag::from_label("X_PER"), None);
    }

    #[test]
    fn test_pos_mapping() {
        assert_eq!(EntityCategory::from_pos("t"), Some(EntityCategory::T));
        assert_eq!(EntityCategory::from_pos("nr"), Some(EntityCategory::Per));
        assert_eq!(EntityCategory::from_pos("ns"), Some(EntityCategory::Loc));
        assert_eq!(EntityCategory::from_pos("nt"), Some(EntityCategory::Org));
        assert_eq!(EntityCategory::from_pos("n"), None);
        assert_eq!(EntityCategory::from_pos("tg"), None);
    }

    #[test]
    fn test_for_position() {
        let per = Some(EntityCategory::Per);
        assert_eq!(Tag::for_position(per, 0), Tag::Begin(EntityCategory::Per));
        assert_eq!(Tag::for_position(per, 1), Tag::Inside(EntityCategory::Per));
        assert_eq!(Tag::for_position(None, 0), Tag::Outside);
    }

    #[test]
    fn test_all_tags_have_unique_indices() {
        let mut indices: Vec<usize> = Tag::all().iter().map(|t| t.index()).collect();
        indices.sort();
        indices.dedup();
        assert_eq!(indices.len(), Tag::COUNT);
    }

    #[test]
    fn test_valid_transitions() {
        let b_per = Tag::Begin(EntityCategory::Per);
        let i_per = Tag::Inside(EntityCategory::Per);
        assert!(Tag::is_valid_transition(&b_per, &i_per));
        assert!(!Tag::is_valid_transition(&Tag::Outside, &i_per));
        assert!(!Tag::is_valid_transition(&Tag::Begin(EntityCategory::Loc), &i_per));
    }

    #[test]
    fn test_merge_person() {
        let spans = merge_entities(&chars("习近平"), &["B_PER", "I_PER", "I_PER"]);
        assert_eq!(
            spans,
            vec![EntitySpan { text: "习近平".into(), tag: "B_PER,I_PER,I_PER".into() }]
        );
        assert_eq!(spans[0].category(), Some(EntityCategory::Per));
    }

    #[test]
    fn test_merge_skips_outside() {
        let text = chars("主席习近平访问南非");
        let tags = ["O", "O", "B_PER", "I_PER", "I_PER", "O", "O", "B_LOC", "I_LOC"];
        let spans = merge_entities(&text, &tags);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "习近平");
        assert_eq!(spans[1].text, "南非");
        assert_eq!(spans[1].tag, "B_LOC,I_LOC");
    }

    #[test]
    fn test_merge_no_entities() {
        let spans = merge_entities(&chars("的了"), &["O", "O"]);
        assert!(spans.is_empty());
        let empty: [&str; 0] = [];
        assert!(merge_entities(&[], &empty).is_empty());
    }

    #[test]
    fn test_adjacent_multi_char_entities_split() {
        // Sem "O" entre elas, mas a tag de saída é I_ → a fronteira é detectada
        let spans = merge_entities(
            &chars("南非习近平"),
            &["B_LOC", "I_LOC", "B_PER", "I_PER", "I_PER"],
        );
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "南非");
        assert_eq!(spans[1].text, "习近平");
    }

    #[test]
    fn test_single_char_entity_absorbed_by_next() {
        // Regressão: "京" (B_LOC) não fecha porque a tag de saída contém "B";
        // acaba fundido com a pessoa seguinte.
        let spans = merge_entities(&chars("京习近"), &["B_LOC", "B_PER", "I_PER"]);
        assert_eq!(
            spans,
            vec![EntitySpan { text: "京习近".into(), tag: "B_LOC,B_PER,I_PER".into() }]
        );
    }

    #[test]
    fn test_trailing_single_char_entity_dropped() {
        // Regressão: um B_ isolado no fim nunca é emitido.
        let spans = merge_entities(&chars("在京"), &["O", "B_LOC"]);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_interleaved_outside_does_not_split_same_tag() {
        // "O" é descartado antes da varredura: I_T ... I_T viram um só trecho
        let spans = merge_entities(&chars("日至日"), &["I_T", "O", "I_T"]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "日日");
    }
}
