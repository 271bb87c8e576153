//! # Normalização de Largura (全角 → 半角)
//!
//! Textos em chinês costumam misturar dígitos, letras e pontuação em largura
//! total (`７月`, `ＡＢＣ`, `！`). O modelo foi treinado com a forma de meia
//! largura, então convertemos antes de extrair features.
//!
//! | Entrada            | Saída            |
//! |--------------------|------------------|
//! | U+3000 (espaço)    | U+0020           |
//! | U+FF01 ..= U+FF5E  | código − 0xFEE0  |
//! | qualquer outro     | inalterado       |
//!
//! Ideogramas CJK ficam intactos. A função é total e idempotente.

const FULL_WIDTH_SPACE: u32 = 0x3000;
const FULL_WIDTH_FIRST: u32 = 0xFF01;
const FULL_WIDTH_LAST: u32 = 0xFF5E;
const FULL_WIDTH_OFFSET: u32 = 0xFEE0;

/// Converte um caractere de largura total para meia largura.
pub fn to_half_width_char(c: char) -> char {
    let code = c as u32;
    if code == FULL_WIDTH_SPACE {
        return ' ';
    }
    if (FULL_WIDTH_FIRST..=FULL_WIDTH_LAST).contains(&code) {
        // O intervalo mapeia exatamente em 0x21..=0x7E (ASCII imprimível)
        return char::from_u32(code - FULL_WIDTH_OFFSET).unwrap_or(c);
    }
    c
}

/// Converte todos os caracteres não chineses de largura total de `text`.
///
/// # Exemplo
/// ```rust
/// use cner_core::normalize::to_half_width;
///
/// assert_eq!(to_half_width("７月１９日，ＡＢＣ"), "7月19日,ABC");
/// ```
pub fn to_half_width(text: &str) -> String {
    text.chars().map(to_half_width_char).collect()
}
