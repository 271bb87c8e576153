//! # Algoritmo de Viterbi — Decodificação de Sequências CRF
//!
//! Programação dinâmica que encontra a sequência de tags de maior score em
//! `O(N × T²)` em vez de `O(T^N)`.
//!
//! ```text
//! Inicialização: viterbi[0][t] = emission(t, x_0)   (+ penalidade se t = I_X)
//! Recursão:      viterbi[i][t] = max_{t'} [viterbi[i-1][t'] + transition(t', t)] + emission(t, x_i)
//! Backtracking:  reconstrói o caminho ótimo de trás para frente
//! ```
//!
//! Transições inválidas no esquema BIO (`O → I_X`, `B_Y → I_X`, `I_X` no
//! início da sequência) recebem uma penalidade fixa, de modo que o
//! decodificador só as escolhe quando a emissão compensa.

use crate::crf::{compute_emission_scores, CrfModel};
use crate::features::FeatureMap;
use crate::tagger::Tag;

/// Penalidade somada a transições inválidas no esquema BIO
pub const INVALID_TRANSITION_PENALTY: f64 = -10.0;

/// Resultado do Viterbi
#[derive(Debug, Clone)]
pub struct ViterbiResult {
    /// Sequência de tags mais provável (uma por caractere)
    pub best_sequence: Vec<Tag>,
    /// Score (não normalizado) da melhor sequência
    pub best_score: f64,
}

/// Executa o Viterbi sobre as features de uma sequência
pub fn viterbi_decode(model: &CrfModel, features: &[FeatureMap]) -> ViterbiResult {
    if features.is_empty() {
        return ViterbiResult {
            best_sequence: vec![],
            best_score: 0.0,
        };
    }

    let n_chars = features.len();
    let tags = Tag::all();
    let n_tags = tags.len();

    let emission = compute_emission_scores(model, features);

    // Transições já com a penalidade BIO aplicada
    let transition: Vec<Vec<f64>> = tags
        .iter()
        .map(|prev| {
            tags.iter()
                .map(|next| {
                    let base = model.transition_score(prev, next);
                    if Tag::is_valid_transition(prev, next) {
                        base
                    } else {
                        base + INVALID_TRANSITION_PENALTY
                    }
                })
                .collect()
        })
        .collect();

    // Sem transição de início: `I_X` na primeira posição também é inválida
    let mut viterbi: Vec<f64> = tags
        .iter()
        .zip(&emission[0])
        .map(|(tag, &score)| match tag {
            Tag::Inside(_) => score + INVALID_TRANSITION_PENALTY,
            _ => score,
        })
        .collect();
    let mut backptr: Vec<Vec<usize>> = vec![vec![0usize; n_tags]; n_chars];

    for i in 1..n_chars {
        let mut next_viterbi = vec![f64::NEG_INFINITY; n_tags];
        for t in 0..n_tags {
            let (best_prev, best_score) = (0..n_tags)
                .map(|prev_t| (prev_t, viterbi[prev_t] + transition[prev_t][t]))
                .fold((0, f64::NEG_INFINITY), |best, cand| {
                    if cand.1 > best.1 {
                        cand
                    } else {
                        best
                    }
                });
            next_viterbi[t] = best_score + emission[i][t];
            backptr[i][t] = best_prev;
        }
        viterbi = next_viterbi;
    }

    // === Backtracking ===
    let (mut best_last, best_score) = best_in_slice(&viterbi);
    let mut best_sequence = vec![Tag::Outside; n_chars];
    best_sequence[n_chars - 1] = tags[best_last];

    for i in (0..n_chars - 1).rev() {
        best_last = backptr[i + 1][best_last];
        best_sequence[i] = tags[best_last];
    }

    ViterbiResult {
        best_sequence,
        best_score,
    }
}

/// Retorna (índice, valor) do máximo em um slice
fn best_in_slice(scores: &[f64]) -> (usize, f64) {
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, &v)| (i, v))
        .unwrap_or((0, f64::NEG_INFINITY))
}
