//! Turns raw decode output into final translation text: best-beam selection,
//! end-of-sequence truncation and sub-word reassembly.

use crate::vocab::{TokenLookup, UNK};
use crate::Result;
use candle::Tensor;

/// Selects the authoritative candidate from a raw decode output.
///
/// Under beam search (`beam_width > 0`) the output is `[beam, batch, len]`
/// and beam 0 is taken by convention; there is no score-based re-ranking.
/// Without beam search the `[batch, len]` output passes through unchanged.
pub fn best_beam(outputs: &Tensor, beam_width: usize) -> Result<Tensor> {
    if beam_width > 0 {
        Ok(outputs.get(0)?)
    } else {
        Ok(outputs.clone())
    }
}

/// Given batch decoding outputs `[batch, len]`, selects a sentence and turns
/// it into text.
pub fn get_translation(
    outputs: &Tensor,
    sent_id: usize,
    vocab: &dyn TokenLookup,
    eos: Option<&str>,
    bpe_delimiter: Option<&str>,
) -> Result<String> {
    let ids = outputs.get(sent_id)?.to_vec1::<u32>()?;
    let tokens: Vec<String> = ids
        .iter()
        .map(|&id| vocab.token(id).unwrap_or_else(|| UNK.to_string()))
        .collect();
    Ok(translate_tokens(&tokens, eos, bpe_delimiter))
}

/// Truncates a token sequence at the first EOS occurrence, then joins it into
/// a sentence. A missing EOS is not an error: max-length-truncated outputs
/// keep the full sequence.
pub fn translate_tokens(tokens: &[String], eos: Option<&str>, bpe_delimiter: Option<&str>) -> String {
    let tokens = match eos.and_then(|eos| tokens.iter().position(|t| t.as_str() == eos)) {
        Some(pos) => &tokens[..pos],
        None => tokens,
    };
    match bpe_delimiter {
        None => format_text(tokens),
        Some(delimiter) => format_bpe_text(tokens, delimiter),
    }
}

/// Joins tokens with single spaces.
pub fn format_text(tokens: &[String]) -> String {
    tokens.join(" ")
}

/// Merges sub-word pieces back into words: a token ending with the delimiter
/// continues the current word, any other token closes it. A trailing piece
/// that still ends with the delimiter never closes a word and is dropped.
pub fn format_bpe_text(tokens: &[String], delimiter: &str) -> String {
    let mut words = Vec::new();
    let mut word = String::new();
    for symbol in tokens {
        match symbol.strip_suffix(delimiter) {
            Some(stem) => word.push_str(stem),
            None => {
                word.push_str(symbol);
                words.push(std::mem::take(&mut word));
            }
        }
    }
    words.join(" ")
}
