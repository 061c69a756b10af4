use candle::{Device, Tensor};
use candle_nmt::extract::{best_beam, format_bpe_text, get_translation, translate_tokens};
use candle_nmt::vocab::Vocab;
use candle_nmt::Result;

fn tokens(ts: &[&str]) -> Vec<String> {
    ts.iter().map(|t| t.to_string()).collect()
}

#[test]
fn eos_truncates_at_first_occurrence() {
    let ts = tokens(&["a", "b", "<eos>", "c"]);
    assert_eq!(translate_tokens(&ts, Some("<eos>"), None), "a b");
}

#[test]
fn missing_eos_keeps_the_full_sequence() {
    let ts = tokens(&["a", "b", "<eos>", "c"]);
    assert_eq!(translate_tokens(&ts, None, None), "a b <eos> c");
    let no_eos = tokens(&["a", "b", "c"]);
    assert_eq!(translate_tokens(&no_eos, Some("<eos>"), None), "a b c");
}

#[test]
fn bpe_pieces_merge_into_words() {
    let ts = tokens(&["tran@@", "sla@@", "tion"]);
    assert_eq!(format_bpe_text(&ts, "@@"), "translation");
    let mixed = tokens(&["tran@@", "sla@@", "tion", "works"]);
    assert_eq!(format_bpe_text(&mixed, "@@"), "translation works");
}

#[test]
fn bpe_merge_leaves_plain_tokens_unchanged() {
    let ts = tokens(&["the", "cat", "sat"]);
    assert_eq!(format_bpe_text(&ts, "@@"), "the cat sat");
}

#[test]
fn unterminated_trailing_piece_is_dropped() {
    let ts = tokens(&["whole", "tran@@"]);
    assert_eq!(format_bpe_text(&ts, "@@"), "whole");
}

#[test]
fn eos_truncation_runs_before_bpe_merge() {
    let ts = tokens(&["tran@@", "sla@@", "tion", "<eos>", "ga@@", "rbage"]);
    assert_eq!(
        translate_tokens(&ts, Some("<eos>"), Some("@@")),
        "translation"
    );
}

#[test]
fn beam_zero_is_authoritative() -> Result<()> {
    let device = Device::Cpu;
    // [beam = 2, batch = 2, len = 3]: beam 1 holds garbage that must never
    // leak into the output.
    let outputs = Tensor::new(
        &[[[1u32, 2, 0], [3, 4, 0]], [[9, 9, 9], [9, 9, 9]]],
        &device,
    )?;
    let vocab = Vocab::new(
        ["<eos>", "a", "b", "c", "d"]
            .iter()
            .map(|t| t.to_string())
            .collect(),
    );
    let best = best_beam(&outputs, 10)?;
    assert_eq!(best.dims(), &[2, 3]);
    assert_eq!(get_translation(&best, 0, &vocab, Some("<eos>"), None)?, "a b");
    assert_eq!(get_translation(&best, 1, &vocab, Some("<eos>"), None)?, "c d");
    Ok(())
}

#[test]
fn greedy_output_passes_through_unchanged() -> Result<()> {
    let device = Device::Cpu;
    let outputs = Tensor::new(&[[1u32, 2, 0], [3, 4, 0]], &device)?;
    let best = best_beam(&outputs, 0)?;
    assert_eq!(best.dims(), &[2, 3]);
    Ok(())
}

#[test]
fn out_of_vocabulary_ids_fall_back_to_unk() -> Result<()> {
    let device = Device::Cpu;
    let outputs = Tensor::new(&[[1u32, 77, 0]], &device)?;
    let vocab = Vocab::new(
        ["<eos>", "a"].iter().map(|t| t.to_string()).collect(),
    );
    assert_eq!(
        get_translation(&outputs, 0, &vocab, Some("<eos>"), None)?,
        "a <unk>"
    );
    Ok(())
}
