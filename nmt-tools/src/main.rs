use anyhow::{Error as E, Result};
use clap::{Parser, ValueEnum};

use candle::{DType, Device, Tensor};
use candle_nmt::decode::{DecodeModel, DecodeOutput};
use candle_nmt::vocab::TokenLookup;
use candle_nmt::InferConfig;
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::marian;

use std::collections::VecDeque;
use std::path::Path;
use tokenizers::Tokenizer;

#[derive(Clone, Debug, Copy, ValueEnum)]
enum Which {
    Base,
    Big,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input corpus, one source sentence per line.
    #[arg(long)]
    input: String,

    /// Final translation output path. Worker shards and done-markers are
    /// derived from it.
    #[arg(long)]
    output: String,

    /// JSON file with the full inference configuration; when set, the
    /// worker/batch flags below are ignored.
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    tokenizer: Option<String>,

    #[arg(long)]
    tokenizer_dec: Option<String>,

    /// Choose the variant of the model to run.
    #[arg(long, default_value = "big")]
    which: Which,

    /// Run on CPU rather than on GPU.
    #[arg(long)]
    cpu: bool,

    /// Enable tracing (generates a trace-timestamp.json file).
    #[arg(long)]
    tracing: bool,

    /// Number of independent worker processes decoding the corpus.
    #[arg(long, default_value_t = 1)]
    num_workers: usize,

    /// Shard decoded by this process, in [0, num_workers).
    #[arg(long, default_value_t = 0)]
    worker_id: usize,

    /// Number of sentences decoded per step.
    #[arg(long, default_value_t = 8)]
    batch_size: usize,

    /// Decode only these comma-separated corpus indices (single-worker only).
    #[arg(long, value_delimiter = ',')]
    inference_indices: Option<Vec<usize>>,

    /// End-of-sequence token; defaults to the decoder tokenizer's.
    #[arg(long)]
    eos: Option<String>,

    /// Sub-word delimiter to merge during extraction, e.g. "@@".
    #[arg(long)]
    bpe_delimiter: Option<String>,

    /// Maximum number of generated tokens per sentence.
    #[arg(long, default_value_t = 512)]
    max_len: usize,
}

fn device(cpu: bool) -> candle::Result<Device> {
    if cpu {
        Ok(Device::Cpu)
    } else {
        let device = Device::cuda_if_available(0)?;
        if !device.is_cuda() {
            tracing::info!("running on CPU, to run on GPU build with `--features cuda`");
        }
        Ok(device)
    }
}

struct TokenizerVocab(Tokenizer);

impl TokenLookup for TokenizerVocab {
    fn token(&self, id: u32) -> Option<String> {
        self.0.id_to_token(id)
    }
}

/// Greedy Marian translation behind the decode-loop capability interface.
///
/// `bind` encodes one shard of source sentences; every `decode` call then
/// translates up to `batch_size` of them and returns the generated ids as a
/// `[batch, len]` tensor, rows padded with EOS. `Ok(None)` once the shard is
/// drained.
struct MarianModel {
    model: marian::MTModel,
    config: marian::Config,
    tokenizer: Tokenizer,
    device: Device,
    pending: VecDeque<Vec<u32>>,
    batch_size: usize,
    max_len: usize,
}

impl MarianModel {
    fn translate(&mut self, src: &[u32]) -> candle::Result<Vec<u32>> {
        self.model.reset_kv_cache();
        let mut logits_processor = LogitsProcessor::new(1337, None, None);
        let tokens = Tensor::new(src, &self.device)?.unsqueeze(0)?;
        let encoder_xs = self.model.encoder().forward(&tokens, 0)?;
        let mut token_ids = vec![self.config.decoder_start_token_id as u32];
        for index in 0..self.max_len {
            let context_size = if index >= 1 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let input_ids = Tensor::new(&token_ids[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = self.model.decode(&input_ids, &encoder_xs, start_pos)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;
            let token = logits_processor.sample(&logits)?;
            token_ids.push(token);
            if token == self.config.eos_token_id as u32
                || token == self.config.forced_eos_token_id as u32
            {
                break;
            }
        }
        // Drop the decoder start token, keep the generated sequence.
        Ok(token_ids.split_off(1))
    }
}

impl DecodeModel for MarianModel {
    fn bind(&mut self, sentences: &[String], batch_size: usize) -> candle_nmt::Result<()> {
        self.batch_size = batch_size.max(1);
        self.pending.clear();
        for sentence in sentences {
            let mut tokens = self
                .tokenizer
                .encode(sentence.as_str(), true)
                .map_err(candle_nmt::Error::msg)?
                .get_ids()
                .to_vec();
            tokens.push(self.config.eos_token_id as u32);
            self.pending.push_back(tokens);
        }
        Ok(())
    }

    fn decode(&mut self) -> candle_nmt::Result<Option<DecodeOutput>> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let mut rows = Vec::new();
        while rows.len() < self.batch_size {
            let Some(src) = self.pending.pop_front() else {
                break;
            };
            rows.push(self.translate(&src)?);
        }
        let len = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
        for row in rows.iter_mut() {
            row.resize(len, self.config.eos_token_id as u32);
        }
        let batch = rows.len();
        let ids: Vec<u32> = rows.into_iter().flatten().collect();
        let tokens = Tensor::from_vec(ids, (batch, len), &self.device)?;
        Ok(Some(DecodeOutput {
            tokens,
            summary: None,
        }))
    }
}

fn load_tokenizer(path: &Option<String>, which: Which, dec: bool) -> Result<Tokenizer> {
    use hf_hub::api::sync::Api;
    let tokenizer = match path {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            let name = match (which, dec) {
                (Which::Base, false) => "tokenizer-marian-base-fr.json",
                (Which::Base, true) => "tokenizer-marian-base-en.json",
                (Which::Big, false) => "tokenizer-marian-fr.json",
                (Which::Big, true) => "tokenizer-marian-en.json",
            };
            Api::new()?
                .model("lmz/candle-marian".to_string())
                .get(name)?
        }
    };
    Tokenizer::from_file(&tokenizer).map_err(E::msg)
}

fn main() -> Result<()> {
    use tracing_chrome::ChromeLayerBuilder;
    use tracing_subscriber::prelude::*;

    let args = Args::parse();
    let _guard = if args.tracing {
        let (chrome_layer, guard) = ChromeLayerBuilder::new().build();
        tracing_subscriber::registry().with(chrome_layer).init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
        None
    };

    let config = match args.which {
        Which::Base => marian::Config::opus_mt_fr_en(),
        Which::Big => marian::Config::opus_mt_tc_big_fr_en(),
    };
    let tokenizer = load_tokenizer(&args.tokenizer, args.which, false)?;
    let tokenizer_dec = load_tokenizer(&args.tokenizer_dec, args.which, true)?;

    let cfg = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => InferConfig {
            batch_size: args.batch_size,
            beam_width: 0,
            eos: args
                .eos
                .clone()
                .or_else(|| tokenizer_dec.id_to_token(config.eos_token_id as u32)),
            bpe_delimiter: args.bpe_delimiter.clone(),
            num_workers: args.num_workers,
            worker_id: args.worker_id,
            inference_indices: args.inference_indices.clone(),
            ..Default::default()
        },
    };

    let device = device(args.cpu)?;
    let vb = {
        let model = match &args.model {
            Some(model) => std::path::PathBuf::from(model),
            None => {
                use hf_hub::api::sync::Api;
                match args.which {
                    Which::Base => Api::new()?
                        .repo(hf_hub::Repo::with_revision(
                            "Helsinki-NLP/opus-mt-fr-en".to_string(),
                            hf_hub::RepoType::Model,
                            "refs/pr/4".to_string(),
                        ))
                        .get("model.safetensors")?,
                    Which::Big => Api::new()?
                        .model("Helsinki-NLP/opus-mt-tc-big-fr-en".to_string())
                        .get("model.safetensors")?,
                }
            }
        };
        unsafe { VarBuilder::from_mmaped_safetensors(&[&model], DType::F32, &device)? }
    };
    let model = marian::MTModel::new(&config, vb)?;

    let mut model = MarianModel {
        model,
        config,
        tokenizer,
        device,
        pending: VecDeque::new(),
        batch_size: args.batch_size,
        max_len: args.max_len,
    };
    let vocab = TokenizerVocab(tokenizer_dec);
    candle_nmt::inference::inference(
        &mut model,
        &cfg,
        &vocab,
        Path::new(&args.input),
        Path::new(&args.output),
        None,
        None,
    )?;
    Ok(())
}
