//! Batched, checkpoint-driven machine translation inference, optionally
//! sharded across independent worker processes.
//!
//! Workers never talk to each other. Each one decodes a deterministic,
//! contiguous shard of the corpus and publishes its finished output through an
//! atomic rename to a done-marker file. Worker 0 then assembles the final,
//! corpus-ordered output by polling for the markers in ascending worker-id
//! order, so the arrangement of the final file never depends on which worker
//! happened to finish first.
//!
//! The model itself is a collaborator behind the [`DecodeModel`] trait: the
//! decode loop only needs to bind a shard and pull batches of token ids until
//! the model reports exhaustion.

pub mod config;
pub mod corpus;
pub mod decode;
pub mod error;
pub mod evaluate;
pub mod extract;
pub mod inference;
pub mod protocol;
pub mod shard;
pub mod vocab;

pub use config::InferConfig;
pub use decode::{DecodeModel, DecodeOutput};
pub use error::{Error, Result};
pub use shard::Shard;
