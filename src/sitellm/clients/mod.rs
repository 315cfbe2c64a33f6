//! Provider client implementations.
//!
//! Each submodule wraps one external generation API behind the crate's
//! structured-result contract: the text providers implement
//! [`GenerationClient`](crate::generation::GenerationClient), while
//! [`replicate`] exposes the submit-then-poll prediction flow used for image
//! models.

pub mod anthropic;
pub mod openai;
pub mod openrouter;
pub mod replicate;
