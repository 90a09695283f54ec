//! # xwalk-engine — Control Similarity Engine
//!
//! Pure, synchronous ranking of controls against each other:
//!
//! - **Tokenizer** (`tokenizer.rs`): a control's id, title, description and
//!   family become a raw term-frequency vector.
//! - **Similarity** (`similarity.rs`): cosine similarity of two term
//!   vectors, degrading to `0.0` for empty vectors.
//! - **Candidates** (`candidates.rs`): top-N targets per source control
//!   above a confidence floor, with the shared terms that explain them.
//!
//! ## Scoring Model
//!
//! Bag-of-words over raw tokens. No stemming, no IDF weighting, no
//! embeddings: `vulnerability` and `vulnerabilities` are distinct terms.
//! Confidence numbers are therefore stable across catalog growth, which
//! keeps golden outputs reproducible.
//!
//! ## Cost
//!
//! Generation is `O(|sources| × |targets|)` pairwise comparisons. The
//! generator reports the comparison count so callers can alert on it.

pub mod candidates;
pub mod similarity;
pub mod tokenizer;

pub use candidates::{Candidate, CandidateGenerator, Generation, GeneratorOptions};
pub use similarity::cosine_similarity;
pub use tokenizer::{tokenize, TermVector, TokenizedControl, STOP_WORDS};
