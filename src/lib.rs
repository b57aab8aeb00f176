//! # minidawg
//!
//! Compact, immutable sets of byte strings stored as a
//! [minimal acyclic finite-state automaton](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton)
//! (MA-FSA, also known as a DAWG).
//!
//! A DAWG is a trie whose common suffixes are merged, so it is usually far
//! smaller than the word list it encodes while still answering membership
//! queries in O(word length). Construction follows the incremental algorithm
//! of [Daciuk et al. (2000)](https://arxiv.org/abs/cs/0007009v1): words are
//! added in sorted order and minimized on the fly.
//!
//! ## Features
//!
//! - **Perfect hashing**: a [`Numbered`](dawg::Kind::Numbered) automaton maps
//!   every word to its 1-based rank and back.
//! - **Ordered iteration** from the start, from any word, from any rank, or
//!   restricted to a prefix.
//! - **Pointer-free binary format** that loads in a single forward pass and
//!   validates untrusted input.
//! - **Thread-safe reads**: an [`Automaton`](dawg::Automaton) is immutable and
//!   can be shared freely between threads.
//!
//! ## Quick Start
//!
//! ```
//! use minidawg::dawg::{Automaton, Encoder, Kind};
//!
//! let mut enc = Encoder::new(Kind::Numbered);
//! for word in ["greenish", "greenness", "greens", "greet", "greeting", "greets"] {
//!     enc.add(word).unwrap();
//! }
//! let mut bytes = Vec::new();
//! enc.finalize_and_write(&mut bytes).unwrap();
//!
//! let lexicon = Automaton::from_bytes(&bytes).unwrap();
//! assert!(lexicon.contains("greet"));
//! assert_eq!(lexicon.locate("greets").unwrap(), Some(6));
//!
//! let greet: Vec<String> = lexicon
//!     .iter_prefix("greet")
//!     .map(|w| String::from_utf8(w).unwrap())
//!     .collect();
//! assert_eq!(greet, ["greet", "greeting", "greets"]);
//! ```

#![warn(missing_docs)]

/// Core automaton data structure: builder, persistence and queries.
pub mod dawg;
