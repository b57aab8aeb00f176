/// The immutable automaton and its states.
pub mod automaton;
/// Incremental construction from sorted words.
pub mod builder;
/// Compact transition lists.
pub mod children;
/// Human-readable debug views.
pub mod debug;
/// Error types.
pub mod error;
/// Binary persistence.
pub mod format;
/// Ordered, resumable iteration.
pub mod iter;
mod query;

pub use automaton::{Automaton, Kind, State, StateId};
pub use builder::{encode, encode_lines, Encoder};
pub use children::Transition;
pub use debug::DumpFormat;
pub use error::{Error, Result};
pub use format::{MAGIC, VERSION};
pub use iter::Iter;

/// The longest word, in bytes, an [`Encoder`] accepts.
pub const MAX_WORD_LEN: usize = 255;

#[cfg(test)]
mod test {
    use super::*;

    const CAR_CAT_CATS: [&str; 3] = ["car", "cat", "cats"];

    fn reload(fsa: &Automaton) -> Automaton {
        Automaton::from_bytes(&fsa.to_bytes()).unwrap()
    }

    #[test]
    fn standard_membership_and_iteration() {
        let fsa = reload(&encode(Kind::Standard, CAR_CAT_CATS).unwrap());
        assert_eq!(fsa.kind(), Kind::Standard);
        assert_eq!(fsa.size(), 3);
        assert!(fsa.contains("car"));
        assert!(!fsa.contains("ca"));
        let words: Vec<Vec<u8>> = fsa.iter().collect();
        assert_eq!(words, [b"car".to_vec(), b"cat".to_vec(), b"cats".to_vec()]);
    }

    #[test]
    fn numbered_ranks() {
        let fsa = reload(&encode(Kind::Numbered, CAR_CAT_CATS).unwrap());
        assert_eq!(fsa.kind(), Kind::Numbered);
        assert_eq!(fsa.locate("car").unwrap(), Some(1));
        assert_eq!(fsa.locate("cat").unwrap(), Some(2));
        assert_eq!(fsa.locate("cats").unwrap(), Some(3));
        assert_eq!(fsa.extract(2).unwrap(), Some(b"cat".to_vec()));
        assert_eq!(fsa.locate("dog").unwrap(), None);
    }

    #[test]
    fn prefix_restriction() {
        let fsa = reload(&encode(Kind::Standard, CAR_CAT_CATS).unwrap());
        let words: Vec<Vec<u8>> = fsa.iter_prefix("ca").collect();
        assert_eq!(words, [b"car".to_vec(), b"cat".to_vec(), b"cats".to_vec()]);
        assert_eq!(fsa.iter_prefix("do").next(), None);
    }

    /// A deterministic pseudo-random word list: sorted, distinct, with plenty
    /// of shared prefixes and suffixes.
    fn lexicon() -> Vec<Vec<u8>> {
        let mut seed = 0x2545_f491_u32;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed
        };
        let stems = ["", "un", "re", "pre", "over"];
        let roots = ["bake", "cook", "heat", "mix", "stir", "tast"];
        let ends = ["", "s", "ed", "er", "ers", "ing", "ings"];
        let mut words: Vec<Vec<u8>> = (0..400)
            .map(|_| {
                let pick = |n: u32, len: usize| (n as usize) % len;
                let mut w = Vec::new();
                w.extend_from_slice(stems[pick(next(), stems.len())].as_bytes());
                w.extend_from_slice(roots[pick(next(), roots.len())].as_bytes());
                w.extend_from_slice(ends[pick(next(), ends.len())].as_bytes());
                w
            })
            .collect();
        words.sort();
        words.dedup();
        words
    }

    #[test]
    fn round_trip_reproduces_input() {
        let words = lexicon();
        for kind in [Kind::Standard, Kind::Numbered] {
            let fsa = reload(&encode(kind, &words).unwrap());
            assert_eq!(fsa.size() as usize, words.len());
            assert_eq!(fsa.iter().collect::<Vec<_>>(), words);
        }
    }

    #[test]
    fn membership_matches_input() {
        let words = lexicon();
        let fsa = encode(Kind::Standard, &words).unwrap();
        for w in &words {
            assert!(fsa.contains(w));
            for end in 0..w.len() {
                let prefix = &w[..end];
                assert_eq!(fsa.contains(prefix), words.binary_search(&prefix.to_vec()).is_ok());
            }
            let mut longer = w.clone();
            longer.push(b'!');
            assert!(!fsa.contains(&longer));
        }
    }

    #[test]
    fn rank_bijection_matches_iteration() {
        let words = lexicon();
        let fsa = reload(&encode(Kind::Numbered, &words).unwrap());
        for (i, w) in words.iter().enumerate() {
            let rank = i as u32 + 1;
            assert_eq!(fsa.locate(w).unwrap(), Some(rank));
            assert_eq!(fsa.extract(rank).unwrap().as_ref(), Some(w));
        }
        assert_eq!(fsa.extract(0).unwrap(), None);
        assert_eq!(fsa.extract(fsa.size() + 1).unwrap(), None);
    }

    #[test]
    fn prefix_iteration_matches_filtering() {
        let words = lexicon();
        let fsa = encode(Kind::Standard, &words).unwrap();
        for prefix in ["", "un", "over", "overbak", "reheat", "mix", "zz", "preheatings"] {
            let expected: Vec<Vec<u8>> = words
                .iter()
                .filter(|w| w.starts_with(prefix.as_bytes()))
                .cloned()
                .collect();
            assert_eq!(fsa.iter_prefix(prefix).collect::<Vec<_>>(), expected, "{prefix}");
        }
    }

    #[test]
    fn automaton_is_minimal() {
        let words = lexicon();
        let fsa = encode(Kind::Numbered, &words).unwrap();
        let mut seen = hashbrown::HashSet::new();
        for state in &fsa.states {
            assert!(seen.insert(state), "duplicate state {state:?}");
        }
    }

    #[test]
    fn automaton_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Automaton>();
        assert_send_sync::<Iter<'static>>();
    }

    #[test]
    fn concurrent_readers() {
        let words = lexicon();
        let fsa = encode(Kind::Numbered, &words).unwrap();
        std::thread::scope(|s| {
            for chunk in words.chunks(50) {
                let fsa = &fsa;
                s.spawn(move || {
                    for w in chunk {
                        let rank = fsa.locate(w).unwrap().unwrap();
                        assert_eq!(fsa.extract(rank).unwrap().as_ref(), Some(w));
                    }
                });
            }
        });
    }
}
