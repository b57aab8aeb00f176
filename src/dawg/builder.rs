use std::hash::BuildHasher;
use std::io::{BufRead, Write};

use hashbrown::{DefaultHashBuilder, HashTable};
use itertools::{Itertools, Position};
use log::debug;

use super::automaton::{Automaton, Kind, State, StateId};
use super::error::{Error, Result};
use super::MAX_WORD_LEN;

/// Builds a minimal automaton from words added in strictly increasing order.
///
/// The encoder keeps the path of the most recently added word open. When the
/// next word diverges from it, the part of the path below the divergence point
/// can no longer change, so it is minimized by looking each state up in a
/// register of already-built states and reusing an identical one when it
/// exists. Common suffixes therefore end up shared.
///
/// # Examples
///
/// ```
/// use minidawg::dawg::{Encoder, Kind};
///
/// let mut enc = Encoder::new(Kind::Numbered);
/// enc.add("car").unwrap();
/// enc.add("cat").unwrap();
/// assert!(enc.add("cab").is_err());
///
/// let fsa = enc.finalize();
/// assert_eq!(fsa.size(), 2);
/// assert_eq!(fsa.locate("cat").unwrap(), Some(2));
/// ```
pub struct Encoder {
    kind: Kind,
    open: Vec<OpenState>,
    states: Vec<State>,
    register: HashTable<StateId>,
    hasher: DefaultHashBuilder,
    len: u32,
}

/// A state on the path of the previous word, not yet minimized.
struct OpenState {
    label: u8,
    state: State,
}

impl Encoder {
    /// Creates an empty encoder for the given kind of automaton.
    pub fn new(kind: Kind) -> Self {
        Encoder {
            kind,
            open: vec![OpenState {
                label: 0,
                state: State::new(false),
            }],
            states: Vec::new(),
            register: HashTable::new(),
            hasher: DefaultHashBuilder::default(),
            len: 0,
        }
    }

    /// Returns the kind of automaton being built.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the number of words added so far.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Returns true if no word has been added yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a word.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the word is empty.
    /// - [`Error::WordTooLong`] if it is longer than [`MAX_WORD_LEN`].
    /// - [`Error::OutOfOrder`] if it does not sort strictly after the previous
    ///   word. Adding the same word twice is an ordering error too.
    ///
    /// On error the encoder is left unchanged.
    pub fn add(&mut self, word: impl AsRef<[u8]>) -> Result<()> {
        let word = word.as_ref();
        if word.is_empty() {
            return Err(Error::InvalidArgument("words must not be empty"));
        }
        if word.len() > MAX_WORD_LEN {
            return Err(Error::WordTooLong {
                len: word.len(),
                max: MAX_WORD_LEN,
            });
        }
        let prefix_length = self.prefix_length(word)?;
        let len = self
            .len
            .checked_add(1)
            .ok_or(Error::InvalidArgument("too many words"))?;

        self.minimize_suffix(prefix_length);
        self.open.extend(
            word[prefix_length..]
                .iter()
                .with_position()
                .map(|(pos, &label)| OpenState {
                    label,
                    state: State::new(matches!(pos, Position::Last | Position::Only)),
                }),
        );
        self.len = len;
        Ok(())
    }

    /// Returns the length of the prefix shared with the previous word, or an
    /// ordering error if `word` does not sort after it.
    fn prefix_length(&self, word: &[u8]) -> Result<usize> {
        let mut prefix_len = 0;
        for (i, &label) in word.iter().enumerate() {
            let is_last = i == word.len() - 1;
            let Some(prev) = self.open.get(prefix_len + 1) else {
                break;
            };
            if label > prev.label {
                break;
            }
            if label < prev.label || is_last {
                return Err(Error::OutOfOrder {
                    previous: self.previous_word(),
                    word: word.to_vec(),
                });
            }
            prefix_len += 1;
        }
        Ok(prefix_len)
    }

    fn previous_word(&self) -> Vec<u8> {
        self.open[1..].iter().map(|s| s.label).collect()
    }

    /// Minimizes every open state deeper than `depth`, deepest first, and
    /// attaches each one to its parent.
    fn minimize_suffix(&mut self, depth: usize) {
        debug_assert!(self.open.len() > depth);
        while self.open.len() > depth + 1 {
            let Some(OpenState { label, state }) = self.open.pop() else {
                break;
            };
            let id = self.register(state);
            if let Some(parent) = self.open.last_mut() {
                parent.state.children.push(label, id);
            }
        }
    }

    /// Returns the registered state equal to `state`, registering it if none exists.
    fn register(&mut self, state: State) -> StateId {
        debug_assert!(
            state.children.iter().all(|t| t.target.index() < self.states.len()),
            "Cannot register a state before its targets"
        );
        let hash = self.hasher.hash_one(&state);
        let states = &self.states;
        if let Some(&id) = self.register.find(hash, |&id| states[id.index()] == state) {
            return id;
        }
        let id = StateId(self.states.len() as u32);
        self.states.push(state);
        let (states, hasher) = (&self.states, &self.hasher);
        self.register
            .insert_unique(hash, id, |&id| hasher.hash_one(&states[id.index()]));
        id
    }

    /// Discards everything added so far, returning to the state of [`Encoder::new`].
    pub fn clear(&mut self) {
        *self = Encoder::new(self.kind);
    }

    /// Finishes construction and returns the minimal automaton.
    pub fn finalize(mut self) -> Automaton {
        self.minimize_suffix(0);
        let root = self
            .open
            .pop()
            .map(|open| open.state)
            .unwrap_or_else(|| State::new(false));
        // An acyclic automaton's root cannot equal any state below it, so this
        // always appends and the root ends up last.
        self.register(root);

        let mut states = self.states;
        Automaton::assign_counts(&mut states);
        debug!(
            "finalized {} automaton: {} words, {} states",
            self.kind,
            self.len,
            states.len()
        );
        Automaton {
            states,
            kind: self.kind,
            len: self.len,
        }
    }

    /// Finishes construction and writes the automaton in binary form.
    pub fn finalize_and_write<W: Write>(self, sink: W) -> Result<Automaton> {
        let fsa = self.finalize();
        fsa.dump(sink)?;
        Ok(fsa)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new(Kind::default())
    }
}

/// Builds an automaton from an iterator of words.
///
/// Words **must** be provided in strictly increasing byte order.
///
/// # Examples
///
/// ```
/// use minidawg::dawg::{encode, Kind};
///
/// let fsa = encode(Kind::Standard, ["APPLE", "BANANA", "CHERRY"]).unwrap();
/// assert!(fsa.contains("BANANA"));
/// assert!(!fsa.contains("APRICOT"));
/// ```
pub fn encode<W: AsRef<[u8]>>(kind: Kind, words: impl IntoIterator<Item = W>) -> Result<Automaton> {
    let mut enc = Encoder::new(kind);
    for word in words {
        enc.add(word)?;
    }
    Ok(enc.finalize())
}

/// Builds an automaton from a reader holding one word per line.
///
/// Line terminators (`\n` or `\r\n`) are stripped and empty lines skipped.
/// Lines are taken as raw bytes and need not be valid UTF-8.
pub fn encode_lines<R: BufRead>(kind: Kind, mut reader: R) -> Result<Automaton> {
    let mut enc = Encoder::new(kind);

    // Reuse one buffer for every line instead of allocating per word.
    let mut buf = Vec::with_capacity(80);
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let word = trim_line(&buf);
        if !word.is_empty() {
            enc.add(word)?;
        }
    }
    Ok(enc.finalize())
}

fn trim_line(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
