//! Binary persistence.
//!
//! The format is pointer-free: states are written in post-order and every
//! transition stores how many records back its target lies, so a file can be
//! read in one forward pass with each target already materialized.
//!
//! ```text
//! magic        [u8; 4] = "MFSA"
//! version      u32
//! kind         u8        0 = standard, 1 = numbered
//! word_count   u32
//! state_count  u32       >= 1
//! state_count records, root last:
//!   flags      u8        bit 0 = final
//!   n          u16       <= 256
//!   n transitions, labels strictly ascending:
//!     label    u8
//!     offset   u32       record index minus target index
//!     count    u32       numbered only: words reachable through the transition
//! ```
//!
//! All integers are little-endian.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace, warn};

use super::automaton::{Automaton, Kind, State, StateId};
use super::children::Children;
use super::error::{Error, Result};

/// Leading bytes of every serialized automaton.
pub const MAGIC: [u8; 4] = *b"MFSA";

/// Current format version.
pub const VERSION: u32 = 1;

const FLAG_FINAL: u8 = 0b0000_0001;

/// Upper bound on states allocated up front, whatever the header claims.
const MAX_PREALLOC: usize = 1 << 16;

const MAX_TRANSITIONS: u16 = 256;

fn corrupt(reason: &'static str) -> Error {
    warn!("rejecting automaton: {reason}");
    Error::Corrupt(reason)
}

impl Automaton {
    /// Writes the automaton in binary form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing fails.
    pub fn dump<W: Write>(&self, mut sink: W) -> Result<()> {
        let numbered = self.kind == Kind::Numbered;
        sink.write_all(&MAGIC)?;
        sink.write_u32::<LittleEndian>(VERSION)?;
        sink.write_u8(self.kind.to_byte())?;
        sink.write_u32::<LittleEndian>(self.len)?;
        sink.write_u32::<LittleEndian>(self.states.len() as u32)?;

        let mut transitions = 0usize;
        for (index, state) in self.states.iter().enumerate() {
            let flags = if state.word { FLAG_FINAL } else { 0 };
            sink.write_u8(flags)?;
            sink.write_u16::<LittleEndian>(state.children.len() as u16)?;
            for t in &state.children {
                debug_assert!(t.target.index() < index);
                sink.write_u8(t.label)?;
                sink.write_u32::<LittleEndian>((index - t.target.index()) as u32)?;
                if numbered {
                    sink.write_u32::<LittleEndian>(self.state(t.target).count)?;
                }
            }
            transitions += state.children.len();
        }
        sink.flush()?;
        debug!(
            "dumped {} automaton: {} words, {} states, {} transitions",
            self.kind,
            self.len,
            self.states.len(),
            transitions
        );
        Ok(())
    }

    /// Reads an automaton written by [`Automaton::dump`].
    ///
    /// The header is validated before anything is allocated from it, and
    /// every record is checked as it is read: transition offsets must point
    /// at an already-read record, labels must ascend, and stored counts must
    /// agree with the counts recomputed from the structure.
    ///
    /// # Errors
    ///
    /// - [`Error::Corrupt`] on a bad magic or version, truncated input, or any
    ///   inconsistent record.
    /// - [`Error::Io`] if reading fails.
    pub fn load<R: Read>(mut source: R) -> Result<Automaton> {
        let mut magic = [0u8; 4];
        source.read_exact(&mut magic).map_err(Error::from_read)?;
        if magic != MAGIC {
            return Err(corrupt("bad magic"));
        }
        let version = source.read_u32::<LittleEndian>().map_err(Error::from_read)?;
        if version != VERSION {
            return Err(corrupt("unsupported format version"));
        }
        let kind = Kind::from_byte(source.read_u8().map_err(Error::from_read)?)
            .ok_or_else(|| corrupt("unknown automaton kind"))?;
        let len = source.read_u32::<LittleEndian>().map_err(Error::from_read)?;
        let state_count = source.read_u32::<LittleEndian>().map_err(Error::from_read)?;
        if state_count == 0 {
            return Err(corrupt("automaton has no states"));
        }
        debug!("loading {kind} automaton: {len} words, {state_count} states");

        let mut states = Vec::with_capacity((state_count as usize).min(MAX_PREALLOC));
        for index in 0..state_count as usize {
            let state = read_state(&mut source, &states, kind)?;
            if state.children.is_empty() && !state.word && state_count != 1 {
                return Err(corrupt("state accepts no words"));
            }
            trace!(
                "state {index}: final={} transitions={} count={}",
                state.word,
                state.children.len(),
                state.count
            );
            states.push(state);
        }

        let root_count = states.last().map_or(0, |s| s.count);
        if root_count != len {
            return Err(corrupt("word count does not match the automaton"));
        }
        Ok(Automaton { states, kind, len })
    }

    /// Serializes the automaton into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.dump(&mut buf);
        buf
    }

    /// Reads an automaton from a byte slice holding exactly one serialized automaton.
    ///
    /// Trailing bytes after the root record are rejected as corruption.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Automaton> {
        let fsa = Automaton::load(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(corrupt("trailing bytes after root state"));
        }
        Ok(fsa)
    }

    /// Writes the automaton to a file, creating or truncating it.
    pub fn dump_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.dump(BufWriter::new(file))
    }

    /// Reads an automaton from a file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Automaton> {
        let file = File::open(path)?;
        Automaton::load(BufReader::new(file))
    }
}

/// Reads the record at position `states.len()`, resolving each transition
/// against the records already read.
fn read_state<R: Read>(source: &mut R, states: &[State], kind: Kind) -> Result<State> {
    let index = states.len();
    let flags = source.read_u8().map_err(Error::from_read)?;
    if flags & !FLAG_FINAL != 0 {
        return Err(corrupt("unknown state flags"));
    }
    let word = flags & FLAG_FINAL != 0;
    let n = source.read_u16::<LittleEndian>().map_err(Error::from_read)?;
    if n > MAX_TRANSITIONS {
        return Err(corrupt("too many transitions"));
    }

    let mut children = Children::None;
    let mut count = u32::from(word);
    let mut prev_label: Option<u8> = None;
    for _ in 0..n {
        let label = source.read_u8().map_err(Error::from_read)?;
        if prev_label.is_some_and(|prev| label <= prev) {
            return Err(corrupt("transition labels out of order"));
        }
        prev_label = Some(label);

        let offset = source.read_u32::<LittleEndian>().map_err(Error::from_read)? as usize;
        if offset == 0 || offset > index {
            return Err(corrupt("transition offset out of range"));
        }
        let target = index - offset;
        let target_count = states[target].count;
        if kind == Kind::Numbered {
            let stored = source.read_u32::<LittleEndian>().map_err(Error::from_read)?;
            if stored != target_count {
                return Err(corrupt("transition count mismatch"));
            }
        }
        count = count
            .checked_add(target_count)
            .ok_or_else(|| corrupt("word count overflow"))?;
        children.push(label, StateId(target as u32));
    }
    Ok(State {
        word,
        children,
        count,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dawg::encode;

    const WORDS: [&str; 8] = [
        "greenish",
        "greenness",
        "greens",
        "greet",
        "greeting",
        "greets",
        "gregarious",
        "gregariously",
    ];

    fn sample(kind: Kind) -> Automaton {
        encode(kind, WORDS).unwrap()
    }

    fn words(fsa: &Automaton) -> Vec<Vec<u8>> {
        fsa.iter().collect()
    }

    #[test]
    fn round_trip_both_kinds() {
        for kind in [Kind::Standard, Kind::Numbered] {
            let fsa = sample(kind);
            let loaded = Automaton::from_bytes(&fsa.to_bytes()).unwrap();
            assert_eq!(loaded.kind(), kind);
            assert_eq!(loaded.size(), WORDS.len() as u32);
            assert_eq!(loaded.state_count(), fsa.state_count());
            assert_eq!(words(&loaded), words(&fsa));
            assert_eq!(loaded.states, fsa.states);
        }
    }

    #[test]
    fn round_trip_empty() {
        let fsa = encode::<&str>(Kind::Numbered, []).unwrap();
        let loaded = Automaton::from_bytes(&fsa.to_bytes()).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.iter().next(), None);
    }

    #[test]
    fn header_layout() {
        let bytes = sample(Kind::Numbered).to_bytes();
        assert_eq!(&bytes[..4], b"MFSA");
        assert_eq!(bytes[4..8], VERSION.to_le_bytes());
        assert_eq!(bytes[8], 1);
        assert_eq!(bytes[9..13], (WORDS.len() as u32).to_le_bytes());
    }

    #[test]
    fn numbered_records_are_larger() {
        let standard = sample(Kind::Standard).to_bytes();
        let numbered = sample(Kind::Numbered).to_bytes();
        assert!(numbered.len() > standard.len());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.dat");
        let fsa = sample(Kind::Numbered);
        fsa.dump_file(&path).unwrap();
        let loaded = Automaton::load_file(&path).unwrap();
        assert_eq!(words(&loaded), words(&fsa));
        assert_eq!(loaded.locate("greets").unwrap(), Some(6));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Automaton::load_file(dir.path().join("nope.dat")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    fn assert_corrupt(bytes: &[u8]) {
        match Automaton::from_bytes(bytes) {
            Err(Error::Corrupt(_)) => {}
            other => panic!("expected corruption, got {other:?}"),
        }
    }

    #[test]
    fn bad_magic() {
        let mut bytes = sample(Kind::Standard).to_bytes();
        bytes[0] = b'X';
        assert_corrupt(&bytes);
    }

    #[test]
    fn bad_version() {
        let mut bytes = sample(Kind::Standard).to_bytes();
        bytes[4] = 9;
        assert_corrupt(&bytes);
    }

    #[test]
    fn bad_kind() {
        let mut bytes = sample(Kind::Standard).to_bytes();
        bytes[8] = 7;
        assert_corrupt(&bytes);
    }

    #[test]
    fn every_truncation_is_corrupt() {
        let bytes = sample(Kind::Numbered).to_bytes();
        for end in 0..bytes.len() {
            assert_corrupt(&bytes[..end]);
        }
    }

    #[test]
    fn trailing_bytes_are_corrupt() {
        let mut bytes = sample(Kind::Standard).to_bytes();
        bytes.push(0);
        assert_corrupt(&bytes);
    }

    #[test]
    fn wrong_word_count_is_corrupt() {
        let mut bytes = sample(Kind::Standard).to_bytes();
        bytes[9] += 1;
        assert_corrupt(&bytes);
    }

    #[test]
    fn huge_state_count_does_not_allocate() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert_corrupt(&bytes);
    }

    /// Header for a standard automaton with one word, followed by `records`.
    fn with_records(state_count: u32, records: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        bytes.push(0);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&state_count.to_le_bytes());
        bytes.extend_from_slice(records);
        bytes
    }

    #[test]
    fn handmade_single_word() {
        // state 0: final leaf; state 1: root --a--> 0
        let bytes = with_records(2, &[1, 0, 0, 0, 1, 0, b'a', 1, 0, 0, 0]);
        let fsa = Automaton::from_bytes(&bytes).unwrap();
        assert!(fsa.contains("a"));
        assert_eq!(fsa.size(), 1);
    }

    #[test]
    fn forward_offset_is_corrupt() {
        // The root points at itself.
        let bytes = with_records(2, &[1, 0, 0, 0, 1, 0, b'a', 0, 0, 0, 0]);
        assert_corrupt(&bytes);
        // The root points before the first record.
        let bytes = with_records(2, &[1, 0, 0, 0, 1, 0, b'a', 2, 0, 0, 0]);
        assert_corrupt(&bytes);
    }

    #[test]
    fn unordered_labels_are_corrupt() {
        let bytes = with_records(
            2,
            &[1, 0, 0, 0, 2, 0, b'b', 1, 0, 0, 0, b'a', 1, 0, 0, 0],
        );
        assert_corrupt(&bytes);
    }

    #[test]
    fn unknown_flags_are_corrupt() {
        let bytes = with_records(2, &[3, 0, 0, 0, 1, 0, b'a', 1, 0, 0, 0]);
        assert_corrupt(&bytes);
    }

    #[test]
    fn too_many_transitions_is_corrupt() {
        let bytes = with_records(1, &[1, 0x01, 0x01]);
        assert_corrupt(&bytes);
    }

    #[test]
    fn dead_state_is_corrupt() {
        let bytes = with_records(2, &[0, 0, 0, 0, 1, 0, b'a', 1, 0, 0, 0]);
        assert_corrupt(&bytes);
    }

    #[test]
    fn numbered_count_mismatch_is_corrupt() {
        let fsa = encode(Kind::Numbered, ["a"]).unwrap();
        let mut bytes = fsa.to_bytes();
        // The root's only transition count is the last field.
        let last = bytes.len() - 4;
        bytes[last] = 2;
        assert_corrupt(&bytes);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_io_error() {
        let err = sample(Kind::Standard).dump(FailingWriter).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
