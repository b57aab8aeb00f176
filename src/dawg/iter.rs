use std::iter::FusedIterator;

use smallvec::SmallVec;

use super::automaton::{Automaton, StateId};
use super::error::Result;

/// A position in the depth-first traversal: a state and the index of the
/// next transition to explore from it.
#[derive(Clone, Copy, Debug)]
struct Frame {
    state: StateId,
    next: usize,
}

/// An iterator over the words of an [`Automaton`] in lexicographic order.
///
/// The traversal is kept on an explicit stack, which lets it start anywhere:
/// at the first word, at the first word not less than a given word, at a
/// given rank, or confined to the words sharing a prefix. Once it returns
/// `None` it stays exhausted.
///
/// # Examples
///
/// ```
/// use minidawg::dawg::{encode, Kind};
///
/// let fsa = encode(Kind::Standard, ["greet", "greeting", "greets", "grid"]).unwrap();
/// let words: Vec<Vec<u8>> = fsa.iter_prefix("greet").collect();
/// assert_eq!(words, [b"greet".to_vec(), b"greeting".to_vec(), b"greets".to_vec()]);
/// ```
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    fsa: &'a Automaton,
    stack: Vec<Frame>,
    word: SmallVec<[u8; 32]>,
    /// The top frame's state is final and its word hasn't been produced yet.
    pending: bool,
    /// Stack height below which the traversal must not return.
    floor: usize,
}

impl<'a> Iter<'a> {
    fn at_root(fsa: &'a Automaton) -> Self {
        let root = fsa.root();
        Iter {
            fsa,
            stack: vec![Frame {
                state: root,
                next: 0,
            }],
            word: SmallVec::new(),
            pending: fsa.state(root).is_final(),
            floor: 1,
        }
    }

    fn exhausted(fsa: &'a Automaton) -> Self {
        Iter {
            fsa,
            stack: Vec::new(),
            word: SmallVec::new(),
            pending: false,
            floor: 1,
        }
    }

    /// Marks the transition at `index` of the top frame as taken and enters its target.
    fn descend(&mut self, index: usize) -> bool {
        let fsa = self.fsa;
        let Some(top) = self.stack.last_mut() else {
            return false;
        };
        let Some(t) = fsa.state(top.state).children.get(index) else {
            return false;
        };
        top.next = index + 1;
        self.word.push(t.label);
        self.stack.push(Frame {
            state: t.target,
            next: 0,
        });
        self.pending = fsa.state(t.target).is_final();
        true
    }

    /// Positions the cursor so that the first word produced is the smallest
    /// word not less than `target`.
    fn seek(&mut self, target: &[u8]) {
        let fsa = self.fsa;
        for &b in target {
            let Some(top) = self.stack.last_mut() else {
                return;
            };
            // Shorter words on the path sort before `target`.
            self.pending = false;
            let children = &fsa.state(top.state).children;
            let index = children.lower_bound(b);
            match children.get(index) {
                Some(t) if t.label == b => {
                    self.descend(index);
                }
                _ => {
                    // Everything from the next greater sibling on sorts after `target`.
                    top.next = index;
                    return;
                }
            }
        }
    }

    /// Positions the cursor on the word of the given 1-based rank.
    fn seek_rank(&mut self, rank: u32) {
        let fsa = self.fsa;
        let mut remaining = rank;
        loop {
            let Some(&top) = self.stack.last() else {
                return;
            };
            let state = fsa.state(top.state);
            if state.is_final() {
                if remaining == 1 {
                    return;
                }
                remaining -= 1;
            }
            self.pending = false;
            let mut chosen = None;
            for (index, t) in state.transitions().enumerate() {
                let count = fsa.state(t.target).count();
                if remaining > count {
                    remaining -= count;
                } else {
                    chosen = Some(index);
                    break;
                }
            }
            match chosen {
                Some(index) => {
                    self.descend(index);
                }
                None => {
                    self.stack.clear();
                    return;
                }
            }
        }
    }

    fn pop(&mut self) {
        if self.stack.len() <= self.floor {
            self.stack.clear();
            return;
        }
        self.stack.pop();
        self.word.pop();
    }
}

impl Iterator for Iter<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending {
                self.pending = false;
                return Some(self.word.to_vec());
            }
            let top = *self.stack.last()?;
            if !self.descend(top.next) {
                self.pop();
            }
        }
    }
}

impl FusedIterator for Iter<'_> {}

impl Automaton {
    /// Returns an iterator over all words in lexicographic order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::at_root(self)
    }

    /// Returns an iterator over the words not less than `word`, in
    /// lexicographic order.
    ///
    /// If `word` sorts after every stored word the iterator is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use minidawg::dawg::{encode, Kind};
    ///
    /// let fsa = encode(Kind::Standard, ["alfa", "bravo", "charlie"]).unwrap();
    /// let mut it = fsa.iter_from("b");
    /// assert_eq!(it.next().as_deref(), Some(&b"bravo"[..]));
    /// assert_eq!(fsa.iter_from("delta").next(), None);
    /// ```
    pub fn iter_from(&self, word: impl AsRef<[u8]>) -> Iter<'_> {
        let mut it = Iter::at_root(self);
        it.seek(word.as_ref());
        it
    }

    /// Returns an iterator starting at the word of the given 1-based rank.
    ///
    /// A rank of 0 or beyond [`size`](Automaton::size) gives an empty iterator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](super::Error::InvalidArgument) on a
    /// [`Kind::Standard`](super::Kind::Standard) automaton.
    pub fn iter_from_rank(&self, rank: u32) -> Result<Iter<'_>> {
        self.require_numbered()?;
        if rank == 0 || rank > self.len {
            return Ok(Iter::exhausted(self));
        }
        let mut it = Iter::at_root(self);
        it.seek_rank(rank);
        Ok(it)
    }

    /// Returns an iterator over the words starting with `prefix`, in
    /// lexicographic order.
    pub fn iter_prefix(&self, prefix: impl AsRef<[u8]>) -> Iter<'_> {
        let prefix = prefix.as_ref();
        let mut it = Iter::at_root(self);
        for &b in prefix {
            let Some(top) = it.stack.last() else {
                break;
            };
            let children = &self.state(top.state).children;
            let index = children.lower_bound(b);
            if !children.get(index).is_some_and(|t| t.label == b) {
                return Iter::exhausted(self);
            }
            it.descend(index);
        }
        it.floor = it.stack.len();
        it
    }
}

impl<'a> IntoIterator for &'a Automaton {
    type Item = Vec<u8>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
