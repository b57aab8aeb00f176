use smallvec::SmallVec;

use super::automaton::{Automaton, Kind, StateId};
use super::error::{Error, Result};

impl Automaton {
    /// Follows `bytes` from the root, returning the state reached.
    fn walk(&self, bytes: &[u8]) -> Option<StateId> {
        bytes
            .iter()
            .try_fold(self.root(), |id, &b| self.state(id).get(b))
    }

    pub(crate) fn require_numbered(&self) -> Result<()> {
        match self.kind {
            Kind::Numbered => Ok(()),
            Kind::Standard => Err(Error::InvalidArgument(
                "ranks are only available on numbered automatons",
            )),
        }
    }

    /// Returns true if the automaton contains `word`.
    ///
    /// # Examples
    ///
    /// ```
    /// use minidawg::dawg::{encode, Kind};
    ///
    /// let fsa = encode(Kind::Standard, ["BAKE", "CAKE"]).unwrap();
    /// assert!(fsa.contains("CAKE"));
    /// assert!(!fsa.contains("CAK"));
    /// ```
    pub fn contains(&self, word: impl AsRef<[u8]>) -> bool {
        self.walk(word.as_ref())
            .is_some_and(|id| self.state(id).is_final())
    }

    /// Returns true if at least one word starts with `prefix`.
    pub fn has_prefix(&self, prefix: impl AsRef<[u8]>) -> bool {
        self.walk(prefix.as_ref())
            .is_some_and(|id| self.state(id).count() > 0)
    }

    /// Returns the 1-based rank of `word` in lexicographic order, or `None`
    /// if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] on a [`Kind::Standard`] automaton.
    ///
    /// # Examples
    ///
    /// ```
    /// use minidawg::dawg::{encode, Kind};
    ///
    /// let fsa = encode(Kind::Numbered, ["car", "cat", "cats"]).unwrap();
    /// assert_eq!(fsa.locate("cats").unwrap(), Some(3));
    /// assert_eq!(fsa.locate("ca").unwrap(), None);
    /// ```
    pub fn locate(&self, word: impl AsRef<[u8]>) -> Result<Option<u32>> {
        self.require_numbered()?;
        let mut id = self.root();
        let mut rank = 0u32;
        for &b in word.as_ref() {
            let state = self.state(id);
            // A final state on the way is a shorter word, sorting first.
            rank += u32::from(state.is_final());
            let mut next = None;
            for t in state.transitions() {
                if t.label < b {
                    rank += self.state(t.target).count();
                } else {
                    if t.label == b {
                        next = Some(t.target);
                    }
                    break;
                }
            }
            match next {
                Some(target) => id = target,
                None => return Ok(None),
            }
        }
        Ok(self.state(id).is_final().then_some(rank + 1))
    }

    /// Returns the word with the given 1-based rank, or `None` if `rank` is 0
    /// or greater than [`size`](Automaton::size).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] on a [`Kind::Standard`] automaton.
    ///
    /// # Examples
    ///
    /// ```
    /// use minidawg::dawg::{encode, Kind};
    ///
    /// let fsa = encode(Kind::Numbered, ["car", "cat", "cats"]).unwrap();
    /// assert_eq!(fsa.extract(2).unwrap().as_deref(), Some(&b"cat"[..]));
    /// assert_eq!(fsa.extract(4).unwrap(), None);
    /// ```
    pub fn extract(&self, rank: u32) -> Result<Option<Vec<u8>>> {
        self.require_numbered()?;
        if rank == 0 || rank > self.len {
            return Ok(None);
        }
        let mut word: SmallVec<[u8; 32]> = SmallVec::new();
        let mut id = self.root();
        let mut remaining = rank;
        loop {
            let state = self.state(id);
            if state.is_final() {
                if remaining == 1 {
                    return Ok(Some(word.into_vec()));
                }
                remaining -= 1;
            }
            let mut next = None;
            for t in state.transitions() {
                let count = self.state(t.target).count();
                if remaining > count {
                    remaining -= count;
                } else {
                    next = Some(t);
                    break;
                }
            }
            let Some(t) = next else {
                return Ok(None);
            };
            word.push(t.label);
            id = t.target;
        }
    }
}
