use std::fmt;
use std::str::FromStr;

use super::children::{ChildIter, Children};
use super::error::Error;

/// Index of a state inside an [`Automaton`]'s arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) u32);

impl StateId {
    /// Returns the arena index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The variant of an automaton.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Membership and enumeration only.
    #[default]
    Standard,
    /// Transitions are annotated with word counts, giving a perfect hash
    /// (word to rank and rank to word).
    Numbered,
}

impl Kind {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Kind::Standard => 0,
            Kind::Numbered => 1,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Kind::Standard),
            1 => Some(Kind::Numbered),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Standard => "standard",
            Kind::Numbered => "numbered",
        })
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Kind::Standard),
            "numbered" => Ok(Kind::Numbered),
            _ => Err(Error::InvalidArgument("automaton kind must be 'standard' or 'numbered'")),
        }
    }
}

/// A state of the automaton.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct State {
    pub(crate) word: bool,
    pub(crate) children: Children,
    pub(crate) count: u32,
}

impl State {
    pub(crate) fn new(word: bool) -> Self {
        State {
            word,
            children: Children::None,
            count: 0,
        }
    }

    /// True if this state corresponds to the end of a word.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.word
    }

    /// Number of words accepted from this state, itself included if final.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Returns the state that `label`'s transition leads to, or None if there is none.
    #[inline]
    pub fn get(&self, label: u8) -> Option<StateId> {
        self.children.find(label)
    }

    /// Returns an iterator over the outgoing transitions in label order.
    #[inline]
    pub fn transitions(&self) -> ChildIter<'_> {
        self.children.iter()
    }

    /// Returns the number of outgoing transitions.
    #[inline]
    pub fn transition_count(&self) -> usize {
        self.children.len()
    }
}

/// An immutable minimal acyclic automaton.
///
/// All states live in one vector owned by the automaton and refer to each
/// other by index. States are stored in post-order: every transition points
/// to a smaller index and the root is the last state.
///
/// Build one with an [`Encoder`](super::Encoder) or read one with
/// [`Automaton::load`].
#[derive(Clone)]
pub struct Automaton {
    pub(crate) states: Vec<State>,
    pub(crate) kind: Kind,
    pub(crate) len: u32,
}

impl Automaton {
    /// Returns the number of words in the automaton.
    #[inline]
    pub fn size(&self) -> u32 {
        self.len
    }

    /// Returns true if the automaton holds no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the automaton's variant.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Returns the number of distinct states.
    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Returns the id of the root state.
    #[inline]
    pub fn root(&self) -> StateId {
        debug_assert!(!self.states.is_empty());
        StateId((self.states.len() - 1) as u32)
    }

    /// Returns the state with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this automaton.
    #[inline]
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    /// Fills in every state's word count in one forward pass.
    ///
    /// Relies on post-order storage: targets are always counted before the
    /// states that point at them.
    pub(crate) fn assign_counts(states: &mut [State]) {
        for i in 0..states.len() {
            let (done, rest) = states.split_at_mut(i);
            let state = &mut rest[0];
            let below: u32 = state
                .children
                .iter()
                .map(|t| done[t.target.index()].count)
                .sum();
            state.count = below + u32::from(state.word);
        }
    }
}

impl fmt::Debug for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("kind", &self.kind)
            .field("size", &self.len)
            .field("state_count", &self.state_count())
            .finish()
    }
}
