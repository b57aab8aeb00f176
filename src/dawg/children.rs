use super::automaton::StateId;

/// An outgoing edge of a state: a byte label and the index of its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    /// The byte consumed by this transition.
    pub label: u8,
    /// The state reached after consuming `label`.
    pub target: StateId,
}

/// A compact representation of the transitions of a state that doesn't allocate until
/// there are at least three of them.
///
/// Transitions are always kept sorted by label, with no duplicate labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Children {
    /// No transitions.
    #[default]
    None,
    /// Exactly one transition.
    One(Transition),
    /// Exactly two transitions.
    Two(Transition, Transition),
    /// Three or more transitions stored in a vector.
    Many(Vec<Transition>),
}

impl Children {
    /// Gets the transition at the specified index.
    ///
    /// Returns `None` if the index is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Transition> {
        match self {
            Children::None => None,
            Children::One(t) => (index == 0).then_some(*t),
            Children::Two(t1, t2) => match index {
                0 => Some(*t1),
                1 => Some(*t2),
                _ => None,
            },
            Children::Many(children) => children.get(index).copied(),
        }
    }

    /// Returns the number of transitions.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Children::None => 0,
            Children::One(_) => 1,
            Children::Two(..) => 2,
            Children::Many(children) => children.len(),
        }
    }

    /// Returns true if there are no transitions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Children::None)
    }

    /// Returns the target of the transition labelled `label`, if any.
    #[inline]
    pub fn find(&self, label: u8) -> Option<StateId> {
        match self {
            Children::None => None,
            Children::One(t) => (t.label == label).then_some(t.target),
            Children::Two(t1, t2) => {
                if t1.label == label {
                    Some(t1.target)
                } else if t2.label == label {
                    Some(t2.target)
                } else {
                    None
                }
            }
            Children::Many(children) => {
                // Unrolling by 2 exposes load-level parallelism and beats binary search
                // on the small fan-outs typical of natural-language lexicons.
                let chunks = children.chunks_exact(2);
                let remainder = chunks.remainder();
                for chunk in chunks {
                    if chunk[0].label == label {
                        return Some(chunk[0].target);
                    }
                    if chunk[1].label == label {
                        return Some(chunk[1].target);
                    }
                }
                remainder
                    .iter()
                    .find(|t| t.label == label)
                    .map(|t| t.target)
            }
        }
    }

    /// Returns the index of the first transition whose label is not less than `label`.
    ///
    /// Equals [`len`](Children::len) when every label is smaller.
    pub fn lower_bound(&self, label: u8) -> usize {
        match self {
            Children::None => 0,
            Children::One(t) => usize::from(t.label < label),
            Children::Two(t1, t2) => usize::from(t1.label < label) + usize::from(t2.label < label),
            Children::Many(children) => children.partition_point(|t| t.label < label),
        }
    }

    /// Appends a transition whose label is greater than every existing label.
    pub(crate) fn push(&mut self, label: u8, target: StateId) {
        debug_assert!(self.iter().all(|t| t.label < label), "labels must be added in order");
        let t = Transition { label, target };
        *self = match std::mem::take(self) {
            Children::None => Children::One(t),
            Children::One(t1) => Children::Two(t1, t),
            Children::Two(t1, t2) => Children::Many(vec![t1, t2, t]),
            Children::Many(mut children) => {
                children.push(t);
                Children::Many(children)
            }
        };
    }

    /// Returns an iterator over the transitions in label order.
    #[inline]
    pub fn iter(&self) -> ChildIter<'_> {
        ChildIter {
            children: self,
            index: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = Transition;
    type IntoIter = ChildIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the transitions of a state.
#[derive(Clone)]
pub struct ChildIter<'a> {
    children: &'a Children,
    index: usize,
}

impl Iterator for ChildIter<'_> {
    type Item = Transition;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let next = self.children.get(self.index)?;
        self.index += 1;
        Some(next)
    }

    /// Since we know the exact size, we can do better than the default implementation.
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.children.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChildIter<'_> {}
