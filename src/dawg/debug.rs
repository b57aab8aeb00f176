//! Human-readable views of an automaton.
//!
//! These are write-only: nothing in this crate reads them back.

use std::ascii;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use super::automaton::{Automaton, Kind, StateId};
use super::error::{Error, Result};

/// A debug output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DumpFormat {
    /// One word per line, in lexicographic order.
    #[default]
    Txt,
    /// One tab-separated record per transition:
    /// `state  label  target  final[  count]`.
    Tsv,
    /// A Graphviz digraph.
    Dot,
}

impl fmt::Display for DumpFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DumpFormat::Txt => "txt",
            DumpFormat::Tsv => "tsv",
            DumpFormat::Dot => "dot",
        })
    }
}

impl FromStr for DumpFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "txt" => Ok(DumpFormat::Txt),
            "tsv" => Ok(DumpFormat::Tsv),
            "dot" => Ok(DumpFormat::Dot),
            _ => Err(Error::InvalidArgument("dump format must be 'txt', 'tsv' or 'dot'")),
        }
    }
}

impl Automaton {
    /// Writes a human-readable view of the automaton.
    ///
    /// # Examples
    ///
    /// ```
    /// use minidawg::dawg::{encode, DumpFormat, Kind};
    ///
    /// let fsa = encode(Kind::Standard, ["car", "cat"]).unwrap();
    /// let mut out = Vec::new();
    /// fsa.write_debug(&mut out, DumpFormat::Txt).unwrap();
    /// assert_eq!(out, b"car\ncat\n");
    /// ```
    pub fn write_debug<W: Write>(&self, mut sink: W, format: DumpFormat) -> Result<()> {
        match format {
            DumpFormat::Txt => self.write_words(&mut sink)?,
            DumpFormat::Tsv => self.write_edges(&mut sink)?,
            DumpFormat::Dot => self.write_dot(&mut sink)?,
        }
        sink.flush()?;
        Ok(())
    }

    fn write_words<W: Write>(&self, sink: &mut W) -> Result<()> {
        for word in self.iter() {
            sink.write_all(&word)?;
            sink.write_all(b"\n")?;
        }
        Ok(())
    }

    fn write_edges<W: Write>(&self, sink: &mut W) -> Result<()> {
        let numbered = self.kind == Kind::Numbered;
        for id in self.depth_first() {
            for t in self.state(id).transitions() {
                let target = self.state(t.target);
                write!(
                    sink,
                    "{}\t{}\t{}\t{}",
                    id,
                    ascii::escape_default(t.label),
                    t.target,
                    u8::from(target.is_final())
                )?;
                if numbered {
                    write!(sink, "\t{}", target.count())?;
                }
                writeln!(sink)?;
            }
        }
        Ok(())
    }

    fn write_dot<W: Write>(&self, sink: &mut W) -> Result<()> {
        let numbered = self.kind == Kind::Numbered;
        let order = self.depth_first();
        writeln!(sink, "digraph automaton {{")?;
        writeln!(sink, "  rankdir=LR;")?;
        writeln!(sink, "  node [shape=circle, label=\"\"];")?;
        for &id in &order {
            let shape = if self.state(id).is_final() { "doublecircle" } else { "circle" };
            writeln!(sink, "  {id} [shape={shape}];")?;
        }
        for &id in &order {
            for t in self.state(id).transitions() {
                // escape_default already escapes quotes and backslashes.
                let label = ascii::escape_default(t.label);
                if numbered {
                    let count = self.state(t.target).count();
                    writeln!(sink, "  {id} -> {} [label=\"{label}/{count}\"];", t.target)?;
                } else {
                    writeln!(sink, "  {id} -> {} [label=\"{label}\"];", t.target)?;
                }
            }
        }
        writeln!(sink, "}}")?;
        Ok(())
    }

    /// Returns the reachable states in depth-first pre-order, children in label order.
    fn depth_first(&self) -> Vec<StateId> {
        let mut visited = vec![false; self.states.len()];
        let mut order = Vec::with_capacity(self.states.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id.index()], true) {
                continue;
            }
            order.push(id);
            // Pushed in reverse so the smallest label is explored first.
            let start = stack.len();
            stack.extend(self.state(id).transitions().map(|t| t.target));
            stack[start..].reverse();
        }
        order
    }
}
