use crate::node::Node;

/// One bounded read from a [`DirCursor`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub entries: Vec<Node>,
    /// `true` once the cursor has handed out every entry. Reading an
    /// exhausted cursor again yields an empty page with this flag set,
    /// never an error.
    pub exhausted: bool,
}

/// Iterator-like cursor over a directory's children.
///
/// Entries keep the order supplied by the backing listing. The position
/// only moves forward; repeated bounded reads concatenate to exactly one
/// unbounded read.
#[derive(Clone, Debug)]
pub struct DirCursor {
    entries: Vec<Node>,
    pos: usize,
}

impl DirCursor {
    pub fn new(entries: Vec<Node>) -> Self {
        Self { entries, pos: 0 }
    }

    /// Read up to `limit` entries; `None` (or a zero limit) reads
    /// everything remaining.
    pub fn next(&mut self, limit: Option<usize>) -> Page {
        let end = match limit {
            Some(n) if n > 0 => (self.pos + n).min(self.entries.len()),
            _ => self.entries.len(),
        };
        let entries = self.entries[self.pos..end].to_vec();
        self.pos = end;
        Page {
            entries,
            exhausted: self.pos == self.entries.len(),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.entries.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos == self.entries.len()
    }
}
