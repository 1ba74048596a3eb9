//! List grouping state
//!
//! Contiguous list paragraphs sharing one numbering id form one list block.
//! Any other paragraph, a blank line, a heading or a different numbering id
//! closes the open list.

/// Numbering id of the list block currently open, if any
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListState {
    open: Option<usize>,
}

impl ListState {
    pub(crate) fn close(&mut self) {
        self.open = None;
    }

    /// True when a paragraph with `num_id` extends the open list
    pub(crate) fn continues(&self, num_id: usize) -> bool {
        self.open == Some(num_id)
    }

    pub(crate) fn open(&mut self, num_id: usize) {
        self.open = Some(num_id);
    }
}
