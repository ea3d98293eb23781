//! Minimal single-region edit between two texts.

use serde::Serialize;

/// The one contiguous region where two texts differ.
///
/// `original[start_offset..end_offset_in_original]` is replaced by
/// `new[start_offset..end_offset_in_new]`; everything else is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditRegion {
    pub start_offset: usize,
    pub end_offset_in_original: usize,
    pub end_offset_in_new: usize,
}

impl EditRegion {
    /// Text that replaces the original region.
    pub fn replacement<'a>(&self, new: &'a str) -> &'a str {
        &new[self.start_offset..self.end_offset_in_new]
    }

    /// Apply the edit to `original`, taking the replacement from `new`.
    pub fn apply(&self, original: &str, new: &str) -> String {
        let mut out = String::with_capacity(new.len());
        out.push_str(&original[..self.start_offset]);
        out.push_str(self.replacement(new));
        out.push_str(&original[self.end_offset_in_original..]);
        out
    }
}

/// Common prefix and suffix trimmed off, on character boundaries.
pub fn minimal_edit(original: &str, new: &str) -> EditRegion {
    let a = original.as_bytes();
    let b = new.as_bytes();

    let mut prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    while !original.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = a.len().min(b.len()) - prefix;
    let mut suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take(max_suffix)
        .take_while(|(x, y)| x == y)
        .count();
    while !original.is_char_boundary(a.len() - suffix) || !new.is_char_boundary(b.len() - suffix) {
        suffix -= 1;
    }

    EditRegion {
        start_offset: prefix,
        end_offset_in_original: a.len() - suffix,
        end_offset_in_new: b.len() - suffix,
    }
}
