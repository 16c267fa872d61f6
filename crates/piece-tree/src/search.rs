//! Streaming document search.
//!
//! `find` builds a multi-pattern matcher from the needle and streams the
//! document through it byte by byte, so the document is never materialized
//! as a contiguous string. The walker is adapted to `std::io::Read`, which
//! is the matcher's streaming input boundary.

use std::io::{self, Read};

use aho_corasick::AhoCorasick;

use crate::piece_tree::PieceTree;
use crate::walker::TreeWalker;

/// Adapts a [`TreeWalker`] to `std::io::Read`.
struct WalkerReader<'a> {
    walker: TreeWalker<'a>,
}

impl Read for WalkerReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.walker.next() {
                Some(byte) => {
                    buf[filled] = byte;
                    filled += 1;
                }
                None => break,
            }
        }
        Ok(filled)
    }
}

/// Byte offset of the first occurrence of `needle` in `tree`, or `None` if
/// the needle is empty, cannot be compiled, or does not occur.
pub(crate) fn find_first(tree: &PieceTree, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let matcher = AhoCorasick::new([needle]).ok()?;
    let reader = WalkerReader {
        walker: tree.walker(),
    };
    let found = matcher.stream_find_iter(reader).next()?.ok()?;
    Some(found.start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_in_original_buffer() {
        let tree = PieceTree::from_text("the quick brown fox");
        assert_eq!(find_first(&tree, "quick"), Some(4));
        assert_eq!(find_first(&tree, "the"), Some(0));
        assert_eq!(find_first(&tree, "fox"), Some(16));
    }

    #[test]
    fn test_find_across_piece_boundary() {
        let mut tree = PieceTree::from_text("hello world");
        tree.insert(5, "!!");
        // "hello!! world" puts "o!" across the original/add boundary.
        assert_eq!(find_first(&tree, "o!!"), Some(4));
        assert_eq!(find_first(&tree, "!! w"), Some(5));
    }

    #[test]
    fn test_find_absent_needle() {
        let tree = PieceTree::from_text("abc");
        assert_eq!(find_first(&tree, "xyz"), None);
    }

    #[test]
    fn test_find_empty_needle_and_empty_document() {
        let tree = PieceTree::from_text("abc");
        assert_eq!(find_first(&tree, ""), None);

        let empty = PieceTree::new();
        assert_eq!(find_first(&empty, "x"), None);
    }
}
