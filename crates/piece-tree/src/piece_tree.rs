//! The document facade over the piece tree.
//!
//! A [`PieceTree`] owns the backing buffers, the current tree root, and the
//! undo/redo history. All offsets in this module are byte offsets into the
//! document; lines are zero-based. Out-of-range offsets are clamped rather
//! than rejected, and zero-length edits are no-ops.

use std::fmt;

use crate::search;
use crate::storage::{BufferCollection, BufferCursor, BufferType, populate_line_starts};
use crate::tree::{NodeData, Piece, RedBlackTree};
use crate::walker::{ReverseTreeWalker, TreeWalker};

/// Location of a document offset within the tree: the owning node's payload,
/// the offset's remainder inside that node's piece, the node's start offset
/// in the document, and the document line the offset falls on.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NodePosition {
    pub(crate) node: Option<NodeData>,
    pub(crate) remainder: usize,
    pub(crate) start_offset: usize,
    pub(crate) line: usize,
}

/// Half-open byte range `[first, last)` of one document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRange {
    /// Offset of the first byte of the line.
    pub first: usize,
    /// Offset one past the last byte of the line.
    pub last: usize,
}

/// A text document stored as a persistent piece tree.
///
/// Every mutation replaces the tree root with a new version that shares all
/// untouched subtrees with the old one; the old root is pushed onto the undo
/// stack, which is what makes [`undo`](PieceTree::undo) and
/// [`redo`](PieceTree::redo) O(1).
///
/// ```
/// use piece_tree::PieceTree;
///
/// let mut tree = PieceTree::from_text("hello world");
/// tree.insert(5, ",");
/// assert_eq!(tree.text(), "hello, world");
/// tree.undo();
/// assert_eq!(tree.text(), "hello world");
/// ```
pub struct PieceTree {
    pub(crate) buffers: BufferCollection,
    pub(crate) root: RedBlackTree,
    last_insert: BufferCursor,

    pub(crate) lf_count: usize,
    pub(crate) total_content_length: usize,

    undo_stack: Vec<RedBlackTree>,
    redo_stack: Vec<RedBlackTree>,
}

/// A cursor sitting just past a newline always lands on column 0 of the next
/// line, so the newline count of a span is exactly its line delta.
fn newlines_between(start: BufferCursor, end: BufferCursor) -> usize {
    end.line - start.line
}

impl PieceTree {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Creates a document from an initial text snapshot. The snapshot becomes
    /// the read-only original buffer, spanned by a single piece.
    pub fn from_text(text: &str) -> Self {
        let mut tree = Self {
            buffers: BufferCollection::from_text(text),
            root: RedBlackTree::default(),
            last_insert: BufferCursor::default(),
            lf_count: 0,
            total_content_length: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };

        let orig = tree.buffers.buffer_at(BufferType::Original);
        if !orig.text().is_empty() {
            let last_line = orig.line_starts().len() - 1;
            let piece = Piece {
                buffer_type: BufferType::Original,
                first: BufferCursor::default(),
                last: BufferCursor {
                    line: last_line,
                    column: orig.text().len() - orig.line_starts()[last_line],
                },
                length: orig.text().len(),
                newline_count: last_line,
            };
            tree.root = tree.root.insert(NodeData::new(piece), 0);
        }

        tree.compute_buffer_meta();
        tree
    }

    // === Mutation ===

    /// Inserts `text` at byte offset `offset`. Offsets past the end of the
    /// document are clamped; an empty `text` is a no-op.
    pub fn insert(&mut self, offset: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let offset = offset.min(self.total_content_length);
        self.append_undo();
        self.internal_insert(offset, text);
        self.commit();
    }

    /// Erases `count` bytes starting at `offset`. The range is clamped to
    /// the document; erasing nothing (or from an empty document) is a no-op.
    pub fn erase(&mut self, offset: usize, count: usize) {
        if self.root.is_empty() {
            return;
        }
        let offset = offset.min(self.total_content_length);
        let count = count.min(self.total_content_length - offset);
        if count == 0 {
            return;
        }
        self.append_undo();
        self.internal_erase(offset, count);
        self.commit();
    }

    /// Resets to a fresh empty document, dropping all history.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Reverts the most recent mutation. Returns `false` if there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        let Some(prev_root) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.root.clone());
        self.root = prev_root;
        self.compute_buffer_meta();
        true
    }

    /// Re-applies the most recently undone mutation. Returns `false` if
    /// there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next_root) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.root.clone());
        self.root = next_root;
        self.compute_buffer_meta();
        true
    }

    // === Queries ===

    /// Total length of the document in bytes.
    pub fn length(&self) -> usize {
        self.total_content_length
    }

    /// Returns `true` if the document contains no text.
    pub fn is_empty(&self) -> bool {
        self.total_content_length == 0
    }

    /// Number of `'\n'` bytes in the document.
    pub fn line_feed_count(&self) -> usize {
        self.lf_count
    }

    /// Number of lines in the document; an empty document has one line.
    pub fn line_count(&self) -> usize {
        self.lf_count + 1
    }

    /// The line that `offset` falls on.
    pub fn line_at(&self, offset: usize) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.node_at(offset).line
    }

    /// The line and column of `offset`, with the column clamped to the line's
    /// content.
    pub fn line_column_at(&self, offset: usize) -> BufferCursor {
        if self.is_empty() {
            return BufferCursor::default();
        }
        let line = self.node_at(offset).line;
        let LineRange { first, last } = self.get_line_range(line);
        let column = offset.min(last) - first;
        BufferCursor { line, column }
    }

    /// The byte offset of `column` on `line`, clamped to the line's bounds.
    pub fn offset_at(&self, line: usize, column: usize) -> usize {
        let LineRange { first, last } = self.get_line_range(line);
        (first + column).min(last)
    }

    /// Byte range of `line`, excluding its trailing newline.
    pub fn get_line_range(&self, line: usize) -> LineRange {
        let mut range = LineRange::default();
        line_start(
            &mut range.first,
            &self.buffers,
            &self.root,
            line,
            accumulate_value,
        );
        line_start(
            &mut range.last,
            &self.buffers,
            &self.root,
            line + 1,
            accumulate_value_no_lf,
        );
        range
    }

    /// Byte range of `line`, including its trailing newline if present.
    pub fn get_line_range_with_newline(&self, line: usize) -> LineRange {
        let mut range = LineRange::default();
        line_start(
            &mut range.first,
            &self.buffers,
            &self.root,
            line,
            accumulate_value,
        );
        line_start(
            &mut range.last,
            &self.buffers,
            &self.root,
            line + 1,
            accumulate_value,
        );
        range
    }

    /// The content of `line` without its trailing newline.
    pub fn get_line_content(&self, line: usize) -> String {
        if self.root.is_empty() {
            return String::new();
        }
        let mut walker = TreeWalker::new(self, self.line_offset(line));
        let mut bytes = Vec::new();
        while let Some(byte) = walker.next() {
            if byte == b'\n' {
                break;
            }
            bytes.push(byte);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// The content of `line` including its trailing newline if present.
    pub fn get_line_content_with_newline(&self, line: usize) -> String {
        if self.root.is_empty() {
            return String::new();
        }
        let mut walker = TreeWalker::new(self, self.line_offset(line));
        let mut bytes = Vec::new();
        while let Some(byte) = walker.next() {
            bytes.push(byte);
            if byte == b'\n' {
                break;
            }
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Like [`get_line_content_with_newline`](Self::get_line_content_with_newline),
    /// but a trailing newline is replaced by a space so layout code can
    /// measure it like any other cell.
    pub fn get_line_content_for_layout_use(&self, line: usize) -> String {
        if self.root.is_empty() {
            return String::new();
        }
        let mut walker = TreeWalker::new(self, self.line_offset(line));
        let mut bytes = Vec::new();
        while let Some(byte) = walker.next() {
            if byte == b'\n' {
                bytes.push(b' ');
                break;
            }
            bytes.push(byte);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// The whole document as a string. Linear in the document size.
    pub fn text(&self) -> String {
        let bytes: Vec<u8> = self.walker().collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Up to `count` bytes of the document starting at `offset`.
    pub fn substr(&self, offset: usize, count: usize) -> String {
        let bytes: Vec<u8> = self.walker_at(offset).take(count).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// The byte at `offset`, if it is within the document.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        if offset >= self.total_content_length {
            return None;
        }
        TreeWalker::new(self, offset).current()
    }

    /// The character starting at `offset`. Returns `None` past the end of the
    /// document or when `offset` does not sit on a UTF-8 boundary.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.total_content_length {
            return None;
        }
        TreeWalker::new(self, offset).next_codepoint()
    }

    /// Byte offset of the first occurrence of `needle`, streaming the
    /// document through a multi-pattern matcher without copying it.
    pub fn find(&self, needle: &str) -> Option<usize> {
        search::find_first(self, needle)
    }

    // === Iteration ===

    /// A forward walker over the current snapshot, starting at offset 0.
    pub fn walker(&self) -> TreeWalker<'_> {
        TreeWalker::new(self, 0)
    }

    /// A forward walker over the current snapshot, starting at `offset`.
    pub fn walker_at(&self, offset: usize) -> TreeWalker<'_> {
        TreeWalker::new(self, offset)
    }

    /// A reverse walker over the current snapshot that reads the bytes
    /// behind `offset`.
    pub fn reverse_walker_at(&self, offset: usize) -> ReverseTreeWalker<'_> {
        ReverseTreeWalker::new(self, offset)
    }

    // === Internals ===

    fn commit(&mut self) {
        self.compute_buffer_meta();
        debug_assert!(self.root.check_invariants());
    }

    fn compute_buffer_meta(&mut self) {
        self.lf_count = self.root.lf_count();
        self.total_content_length = self.root.length();
    }

    fn append_undo(&mut self) {
        // A new edit invalidates anything that was undone.
        self.redo_stack.clear();
        self.undo_stack.push(self.root.clone());
    }

    /// The coalescing policy: a freshly built piece may be merged into
    /// `piece` only if `piece` is the most recent append to the add buffer.
    fn can_extend_piece(&self, piece: &Piece) -> bool {
        piece.buffer_type == BufferType::Add && piece.last == self.last_insert
    }

    fn internal_insert(&mut self, offset: usize, text: &str) {
        if self.root.is_empty() {
            let piece = self.build_piece(text);
            self.root = self.root.insert(NodeData::new(piece), 0);
            return;
        }

        let mut result = self.node_at(offset);
        // Past the last node; land on the final piece instead.
        if result.node.is_none() {
            result = self.node_at(self.total_content_length.saturating_sub(1));
        }
        let Some(node) = result.node else {
            return;
        };

        // Three cases: the offset is at the start of the node, at its end,
        // or strictly inside it.

        if result.start_offset == offset {
            // Inserting right after the piece that received the previous
            // insertion extends that piece instead of allocating a node, so
            // typing one character at a time does not grow the tree.
            if offset != 0 {
                let prev = self.node_at(offset - 1);
                if let Some(prev_node) = prev.node
                    && self.can_extend_piece(&prev_node.piece)
                {
                    let new_piece = self.build_piece(text);
                    self.combine_pieces(prev, new_piece);
                    return;
                }
            }
            let piece = self.build_piece(text);
            self.root = self.root.insert(NodeData::new(piece), offset);
            return;
        }

        let inside_node = offset < result.start_offset + node.piece.length;
        if !inside_node {
            // Same coalescing check at the end of the node.
            if self.can_extend_piece(&node.piece) {
                let new_piece = self.build_piece(text);
                self.combine_pieces(result, new_piece);
                return;
            }
            let piece = self.build_piece(text);
            self.root = self.root.insert(NodeData::new(piece), offset);
            return;
        }

        // Split the node in two and insert the new piece between the halves.
        let insert_pos = self.buffer_position(&node.piece, result.remainder);

        let new_len_right = self.buffers.buffer_offset(node.piece.buffer_type, node.piece.last)
            - self.buffers.buffer_offset(node.piece.buffer_type, insert_pos);
        let mut new_piece_right = node.piece;
        new_piece_right.first = insert_pos;
        new_piece_right.length = new_len_right;
        new_piece_right.newline_count = newlines_between(insert_pos, node.piece.last);

        let new_piece_left = self.trim_piece_right(&node.piece, insert_pos);
        let new_piece = self.build_piece(text);

        let mut at = result.start_offset;
        self.root = self.root.remove(at);
        self.root = self.root.insert(NodeData::new(new_piece_left), at);
        at += new_piece_left.length;
        self.root = self.root.insert(NodeData::new(new_piece), at);
        at += new_piece.length;
        self.root = self.root.insert(NodeData::new(new_piece_right), at);
    }

    fn internal_erase(&mut self, offset: usize, count: usize) {
        let first = self.node_at(offset);
        let last = self.node_at(offset + count);
        let Some(first_node) = first.node else {
            return;
        };

        let start_split_pos = self.buffer_position(&first_node.piece, first.remainder);

        // Simple case: the whole range lives inside one node. Trim the piece
        // on both sides and reinsert the non-empty remainders.
        if let Some(last_node) = last.node
            && first.start_offset == last.start_offset
        {
            let end_split_pos = self.buffer_position(&last_node.piece, last.remainder);
            let (left, right) = self.shrink_piece(&first_node.piece, start_split_pos, end_split_pos);

            self.root = self.root.remove(first.start_offset);
            // Insert right first so left lands before it.
            if right.length > 0 {
                self.root = self.root.insert(NodeData::new(right), first.start_offset);
            }
            if left.length > 0 {
                self.root = self.root.insert(NodeData::new(left), first.start_offset);
            }
            return;
        }

        // The range crosses nodes: remove every covered node, then reinsert
        // the trimmed first/last remainders.
        let new_first = self.trim_piece_right(&first_node.piece, start_split_pos);
        match last.node {
            None => self.remove_node_range(first, count),
            Some(last_node) => {
                let end_split_pos = self.buffer_position(&last_node.piece, last.remainder);
                let new_last = self.trim_piece_left(&last_node.piece, end_split_pos);
                self.remove_node_range(first, count);
                // A remainder of zero means the range ended exactly at the
                // last node's start and the node was never touched.
                if last.remainder != 0 && new_last.length != 0 {
                    self.root = self
                        .root
                        .insert(NodeData::new(new_last), first.start_offset);
                }
            }
        }

        if new_first.length != 0 {
            self.root = self
                .root
                .insert(NodeData::new(new_first), first.start_offset);
        }
    }

    /// Appends `text` to the add buffer, extends its line-start index, and
    /// returns a piece spanning the appended bytes. The piece's `first` is
    /// the previous `last_insert` cursor, which is what the coalescing check
    /// in `internal_insert` relies on.
    fn build_piece(&mut self, text: &str) -> Piece {
        let start_offset = self.buffers.add_buffer.buffer.len();
        let start = self.last_insert;

        // The scan always reports a line start at 0, which the add buffer
        // already has; shift and append the rest.
        let scratch_starts = populate_line_starts(text);
        self.buffers
            .add_buffer
            .line_starts
            .extend(scratch_starts.into_iter().skip(1).map(|s| s + start_offset));
        self.buffers.add_buffer.buffer.push_str(text);

        let end_offset = self.buffers.add_buffer.buffer.len();
        let end_index = self.buffers.add_buffer.line_starts.len() - 1;
        let end_pos = BufferCursor {
            line: end_index,
            column: end_offset - self.buffers.add_buffer.line_starts[end_index],
        };
        let piece = Piece {
            buffer_type: BufferType::Add,
            first: start,
            last: end_pos,
            length: end_offset - start_offset,
            newline_count: newlines_between(start, end_pos),
        };
        self.last_insert = end_pos;
        piece
    }

    /// Replaces `existing` with a single piece covering both it and
    /// `new_piece`, which must have just been built at its end.
    fn combine_pieces(&mut self, existing: NodePosition, mut new_piece: Piece) {
        let Some(node) = existing.node else {
            return;
        };
        let old_piece = node.piece;
        debug_assert!(old_piece.buffer_type == BufferType::Add);
        debug_assert!(old_piece.last == new_piece.first);

        new_piece.first = old_piece.first;
        new_piece.newline_count += old_piece.newline_count;
        new_piece.length += old_piece.length;
        self.root = self
            .root
            .remove(existing.start_offset)
            .insert(NodeData::new(new_piece), existing.start_offset);
    }

    /// Removes nodes starting at `first` until `length` bytes of the
    /// original range are gone. `length` is first extended to cover the
    /// whole first piece, because the caller deletes whole nodes and
    /// reinserts trimmed remainders afterwards.
    fn remove_node_range(&mut self, first: NodePosition, length: usize) {
        let Some(node) = first.node else {
            return;
        };
        let total_length = node.piece.length;
        let length = length - (total_length - first.remainder) + total_length;

        let delete_at_offset = first.start_offset;
        let mut position = first;
        let mut deleted_len = 0;
        while deleted_len < length {
            let Some(node) = position.node else {
                break;
            };
            deleted_len += node.piece.length;
            self.root = self.root.remove(delete_at_offset);
            position = self.node_at(delete_at_offset);
        }
    }

    /// Descends the tree accumulating left-subtree aggregates to locate the
    /// node owning `off`. Offsets at or past the end land on the final node
    /// with the remainder clamped to its piece length.
    pub(crate) fn node_at(&self, mut off: usize) -> NodePosition {
        let mut node_start_offset = 0;
        let mut newline_count = 0;

        let mut node = self.root.clone();
        while !node.is_empty() {
            let data = *node.data();
            if off < data.left_subtree_length {
                node = node.left();
            } else if off < data.left_subtree_length + data.piece.length {
                node_start_offset += data.left_subtree_length;
                newline_count += data.left_subtree_lf_count;
                let remainder = off - data.left_subtree_length;
                // buffer_position reports a line relative to the backing
                // buffer; retract the piece's starting line to get the
                // in-piece line delta.
                let pos = self.buffer_position(&data.piece, remainder);
                newline_count += pos.line - data.piece.first.line;
                return NodePosition {
                    node: Some(data),
                    remainder,
                    start_offset: node_start_offset,
                    line: newline_count,
                };
            } else {
                let right = node.right();
                if right.is_empty() {
                    node_start_offset += data.left_subtree_length;
                    newline_count += data.left_subtree_lf_count + data.piece.newline_count;
                    return NodePosition {
                        node: Some(data),
                        remainder: data.piece.length,
                        start_offset: node_start_offset,
                        line: newline_count,
                    };
                }
                let offset_amount = data.left_subtree_length + data.piece.length;
                off -= offset_amount;
                node_start_offset += offset_amount;
                newline_count += data.left_subtree_lf_count + data.piece.newline_count;
                node = right;
            }
        }
        NodePosition::default()
    }

    /// Converts a remainder within `piece` to a cursor in its backing
    /// buffer, binary-searching the buffer's line-start index.
    fn buffer_position(&self, piece: &Piece, remainder: usize) -> BufferCursor {
        let starts = &self.buffers.buffer_at(piece.buffer_type).line_starts;
        let offset = starts[piece.first.line] + piece.first.column + remainder;

        let mut low = piece.first.line;
        let mut high = piece.last.line;
        let mut mid = 0;
        let mut mid_start = 0;

        while low <= high {
            mid = low + (high - low) / 2;
            mid_start = starts[mid];
            if mid == high {
                break;
            }
            let mid_stop = starts[mid + 1];
            if offset < mid_start {
                high = mid - 1;
            } else if offset >= mid_stop {
                low = mid + 1;
            } else {
                break;
            }
        }

        BufferCursor {
            line: mid,
            column: offset - mid_start,
        }
    }

    /// Shortens `piece` so it ends at `pos`.
    fn trim_piece_right(&self, piece: &Piece, pos: BufferCursor) -> Piece {
        let orig_end_offset = self.buffers.buffer_offset(piece.buffer_type, piece.last);
        let new_end_offset = self.buffers.buffer_offset(piece.buffer_type, pos);
        let len_delta = orig_end_offset - new_end_offset;

        Piece {
            last: pos,
            newline_count: newlines_between(piece.first, pos),
            length: piece.length - len_delta,
            ..*piece
        }
    }

    /// Shortens `piece` so it starts at `pos`.
    fn trim_piece_left(&self, piece: &Piece, pos: BufferCursor) -> Piece {
        let orig_start_offset = self.buffers.buffer_offset(piece.buffer_type, piece.first);
        let new_start_offset = self.buffers.buffer_offset(piece.buffer_type, pos);
        let len_delta = new_start_offset - orig_start_offset;

        Piece {
            first: pos,
            newline_count: newlines_between(pos, piece.last),
            length: piece.length - len_delta,
            ..*piece
        }
    }

    /// Cuts `[first, last)` out of the middle of `piece`, returning the
    /// remainders on either side.
    fn shrink_piece(&self, piece: &Piece, first: BufferCursor, last: BufferCursor) -> (Piece, Piece) {
        (
            self.trim_piece_right(piece, first),
            self.trim_piece_left(piece, last),
        )
    }

    fn line_offset(&self, line: usize) -> usize {
        let mut offset = 0;
        line_start(&mut offset, &self.buffers, &self.root, line, accumulate_value);
        offset
    }
}

impl Default for PieceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PieceTree {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl fmt::Display for PieceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl fmt::Debug for PieceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PieceTree")
            .field("length", &self.total_content_length)
            .field("lf_count", &self.lf_count)
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .finish()
    }
}

type Accumulator = fn(&BufferCollection, &Piece, usize) -> usize;

/// Length of `piece` from its first line up to in-piece line `index`,
/// including the newline that ends the indexed line.
fn accumulate_value(buffers: &BufferCollection, piece: &Piece, index: usize) -> usize {
    let buffer = buffers.buffer_at(piece.buffer_type);
    let starts = buffer.line_starts();
    let expected_start = piece.first.line + index + 1;
    let first = starts[piece.first.line] + piece.first.column;
    if expected_start > piece.last.line {
        let last = starts[piece.last.line] + piece.last.column;
        return last - first;
    }
    starts[expected_start] - first
}

/// Like [`accumulate_value`], but a trailing newline is not counted.
fn accumulate_value_no_lf(buffers: &BufferCollection, piece: &Piece, index: usize) -> usize {
    let buffer = buffers.buffer_at(piece.buffer_type);
    let starts = buffer.line_starts();
    let expected_start = piece.first.line + index + 1;
    let first = starts[piece.first.line] + piece.first.column;
    let last = if expected_start > piece.last.line {
        starts[piece.last.line] + piece.last.column
    } else {
        starts[expected_start]
    };
    if last == first {
        return 0;
    }
    if buffer.text().as_bytes()[last - 1] == b'\n' {
        return last - 1 - first;
    }
    last - first
}

/// Adds to `offset` the byte offset at which document `line` starts,
/// descending the tree on the cached newline aggregates.
fn line_start(
    offset: &mut usize,
    buffers: &BufferCollection,
    node: &RedBlackTree,
    line: usize,
    accumulate: Accumulator,
) {
    if node.is_empty() {
        return;
    }
    let data = node.data();
    if line <= data.left_subtree_lf_count {
        line_start(offset, buffers, &node.left(), line, accumulate);
    } else if line <= data.left_subtree_lf_count + data.piece.newline_count {
        // The line starts inside this node's piece.
        let line = line - data.left_subtree_lf_count;
        let mut len = data.left_subtree_length;
        if line != 0 {
            len += accumulate(buffers, &data.piece, line - 1);
        }
        *offset += len;
    } else {
        let line = line - data.left_subtree_lf_count - data.piece.newline_count;
        *offset += data.left_subtree_length + data.piece.length;
        line_start(offset, buffers, &node.right(), line, accumulate);
    }
}
