#![warn(missing_docs)]
//! A persistent piece-table text buffer.
//!
//! # Overview
//!
//! `piece-tree` is the document model of a text editor, reduced to a
//! headless library: an augmented, immutable red-black tree over "pieces"
//! that reference two backing buffers. It has no opinion about rendering,
//! windowing, or input handling; the upper layers of an editor drive it
//! through byte offsets and line numbers.
//!
//! # Core Features
//!
//! - **O(log n) editing**: insert and erase at arbitrary byte offsets
//! - **O(log n) line access**: line ↔ offset conversion via cached subtree
//!   newline counts
//! - **O(1) undo/redo**: every edit produces a new tree root that shares all
//!   untouched subtrees with the old one, so history is a stack of roots
//! - **Lazy UTF-8 iteration**: forward and reverse byte/codepoint cursors
//!   over an immutable snapshot
//! - **Streaming search**: the document is fed to a multi-pattern matcher
//!   without ever being copied into a contiguous string
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  PieceTree (document facade)                │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  TreeWalker / ReverseTreeWalker             │  ← Lazy Iteration
//! ├─────────────────────────────────────────────┤
//! │  RedBlackTree (persistent, augmented)       │  ← Ordering & Balance
//! ├─────────────────────────────────────────────┤
//! │  BufferCollection (original + add buffers)  │  ← Byte Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use piece_tree::PieceTree;
//!
//! let mut tree = PieceTree::from_text("fn main() {}\n");
//!
//! tree.insert(11, " println!(\"hi\"); ");
//! assert_eq!(tree.text(), "fn main() { println!(\"hi\"); }\n");
//!
//! tree.undo();
//! assert_eq!(tree.text(), "fn main() {}\n");
//!
//! assert_eq!(tree.line_count(), 2);
//! assert_eq!(tree.find("main"), Some(3));
//! ```
//!
//! # Module Description
//!
//! - [`piece_tree`] - the [`PieceTree`] document facade
//! - [`tree`] - the persistent augmented red-black tree
//! - [`walker`] - lazy forward/reverse cursors over a snapshot
//! - [`storage`] - the original/add backing buffer pair
//! - [`utf8`] - byte-at-a-time forward/reverse UTF-8 decoders
//!
//! # Offsets and Encoding
//!
//! All public offsets are byte offsets and all lines are zero-based. The
//! buffer stores UTF-8 and expects callers to keep edits on codepoint
//! boundaries; it clamps out-of-range offsets instead of rejecting them.
//!
//! # Concurrency
//!
//! The whole crate is single-threaded by design: tree nodes are shared with
//! `Rc`, and a document belongs to one owning thread. The persistence of the
//! tree is what lets a walker keep reading an old snapshot while a new root
//! is being built; it is not a cross-thread synchronization mechanism.

pub mod piece_tree;
mod search;
pub mod storage;
pub mod tree;
pub mod utf8;
pub mod walker;

pub use piece_tree::{LineRange, PieceTree};
pub use storage::{BufferCollection, BufferCursor, BufferType, CharBuffer};
pub use tree::{Color, NodeData, Piece, RedBlackTree};
pub use utf8::{ReverseUtf8Decoder, Utf8Decoder};
pub use walker::{ReverseTreeWalker, TreeWalker};
