use piece_tree::{BufferCursor, BufferType, NodeData, Piece, PieceTree, RedBlackTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_text(rng: &mut StdRng) -> String {
    let len = rng.gen_range(1..8);
    (0..len)
        .map(|_| {
            if rng.gen_range(0..5) == 0 {
                '\n'
            } else {
                char::from(rng.gen_range(b'a'..=b'z'))
            }
        })
        .collect()
}

#[test]
fn test_random_inserts_match_string_model() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0001);
    let mut tree = PieceTree::new();
    let mut model = String::new();

    for _ in 0..400 {
        let offset = rng.gen_range(0..=model.len());
        let text = random_text(&mut rng);
        tree.insert(offset, &text);
        model.insert_str(offset, &text);

        assert_eq!(tree.length(), model.len());
        assert_eq!(tree.text(), model);
        assert_eq!(
            tree.line_feed_count(),
            model.matches('\n').count(),
            "newline count diverged from model"
        );
    }
}

#[test]
fn test_random_erases_match_string_model() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0002);
    let mut tree = PieceTree::new();
    let mut model = String::new();

    // Build a fragmented document first.
    for _ in 0..120 {
        let offset = rng.gen_range(0..=model.len());
        let text = random_text(&mut rng);
        tree.insert(offset, &text);
        model.insert_str(offset, &text);
    }

    while !model.is_empty() {
        let offset = rng.gen_range(0..model.len());
        let count = rng.gen_range(1..=(model.len() - offset).min(16));
        tree.erase(offset, count);
        model.replace_range(offset..offset + count, "");

        assert_eq!(tree.length(), model.len());
        assert_eq!(tree.text(), model);
        assert_eq!(tree.line_feed_count(), model.matches('\n').count());
    }
    assert!(tree.is_empty());
}

#[test]
fn test_random_combined_operations_with_history() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0003);
    let mut tree = PieceTree::new();
    let mut model = String::new();
    let mut model_undo: Vec<String> = Vec::new();
    let mut model_redo: Vec<String> = Vec::new();

    for _ in 0..500 {
        match rng.gen_range(0..10) {
            0..=4 => {
                let offset = rng.gen_range(0..=model.len());
                let text = random_text(&mut rng);
                tree.insert(offset, &text);
                model_undo.push(model.clone());
                model_redo.clear();
                model.insert_str(offset, &text);
            }
            5..=7 => {
                if model.is_empty() {
                    continue;
                }
                let offset = rng.gen_range(0..model.len());
                let count = rng.gen_range(1..=(model.len() - offset).min(12));
                tree.erase(offset, count);
                model_undo.push(model.clone());
                model_redo.clear();
                model.replace_range(offset..offset + count, "");
            }
            8 => {
                let undone = tree.undo();
                assert_eq!(undone, !model_undo.is_empty());
                if let Some(prev) = model_undo.pop() {
                    model_redo.push(model.clone());
                    model = prev;
                }
            }
            _ => {
                let redone = tree.redo();
                assert_eq!(redone, !model_redo.is_empty());
                if let Some(next) = model_redo.pop() {
                    model_undo.push(model.clone());
                    model = next;
                }
            }
        }

        assert_eq!(tree.length(), model.len());
        assert_eq!(tree.text(), model);
        assert_eq!(tree.line_feed_count(), model.matches('\n').count());
    }
}

fn tree_piece(length: usize, newline_count: usize) -> NodeData {
    NodeData::new(Piece {
        buffer_type: BufferType::Add,
        first: BufferCursor::default(),
        last: BufferCursor::default(),
        length,
        newline_count,
    })
}

#[test]
fn test_random_tree_inserts_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0004);
    let mut tree = RedBlackTree::default();
    // Model: pieces in document order as (length, newline_count).
    let mut pieces: Vec<(usize, usize)> = Vec::new();

    for _ in 0..500 {
        let length = rng.gen_range(1..32);
        let newlines = rng.gen_range(0..3);
        let total: usize = pieces.iter().map(|p| p.0).sum();
        let at = rng.gen_range(0..=total);

        // The tree places a new node in front of the first piece whose end
        // offset exceeds the insertion point.
        let mut cursor = 0;
        let mut index = pieces.len();
        for (i, piece) in pieces.iter().enumerate() {
            if at < cursor + piece.0 {
                index = i;
                break;
            }
            cursor += piece.0;
        }
        pieces.insert(index, (length, newlines));
        tree = tree.insert(tree_piece(length, newlines), at);

        assert!(tree.check_invariants());
        assert_eq!(tree.length(), pieces.iter().map(|p| p.0).sum::<usize>());
        assert_eq!(tree.lf_count(), pieces.iter().map(|p| p.1).sum::<usize>());
    }
}

#[test]
fn test_random_tree_removals_keep_invariants() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0005);
    let mut tree = RedBlackTree::default();
    let mut pieces: Vec<(usize, usize)> = Vec::new();

    for i in 0..300 {
        let length = rng.gen_range(1..16);
        let newlines = rng.gen_range(0..2);
        let at: usize = pieces.iter().map(|p| p.0).sum();
        pieces.push((length, newlines));
        tree = tree.insert(tree_piece(length, newlines), at);
        assert!(tree.check_invariants(), "corrupt after insert {i}");
    }

    while !pieces.is_empty() {
        let index = rng.gen_range(0..pieces.len());
        // Removal must land exactly on the node's start offset.
        let at: usize = pieces[..index].iter().map(|p| p.0).sum();
        pieces.remove(index);
        tree = tree.remove(at);

        assert!(tree.check_invariants(), "corrupt after removing node {index}");
        assert_eq!(tree.length(), pieces.iter().map(|p| p.0).sum::<usize>());
        assert_eq!(tree.lf_count(), pieces.iter().map(|p| p.1).sum::<usize>());
    }
    assert!(tree.is_empty());
}

#[test]
fn test_old_roots_survive_later_mutations() {
    let mut rng = StdRng::seed_from_u64(0x5eed_0006);
    let mut tree = RedBlackTree::default();
    let mut snapshots = Vec::new();
    let mut totals = Vec::new();

    for _ in 0..200 {
        let length = rng.gen_range(1..8);
        let at = rng.gen_range(0..=tree.length());
        tree = tree.insert(tree_piece(length, 0), at);
        snapshots.push(tree.clone());
        totals.push(tree.length());
    }

    // Mutate further, then verify every snapshot is still intact.
    for _ in 0..50 {
        tree = tree.remove(0);
    }
    for (snapshot, expected) in snapshots.iter().zip(&totals) {
        assert_eq!(snapshot.length(), *expected);
        assert!(snapshot.check_invariants());
    }
}
