use constructs_tree::{Error, NodeIdx, Tree};
use proptest::prelude::*;
use proptest::sample::Index;
use proptest::test_runner::TestCaseError;

/// Build a tree where the `n+1`-th node is attached beneath
/// a node picked by `parents[n]` among the nodes built so far.
fn build(parents: &[Index]) -> (Tree<usize>, Vec<NodeIdx>) {
    let mut tree = Tree::with_capacity(parents.len() + 1);
    let root = tree.add_node(None, 0).expect("add root");
    tree.set_root(root).expect("set root");
    let mut idxs = vec![root];
    for (n, choice) in parents.iter().enumerate() {
        let parent = idxs[choice.index(idxs.len())];
        let idx = tree.add_node(parent, n + 1).expect("add child");
        idxs.push(idx);
    }
    (tree, idxs)
}

fn parent_choices() -> impl Strategy<Value = Vec<Index>> {
    prop::collection::vec(any::<Index>(), 0..48)
}

#[derive(Clone, Debug)]
enum Mutation {
    AddNode(Option<Index>),
    AddChild(Index, Index),
    InsertChild(Index, usize, Index),
    RemoveChild(Index, Index),
    SetParent(Index, Option<Index>),
    SetChildren(Index, Vec<Index>),
    SetRoot(Index),
    TakeRoot,
    RmSubtree(Index),
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        4 => any::<Option<Index>>().prop_map(Mutation::AddNode),
        3 => (any::<Index>(), any::<Index>())
            .prop_map(|(p, c)| Mutation::AddChild(p, c)),
        2 => (any::<Index>(), 0..6usize, any::<Index>())
            .prop_map(|(p, pos, c)| Mutation::InsertChild(p, pos, c)),
        2 => (any::<Index>(), any::<Index>())
            .prop_map(|(p, c)| Mutation::RemoveChild(p, c)),
        2 => (any::<Index>(), any::<Option<Index>>())
            .prop_map(|(c, p)| Mutation::SetParent(c, p)),
        1 => (any::<Index>(), prop::collection::vec(any::<Index>(), 0..4))
            .prop_map(|(p, cs)| Mutation::SetChildren(p, cs)),
        1 => any::<Index>().prop_map(Mutation::SetRoot),
        1 => Just(Mutation::TakeRoot),
        1 => any::<Index>().prop_map(Mutation::RmSubtree),
    ]
}

/// The handles of all live nodes of `tree`, attached or not.
fn live(tree: &Tree<usize>) -> Vec<NodeIdx> {
    (0..*tree.physical_size())
        .map(NodeIdx::from)
        .filter(|&idx| tree.contains(idx))
        .collect()
}

/// Apply `mutation` to `tree`, ignoring rejected mutations.
fn apply(tree: &mut Tree<usize>, mutation: &Mutation, step: usize) {
    let idxs = live(tree);
    let pick = |choice: &Index| idxs[choice.index(idxs.len())];
    if idxs.is_empty() {
        if let Mutation::AddNode(_) = mutation {
            let _ = tree.add_node(None, step);
        }
        return;
    }
    let _ = match mutation {
        Mutation::AddNode(parent) => tree.add_node(parent.as_ref().map(pick), step).map(drop),
        Mutation::AddChild(p, c) => tree.add_child(pick(p), pick(c)),
        Mutation::InsertChild(p, pos, c) => tree.insert_child(pick(p), *pos, pick(c)),
        Mutation::RemoveChild(p, c) => tree.remove_child(pick(p), pick(c)).map(drop),
        Mutation::SetParent(c, p) => tree.set_parent(pick(c), p.as_ref().map(pick)),
        Mutation::SetChildren(p, cs) => tree.set_children(pick(p), cs.iter().map(pick)),
        Mutation::SetRoot(r) => tree.set_root(pick(r)).map(drop),
        Mutation::TakeRoot => {
            tree.take_root();
            Ok(())
        }
        Mutation::RmSubtree(x) => tree.rm_subtree(pick(x)),
    };
}

fn check_invariants(tree: &Tree<usize>) -> Result<(), TestCaseError> {
    let idxs = live(tree);
    for &idx in &idxs {
        for cidx in tree.children_of(idx) {
            prop_assert!(tree.contains(cidx));
            prop_assert_eq!(tree.parent_of(cidx), Some(idx));
        }
        if let Some(pidx) = tree.parent_of(idx) {
            prop_assert!(tree.contains(pidx));
            prop_assert_eq!(tree.children_of(pidx).filter(|&cidx| cidx == idx).count(), 1);
        }
        let ancestors: Vec<NodeIdx> = tree.ancestors_of(idx).take(idxs.len()).collect();
        prop_assert!(ancestors.len() < idxs.len(), "ancestor chain of {:?} loops", idx);
        prop_assert!(!ancestors.contains(&idx));
    }
    if let Some(root_idx) = tree.root() {
        prop_assert!(tree.contains(root_idx));
        prop_assert!(tree[root_idx].is_root());
    }
    // Every live node belongs to exactly one parentless subtree:
    // the tree itself, or a detached one.
    let detached: usize = idxs.iter()
        .filter(|&&idx| tree[idx].is_root() && Some(idx) != tree.root())
        .map(|&idx| *tree.size_of(idx))
        .sum();
    prop_assert_eq!(*tree.size() + detached, *tree.logical_size());
    prop_assert_eq!(
        *tree.size() + detached + *tree.garbage_size(),
        *tree.physical_size()
    );
    Ok(())
}

proptest! {
    #[test]
    fn mutations_preserve_links(
        parents in parent_choices(),
        mutations in prop::collection::vec(mutation(), 0..64),
    ) {
        let (mut tree, _) = build(&parents);
        check_invariants(&tree)?;
        for (step, mutation) in mutations.iter().enumerate() {
            apply(&mut tree, mutation, step);
            check_invariants(&tree)?;
        }
    }

    #[test]
    fn size_is_one_plus_sizes_of_children(parents in parent_choices()) {
        let (tree, idxs) = build(&parents);
        for &idx in &idxs {
            let children: usize = tree.children_of(idx)
                .map(|cidx| *tree.size_of(cidx))
                .sum();
            prop_assert_eq!(*tree.size_of(idx), 1 + children);
        }
        prop_assert_eq!(*tree.size(), idxs.len());
        prop_assert_eq!(tree.size(), tree.logical_size());
    }

    #[test]
    fn height_is_zero_iff_leaf(parents in parent_choices()) {
        let (tree, idxs) = build(&parents);
        for &idx in &idxs {
            prop_assert_eq!(tree.height_of(idx) == 0, tree[idx].is_leaf());
            let max_child_height = tree.children_of(idx)
                .map(|cidx| tree.height_of(cidx) + 1)
                .max()
                .unwrap_or(0);
            prop_assert_eq!(tree.height_of(idx), max_child_height);
        }
    }

    #[test]
    fn depth_is_one_more_than_parent_depth(parents in parent_choices()) {
        let (tree, idxs) = build(&parents);
        prop_assert_eq!(tree.depth(), 0);
        for &idx in &idxs {
            match tree.parent_of(idx) {
                Some(pidx) => prop_assert_eq!(tree.depth_of(idx), tree.depth_of(pidx) + 1),
                None => prop_assert_eq!(tree.depth_of(idx), 0),
            }
            prop_assert_eq!(tree.depth_of(idx), tree.ancestors_of(idx).count());
        }
    }

    #[test]
    fn siblings_exclude_self(parents in parent_choices()) {
        let (tree, idxs) = build(&parents);
        for &idx in &idxs {
            let siblings: Vec<NodeIdx> = tree.siblings_of(idx).collect();
            prop_assert!(!siblings.contains(&idx));
            match tree.parent_of(idx) {
                Some(pidx) => {
                    prop_assert_eq!(siblings.len(), tree.children_of(pidx).count() - 1);
                }
                None => prop_assert!(siblings.is_empty()),
            }
        }
    }

    #[test]
    fn leaves_are_leaves_in_preorder(parents in parent_choices()) {
        let (tree, idxs) = build(&parents);
        for &idx in &idxs {
            let leaves: Vec<NodeIdx> = tree.leaves_of(idx).collect();
            prop_assert!(!leaves.is_empty());
            prop_assert!(leaves.iter().all(|&lidx| tree[lidx].is_leaf()));
            let expected: Vec<NodeIdx> = tree.self_or_descendants_of(idx)
                .filter(|&didx| tree[didx].is_leaf())
                .collect();
            prop_assert_eq!(leaves, expected);
        }
    }

    #[test]
    fn descendants_are_flat(parents in parent_choices()) {
        let (tree, idxs) = build(&parents);
        for &idx in &idxs {
            let descendants: Vec<NodeIdx> = tree.descendants_of(idx).collect();
            prop_assert_eq!(descendants.len() + 1, *tree.size_of(idx));
            for &didx in &descendants {
                prop_assert!(tree.ancestors_of(didx).any(|aidx| aidx == idx));
            }
        }
    }

    #[test]
    fn links_are_bidirectional(parents in parent_choices()) {
        let (tree, idxs) = build(&parents);
        for &idx in &idxs {
            for cidx in tree.children_of(idx) {
                prop_assert_eq!(tree.parent_of(cidx), Some(idx));
            }
            if let Some(pidx) = tree.parent_of(idx) {
                prop_assert!(tree.children_of(pidx).any(|cidx| cidx == idx));
            }
        }
    }

    #[test]
    fn add_then_remove_child_restores_children(
        parents in parent_choices(),
        pick in any::<Index>(),
    ) {
        let (mut tree, idxs) = build(&parents);
        let parent = idxs[pick.index(idxs.len())];
        let before: Vec<NodeIdx> = tree.children_of(parent).collect();
        let x = tree.add_node(None, usize::MAX).expect("add detached node");
        tree.add_child(parent, x).expect("attach");
        prop_assert_eq!(tree.children_of(parent).last(), Some(x));
        prop_assert!(tree.remove_child(parent, x).expect("detach"));
        let after: Vec<NodeIdx> = tree.children_of(parent).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(tree.parent_of(x), None);
    }

    #[test]
    fn attaching_an_ancestor_fails_without_changes(
        parents in parent_choices(),
        pick in any::<Index>(),
    ) {
        let (mut tree, idxs) = build(&parents);
        let node = idxs[pick.index(idxs.len())];
        let before = tree.clone();
        for ancestor in before.ancestors_of(node).filter(|&aidx| Some(aidx) != before.root()) {
            prop_assert_eq!(
                tree.add_child(node, ancestor),
                Err(Error::CycleDetected { parent: node, child: ancestor })
            );
        }
        prop_assert_eq!(&tree, &before);
        prop_assert_eq!(tree.to_string(), before.to_string());
    }
}
