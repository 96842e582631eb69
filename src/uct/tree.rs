//! UCT tree (C9): root + per-worker arenas, child expansion, RAVE
//! update, subtree extraction and iteration.
//!
//! Grounded on `SgUctTree`/`SgUctChildIterator`/`SgUctTreeIterator`
//! (`SgUctTree.h`). The concurrency protocol in [`Tree::create_children`]
//! is the distilled spec's §5.2 "lock-free tree" mutation discipline:
//!
//! A node is published by writing `first_child` (a single atomic word —
//! never torn) and then attempting a compare-and-swap of `nu_children`
//! from `0` to the new count. Two workers racing to expand the same node
//! both fully initialize their own children (in their own arena) before
//! touching the parent at all, so whichever `first_child` value is
//! observed afterwards — the racing writes are not ordered against each
//! other — always points at a fully-initialized, same-length children
//! array (every legitimate expander of one position computes the same
//! legal-move set, so `n` agrees across racers). The CAS's winner/loser
//! result only matters for the caller's own accounting (e.g. whether to
//! count the allocation as wasted); it never determines which arena's
//! children end up reachable. This matches distilled spec §5.2's
//! "losers detect this after allocation and discard their own
//! allocation... orphaned but cost is bounded."

use crate::point::Point;

use super::arena::Arena;
use super::node::Node;

/// A handle to a node: either the tree's single root, or a `(arena,
/// slot)` pair inside one of the tree's arenas. Cheap to copy, stable
/// for the arena's lifetime.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeHandle {
    Root,
    Child { arena: u32, slot: u32 },
}

/// Tree owns the root node and `K` arenas (one per worker), per
/// distilled spec §3 "Tree".
pub struct Tree {
    root: Node,
    arenas: Vec<Arena>,
}

impl Tree {
    pub fn new(num_workers: usize, max_nodes_per_arena: usize) -> Self {
        Tree {
            root: Node::new_blank(),
            arenas: (0..num_workers).map(|_| Arena::new(max_nodes_per_arena)).collect(),
        }
    }

    pub fn num_arenas(&self) -> usize {
        self.arenas.len()
    }

    pub fn max_nodes_per_arena(&self) -> usize {
        self.arenas.first().map(Arena::capacity).unwrap_or(0)
    }

    /// Approximate total capacity, matching distilled spec §3:
    /// `maxNodesTotal ~= K * maxNodesPerArena + 1`.
    pub fn max_nodes_total(&self) -> usize {
        self.arenas.iter().map(Arena::capacity).sum::<usize>() + 1
    }

    pub fn root_handle(&self) -> NodeHandle {
        NodeHandle::Root
    }

    pub fn node(&self, handle: NodeHandle) -> &Node {
        match handle {
            NodeHandle::Root => &self.root,
            NodeHandle::Child { arena, slot } => self.arenas[arena as usize].node(slot),
        }
    }

    /// `CreateChildren`: reserves `moves.len()` consecutive slots from
    /// `worker_id`'s arena, initializes each child's move/prior, and
    /// publishes the range to `parent`. Returns `false` without touching
    /// `parent` if the arena has no room (distilled spec §7 class 2:
    /// "cannot expand", never fatal — the caller falls back to an
    /// unexpanded-leaf policy).
    ///
    /// `moves` carries `(move, prior_value, prior_count)` triples so
    /// prior knowledge (C5) can be baked in during construction rather
    /// than via a second pass over the published children.
    pub fn create_children(
        &self,
        worker_id: usize,
        parent: NodeHandle,
        moves: &[(Point, f32, usize)],
    ) -> bool {
        if moves.is_empty() {
            return false;
        }
        let arena = &self.arenas[worker_id];
        let start = match arena.reserve(moves.len()) {
            Some(s) => s,
            None => {
                tracing::debug!(worker_id, requested = moves.len(), "arena capacity exhausted, leaving node unexpanded");
                return false;
            }
        };
        for (i, &(mv, value, count)) in moves.iter().enumerate() {
            let child = arena.node(start + i as u32);
            child.reset();
            child.set_move(mv);
            if count > 0 {
                child.value().initialize(value, count);
            }
        }
        let parent_node = self.node(parent);
        parent_node.set_first_child_raw(worker_id as u32, start);
        parent_node.inc_pos_count_by(moves.iter().map(|&(_, _, c)| c).sum());
        let published = parent_node.publish_children(moves.len() as u32);
        if !published {
            tracing::debug!(worker_id, "lost the expansion race, discarding own allocation");
        }
        published
    }

    pub fn children(&self, parent: NodeHandle) -> ChildIterator<'_> {
        let node = self.node(parent);
        let nu = node.nu_children();
        if nu == 0 {
            ChildIterator {
                tree: self,
                arena: 0,
                next_slot: 0,
                remaining: 0,
            }
        } else {
            let (arena, slot) = node.first_child_raw().expect("nu_children > 0 implies first_child set");
            ChildIterator {
                tree: self,
                arena,
                next_slot: slot,
                remaining: nu,
            }
        }
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator {
            stack: vec![self.children(self.root_handle())],
        }
    }

    /// `AddGameResult`: bumps `father`'s `posCount` (if any) and adds
    /// `eval` to `node`'s value statistic.
    pub fn add_game_result(&self, node: NodeHandle, father: Option<NodeHandle>, eval: f32) {
        if let Some(f) = father {
            self.node(f).inc_pos_count();
        }
        self.node(node).value().add(eval);
    }

    pub fn add_rave_value(&self, node: NodeHandle, eval: f32) {
        self.node(node).rave().add(eval);
    }

    /// `InitializeValue`: seeds `child`'s value statistic and folds
    /// `count` into `parent`'s `posCount` (distilled spec §4.5).
    pub fn initialize_value(&self, parent: NodeHandle, child: NodeHandle, value: f32, count: usize) {
        self.node(child).value().initialize(value, count);
        self.node(parent).inc_pos_count_by(count);
    }

    pub fn initialize_rave_value(&self, child: NodeHandle, value: f32, count: usize) {
        self.node(child).rave().initialize(value, count);
    }

    pub fn set_signature(&self, node: NodeHandle, sig: usize) {
        self.node(node).set_signature(sig);
    }

    /// `ApplyFilter`: rewrites `node`'s child range to exclude any child
    /// whose move is in `moves_to_remove`. Requires room in
    /// `worker_id`'s arena for the worst case (all children kept);
    /// returns `false` (leaving the node's children untouched) if that
    /// capacity isn't available, matching `createChildren`'s capacity
    /// contract.
    pub fn apply_filter(&self, worker_id: usize, node: NodeHandle, moves_to_remove: &[Point]) -> bool {
        let kept: Vec<NodeHandle> = self
            .children(node)
            .filter(|h| !moves_to_remove.contains(&self.node(*h).mv()))
            .collect();
        if kept.is_empty() {
            // Nothing survives: the node reverts to childless. No arena
            // slots need reserving; `first_child` is left as-is since
            // `nu_children == 0` means it is never dereferenced.
            self.node(node).republish_children(0);
            return true;
        }
        let arena = &self.arenas[worker_id];
        let start = match arena.reserve(kept.len()) {
            Some(s) => s,
            None => return false,
        };
        for (i, &src) in kept.iter().enumerate() {
            let dst = arena.node(start + i as u32);
            dst.reset();
            dst.set_move(self.node(src).mv());
            dst.copy_stats_from(self.node(src));
        }
        let n = self.node(node);
        n.set_first_child_raw(worker_id as u32, start);
        n.republish_children(kept.len() as u32);
        true
    }

    /// `ExtractSubtree`: copies `start` (statistics only) into `target`'s
    /// root, then depth-first copies descendants, round-robining child
    /// batches across `target`'s arenas. `target` is cleared first and
    /// must have at least as many arenas as `self`, each with capacity
    /// `>=` the corresponding source arena (the distilled spec requires
    /// "the same number of arenas and equal or greater total capacity").
    /// A branch that doesn't fit in its target arena is truncated rather
    /// than failing the whole extraction (distilled spec §7 class 3).
    pub fn extract_subtree(&self, target: &mut Tree, start: NodeHandle) {
        target.clear();
        target.root.copy_stats_from(self.node(start));
        let mut next_arena = 0usize;
        self.copy_children(target, self.node(start), NodeHandle::Root, &mut next_arena);
    }

    fn copy_children(
        &self,
        target: &Tree,
        src_parent: &Node,
        dst_parent: NodeHandle,
        next_arena: &mut usize,
    ) {
        let nu = src_parent.nu_children();
        if nu == 0 {
            return;
        }
        let (src_arena, src_slot) = src_parent.first_child_raw().unwrap();
        let worker_id = *next_arena % target.num_arenas().max(1);
        *next_arena += 1;
        let arena = &target.arenas[worker_id];
        let start = match arena.reserve(nu as usize) {
            Some(s) => s,
            None => return, // truncate: branch dropped, rest of extraction continues elsewhere
        };
        for i in 0..nu {
            let src_child = self.arenas[src_arena as usize].node(src_slot + i);
            let dst_child = arena.node(start + i);
            dst_child.reset();
            dst_child.set_move(src_child.mv());
            dst_child.copy_stats_from(src_child);
        }
        let dst_parent_node = target.node(dst_parent);
        dst_parent_node.set_first_child_raw(worker_id as u32, start);
        dst_parent_node.publish_children(nu);

        for i in 0..nu {
            let src_child = self.arenas[src_arena as usize].node(src_slot + i);
            let dst_handle = NodeHandle::Child {
                arena: worker_id as u32,
                slot: start + i,
            };
            self.copy_children(target, src_child, dst_handle, next_arena);
        }
    }

    pub fn clear(&mut self) {
        self.root = Node::new_blank();
        for arena in &mut self.arenas {
            arena.clear();
        }
    }

    /// Reduces (or grows) per-arena capacity; implicitly clears the tree
    /// (distilled spec §3: "`maxNodes` may be reduced, which implicitly
    /// clears the tree").
    pub fn set_max_nodes_per_arena(&mut self, max_nodes_per_arena: usize) {
        let num_workers = self.arenas.len();
        self.arenas = (0..num_workers).map(|_| Arena::new(max_nodes_per_arena)).collect();
        self.root = Node::new_blank();
    }

    /// Exchanges buffers with `other`, which must own the same number of
    /// arenas each with capacity `>=` this tree's corresponding arena
    /// (`SgUctTree::Swap`; used to make a freshly `extract_subtree`-ed
    /// tree the new live root without copying again).
    pub fn swap(&mut self, other: &mut Tree) {
        std::mem::swap(&mut self.root, &mut other.root);
        for (a, b) in self.arenas.iter_mut().zip(other.arenas.iter_mut()) {
            a.swap(b);
        }
    }
}

/// `SgUctChildIterator`: children `[firstChild, firstChild+nuChildren)`
/// of one node, all within a single arena.
pub struct ChildIterator<'a> {
    tree: &'a Tree,
    arena: u32,
    next_slot: u32,
    remaining: u32,
}

impl<'a> Iterator for ChildIterator<'a> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        if self.remaining == 0 {
            return None;
        }
        let handle = NodeHandle::Child {
            arena: self.arena,
            slot: self.next_slot,
        };
        self.next_slot += 1;
        self.remaining -= 1;
        Some(handle)
    }
}

impl<'a> ChildIterator<'a> {
    pub fn tree(&self) -> &'a Tree {
        self.tree
    }
}

/// `SgUctTreeIterator`: depth-first traversal via a stack of
/// [`ChildIterator`]s, rooted at the tree's root.
pub struct TreeIterator<'a> {
    stack: Vec<ChildIterator<'a>>,
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(handle) => {
                    let tree = top.tree();
                    self.stack.push(tree.children(handle));
                    return Some(handle);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_children_publishes_reachable_range() {
        let tree = Tree::new(1, 16);
        let ok = tree.create_children(0, tree.root_handle(), &[(10, 0.5, 0), (20, 0.6, 3)]);
        assert!(ok);
        let kids: Vec<_> = tree.children(tree.root_handle()).collect();
        assert_eq!(kids.len(), 2);
        assert_eq!(tree.node(kids[0]).mv(), 10);
        assert_eq!(tree.node(kids[1]).mv(), 20);
        assert_eq!(tree.node(kids[1]).move_count(), 3);
        assert_eq!(tree.node(tree.root_handle()).pos_count(), 3);
    }

    #[test]
    fn capacity_exhaustion_returns_false_without_publishing() {
        let tree = Tree::new(1, 1);
        let ok = tree.create_children(0, tree.root_handle(), &[(1, 0.5, 0), (2, 0.5, 0)]);
        assert!(!ok);
        assert!(!tree.node(tree.root_handle()).has_children());
    }

    #[test]
    fn two_workers_racing_to_expand_leave_one_fully_initialized_range_reachable() {
        let tree = Tree::new(2, 16);
        let moves = [(1usize, 0.5f32, 0usize), (2, 0.5, 0)];
        let a = tree.create_children(0, tree.root_handle(), &moves);
        let b = tree.create_children(1, tree.root_handle(), &moves);
        assert!(a || b);
        assert!(!(a && b), "only one CAS can win 0 -> n");
        let kids: Vec<_> = tree.children(tree.root_handle()).collect();
        assert_eq!(kids.len(), 2);
        let mut mvs: Vec<_> = kids.iter().map(|&h| tree.node(h).mv()).collect();
        mvs.sort();
        assert_eq!(mvs, vec![1, 2]);
    }

    #[test]
    fn tree_iterator_visits_every_published_node() {
        let tree = Tree::new(1, 16);
        tree.create_children(0, tree.root_handle(), &[(1, 0.5, 0), (2, 0.5, 0)]);
        let first_child = tree.children(tree.root_handle()).next().unwrap();
        tree.create_children(0, first_child, &[(3, 0.5, 0)]);
        let visited: Vec<_> = tree.iter().collect();
        assert_eq!(visited.len(), 3);
    }

    #[test]
    fn extract_subtree_preserves_descendant_statistics() {
        let mut src = Tree::new(2, 16);
        src.create_children(0, src.root_handle(), &[(1, 0.5, 0), (2, 0.5, 0)]);
        let first_child = src.children(src.root_handle()).next().unwrap();
        src.add_game_result(first_child, Some(src.root_handle()), 1.0);
        src.create_children(1, first_child, &[(3, 0.5, 0)]);

        let mut dst = Tree::new(2, 16);
        src.extract_subtree(&mut dst, first_child);
        assert_eq!(dst.node(dst.root_handle()).move_count(), 1);
        let grandkids: Vec<_> = dst.children(dst.root_handle()).collect();
        assert_eq!(grandkids.len(), 1);
        assert_eq!(dst.node(grandkids[0]).mv(), 3);
    }

    #[test]
    fn apply_filter_removes_named_moves_and_keeps_others() {
        let tree = Tree::new(1, 16);
        tree.create_children(0, tree.root_handle(), &[(1, 0.5, 0), (2, 0.5, 0), (3, 0.5, 0)]);
        let ok = tree.apply_filter(0, tree.root_handle(), &[2]);
        assert!(ok);
        let mut mvs: Vec<_> = tree.children(tree.root_handle()).map(|h| tree.node(h).mv()).collect();
        mvs.sort();
        assert_eq!(mvs, vec![1, 3]);
    }
}
