/// An ordered rooted tree stored as an index arena.
///
/// Node `0` is always the root. Children keep insertion order, which is the left-to-right
/// order used by the layout.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    depths: Vec<usize>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    /// Creates a hierarchy containing only the root node.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut parents = Vec::with_capacity(capacity.max(1));
        let mut children = Vec::with_capacity(capacity.max(1));
        let mut depths = Vec::with_capacity(capacity.max(1));
        parents.push(None);
        children.push(Vec::new());
        depths.push(0);
        Self {
            parents,
            children,
            depths,
        }
    }

    /// Appends a new last child under `parent` and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not a node of this hierarchy.
    pub fn add_child(&mut self, parent: usize) -> usize {
        let idx = self.parents.len();
        let depth = self.depths[parent] + 1;
        self.children[parent].push(idx);
        self.parents.push(Some(parent));
        self.children.push(Vec::new());
        self.depths.push(depth);
        idx
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Always false: a hierarchy owns at least its root.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parents.get(node).copied().flatten()
    }

    pub fn children(&self, node: usize) -> &[usize] {
        self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn depth(&self, node: usize) -> usize {
        self.depths.get(node).copied().unwrap_or(0)
    }

    pub fn max_depth(&self) -> usize {
        self.depths.iter().copied().max().unwrap_or(0)
    }

    /// Parent-before-children order (d3 `eachBefore`).
    pub fn preorder(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![self.root()];
        while let Some(v) = stack.pop() {
            out.push(v);
            stack.extend(self.children(v).iter().rev().copied());
        }
        out
    }

    /// Children-before-parent order with siblings left to right (d3 `eachAfter`).
    pub fn postorder(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<(usize, usize)> = vec![(self.root(), 0)];
        while let Some((v, cursor)) = stack.pop() {
            match self.children(v).get(cursor) {
                Some(&child) => {
                    stack.push((v, cursor + 1));
                    stack.push((child, 0));
                }
                None => out.push(v),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Hierarchy {
        // 0 ─┬─ 1 ─── 3
        //    └─ 2
        let mut h = Hierarchy::new();
        let a = h.add_child(0);
        let _b = h.add_child(0);
        h.add_child(a);
        h
    }

    #[test]
    fn depth_and_parent_are_tracked() {
        let h = sample();
        assert_eq!(h.len(), 4);
        assert_eq!(h.parent(3), Some(1));
        assert_eq!(h.parent(0), None);
        assert_eq!(h.depth(3), 2);
        assert_eq!(h.max_depth(), 2);
    }

    #[test]
    fn traversal_orders_match_d3() {
        let h = sample();
        assert_eq!(h.preorder(), vec![0, 1, 3, 2]);
        assert_eq!(h.postorder(), vec![3, 1, 2, 0]);
    }

    #[test]
    fn out_of_range_queries_are_empty() {
        let h = Hierarchy::new();
        assert!(h.children(42).is_empty());
        assert_eq!(h.parent(42), None);
        assert!(!h.is_empty());
    }
}
