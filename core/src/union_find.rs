//! Disjoint-set forest over dense node positions.
//!
//! Path compression in `find` plus union by rank keeps both operations
//! near-constant amortized.

use crate::graph::NodeIx;

#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<NodeIx>,
    rank: Vec<u32>,
    components: usize,
}

impl UnionFind {
    /// `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            components: n,
        }
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn find(&mut self, x: NodeIx) -> NodeIx {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Point every node on the walked path straight at the root.
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Merge the sets holding `x` and `y`. Returns false if already joined.
    pub fn union(&mut self, x: NodeIx, y: NodeIx) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }

        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }

        self.components -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut uf = UnionFind::new(4);
        assert_eq!(uf.components(), 4);
        for i in 0..4 {
            assert_eq!(uf.find(i), i);
        }
    }

    #[test]
    fn test_union_merges() {
        let mut uf = UnionFind::new(5);
        assert!(uf.union(0, 1));
        assert!(uf.union(2, 3));
        assert!(!uf.union(1, 0));
        assert_eq!(uf.components(), 3);
        assert_eq!(uf.find(0), uf.find(1));
        assert_ne!(uf.find(1), uf.find(2));

        assert!(uf.union(1, 3));
        assert_eq!(uf.find(0), uf.find(2));
        assert_eq!(uf.components(), 2);
    }

    #[test]
    fn test_path_compression() {
        let mut uf = UnionFind::new(6);
        for i in 0..5 {
            uf.union(i, i + 1);
        }
        let root = uf.find(5);
        for i in 0..6 {
            uf.find(i);
            assert_eq!(uf.parent[i], root);
        }
    }

    #[test]
    fn test_union_by_rank_keeps_taller_root() {
        let mut uf = UnionFind::new(4);
        uf.union(0, 1); // rank[0] = 1
        uf.union(2, 0); // rank[2] = 0 < rank[0]: 2 hangs under 0
        assert_eq!(uf.find(2), 0);
        assert_eq!(uf.rank[0], 1);
    }
}
