//! Transitive clustering of duplicate groups.
//!
//! Duplicate groups that share a member are merged into one cluster, i.e. the
//! clusters are the connected components of the graph linking every pair of
//! rows that co-occur in a group. A disjoint-set forest makes the result
//! independent of the order in which groups are visited.
//!
//! # Example
//!
//! ```
//! use rcx_tk::processors::clustering::find_clusters;
//!
//! let groups = vec![vec![1, 2], vec![5, 6], vec![2, 3]];
//! assert_eq!(find_clusters(&groups), vec![vec![1, 2, 3], vec![5, 6]]);
//! ```

use std::collections::BTreeMap;

/// Disjoint-set forest with path compression and union by size.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    /// Create a new union-find structure where each element is its own parent.
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing `x`, compressing the path behind it.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Union the sets containing `x` and `y`.
    ///
    /// Returns true if a merge actually occurred, false if they were already
    /// in the same set.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }

        let (small, large) = if self.size[root_x] < self.size[root_y] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[small] = large;
        self.size[large] += self.size[small];
        true
    }
}

/// Merge overlapping groups into disjoint clusters.
///
/// # Arguments
///
/// * `groups` - Member groups (e.g. row positions sharing a duplicated value)
///
/// # Returns
///
/// Disjoint clusters covering exactly the union of all group members. Members
/// are sorted ascending and clusters are ordered by their smallest member.
pub fn find_clusters(groups: &[Vec<usize>]) -> Vec<Vec<usize>> {
    // Dense ids in ascending member order.
    let mut ids: BTreeMap<usize, usize> = BTreeMap::new();
    for &member in groups.iter().flatten() {
        let next = ids.len();
        ids.entry(member).or_insert(next);
    }

    let mut uf = UnionFind::new(ids.len());
    for group in groups {
        if let Some((first, rest)) = group.split_first() {
            for member in rest {
                uf.union(ids[first], ids[member]);
            }
        }
    }

    // Members iterate in ascending order, so each cluster is created at its
    // smallest member and filled in sorted order.
    let mut root_to_cluster: BTreeMap<usize, usize> = BTreeMap::new();
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for (&member, &id) in &ids {
        let root = uf.find(id);
        let cluster = *root_to_cluster.entry(root).or_insert_with(|| {
            clusters.push(Vec::new());
            clusters.len() - 1
        });
        clusters[cluster].push(member);
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_find_basic() {
        let mut uf = UnionFind::new(5);

        // Initially each element is its own root
        assert_eq!(uf.find(0), 0);
        assert_eq!(uf.find(4), 4);

        assert!(uf.union(0, 1));
        assert_eq!(uf.find(0), uf.find(1));

        assert!(uf.union(2, 3));
        assert_eq!(uf.find(2), uf.find(3));
        assert_ne!(uf.find(0), uf.find(2));

        assert!(uf.union(1, 2));
        assert_eq!(uf.find(0), uf.find(3));

        // Union of same set returns false
        assert!(!uf.union(0, 3));
    }

    #[test]
    fn test_find_clusters_transitive_merge() {
        let groups = vec![vec![1, 2], vec![2, 3], vec![9, 10]];
        assert_eq!(find_clusters(&groups), vec![vec![1, 2, 3], vec![9, 10]]);
    }

    #[test]
    fn test_find_clusters_late_bridge() {
        // {1,2} and {3,4} are disjoint until the last group links them.
        let groups = vec![vec![1, 2], vec![3, 4], vec![2, 3]];
        assert_eq!(find_clusters(&groups), vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn test_find_clusters_order_independent() {
        let forward = vec![vec![5, 7], vec![1, 5], vec![8, 9], vec![7, 2]];
        let mut backward = forward.clone();
        backward.reverse();
        let expected = vec![vec![1, 2, 5, 7], vec![8, 9]];
        assert_eq!(find_clusters(&forward), expected);
        assert_eq!(find_clusters(&backward), expected);
    }

    #[test]
    fn test_find_clusters_disjoint_and_complete() {
        let groups = vec![vec![4, 6], vec![0, 3], vec![6, 11], vec![3, 0]];
        let clusters = find_clusters(&groups);

        let mut members: Vec<usize> = clusters.iter().flatten().copied().collect();
        members.sort_unstable();
        assert_eq!(members, vec![0, 3, 4, 6, 11]);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_find_clusters_empty() {
        assert!(find_clusters(&[]).is_empty());
    }
}
