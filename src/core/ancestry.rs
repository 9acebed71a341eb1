//! Tree algorithms over any node type with a single-parent relation.
//!
//! The functions here are generic over a `Copy` node handle and a parent
//! function, so they work equally for the model's vertex-only ancestry and
//! for the alternating region/vertex element ancestry.

/// Returns the ancestry of `node`, ordered from the root to `node` itself.
///
/// # Example
///
/// ```rust
/// use statechart::core::ancestry::ancestors;
///
/// // 0 <- 1 <- 2
/// let parents = [None, Some(0), Some(1)];
/// assert_eq!(ancestors(2usize, |n| parents[n]), vec![0, 1, 2]);
/// ```
pub fn ancestors<T, F>(node: T, parent: F) -> Vec<T>
where
    T: Copy,
    F: Fn(T) -> Option<T>,
{
    let mut result = vec![node];
    let mut current = node;

    while let Some(next) = parent(current) {
        result.push(next);
        current = next;
    }

    result.reverse();
    result
}

/// Index of the lowest common ancestor of two ancestries, or `None` if they
/// share no root.
pub fn lowest_common_ancestor_index<T: PartialEq>(ancestry1: &[T], ancestry2: &[T]) -> Option<usize> {
    ancestry1
        .iter()
        .zip(ancestry2)
        .take_while(|(a, b)| a == b)
        .count()
        .checked_sub(1)
}

/// Lowest common ancestor of two nodes.
pub fn lowest_common_ancestor<T, F>(node1: T, node2: T, parent: F) -> Option<T>
where
    T: Copy + PartialEq,
    F: Fn(T) -> Option<T>,
{
    let ancestry1 = ancestors(node1, &parent);
    let ancestry2 = ancestors(node2, &parent);

    lowest_common_ancestor_index(&ancestry1, &ancestry2).map(|index| ancestry1[index])
}

/// True if `ancestor` is a strict ancestor of `child`.
pub fn is_child<T, F>(child: T, ancestor: T, parent: F) -> bool
where
    T: Copy + PartialEq,
    F: Fn(T) -> Option<T>,
{
    let mut current = child;

    while let Some(next) = parent(current) {
        if next == ancestor {
            return true;
        }
        current = next;
    }

    false
}

/// Number of edges between `node` and the root.
pub fn depth<T, F>(node: T, parent: F) -> usize
where
    T: Copy,
    F: Fn(T) -> Option<T>,
{
    let mut result = 0;
    let mut current = node;

    while let Some(next) = parent(current) {
        result += 1;
        current = next;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    //        0
    //      /   \
    //     1     2
    //    / \     \
    //   3   4     5
    const PARENTS: [Option<usize>; 6] = [None, Some(0), Some(0), Some(1), Some(1), Some(2)];

    fn parent(node: usize) -> Option<usize> {
        PARENTS[node]
    }

    #[test]
    fn ancestors_are_ordered_from_root() {
        assert_eq!(ancestors(3, parent), vec![0, 1, 3]);
        assert_eq!(ancestors(0, parent), vec![0]);
    }

    #[test]
    fn lca_of_siblings_is_parent() {
        assert_eq!(lowest_common_ancestor(3, 4, parent), Some(1));
        assert_eq!(lowest_common_ancestor(4, 5, parent), Some(0));
    }

    #[test]
    fn lca_of_node_and_descendant_is_node() {
        assert_eq!(lowest_common_ancestor(1, 4, parent), Some(1));
        assert_eq!(lowest_common_ancestor(3, 3, parent), Some(3));
    }

    #[test]
    fn lca_index_is_none_without_shared_root() {
        assert_eq!(lowest_common_ancestor_index(&[1, 2], &[3, 2]), None);
        assert_eq!(lowest_common_ancestor_index::<usize>(&[], &[]), None);
    }

    #[test]
    fn is_child_is_strict() {
        assert!(is_child(3, 1, parent));
        assert!(is_child(3, 0, parent));
        assert!(!is_child(1, 1, parent));
        assert!(!is_child(5, 1, parent));
    }

    #[test]
    fn depth_counts_edges() {
        assert_eq!(depth(0, parent), 0);
        assert_eq!(depth(5, parent), 2);
    }
}
