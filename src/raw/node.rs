use super::handle::Handle;

/// Color of the link from a node's parent down to the node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    #[inline]
    pub(crate) const fn flipped(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }
}

// LLRB: nodes hold the key inline and the payload by handle into a separate arena,
// so a two-child delete can move a payload by swapping handles.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) key: i64,
    pub(crate) value: Handle,
    pub(crate) color: Color,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
}

impl Node {
    /// Creates a red leaf; new nodes always join the tree through a red link.
    pub(crate) const fn new(key: i64, value: Handle) -> Self {
        Self {
            key,
            value,
            color: Color::Red,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) const fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    /// Returns the child to descend into when searching for `key`, or `None` on a match.
    #[inline]
    pub(crate) fn child_toward(&self, key: i64) -> Option<Option<Handle>> {
        match key.cmp(&self.key) {
            core::cmp::Ordering::Less => Some(self.left),
            core::cmp::Ordering::Greater => Some(self.right),
            core::cmp::Ordering::Equal => None,
        }
    }
}
