//! The classification tree index built over the same units.
//!
//! Only what the reconciliation needs is modeled: decision nodes carry the
//! feature they split on and their children, leaves carry the unit indices
//! stored under them. The tree never answers queries here; its one job is
//! to surface every leaf's unit indices through [`Cart::leaf_units`].

use crate::container::{ContainerReader, ContainerWriter};
use crate::result::CotejarResult;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Payload kind string of a classification-tree container.
pub const CART_KIND: &str = "CART";

/// Nodes deeper than this are rejected as malformed input.
const MAX_DEPTH: u32 = 64;

const TAG_DECISION: u8 = 0;
const TAG_LEAF: u8 = 1;

/// One node of the classification tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartNode {
    /// An inner node splitting on a feature.
    Decision {
        /// Index of the feature the node splits on.
        feature: u32,
        /// Child nodes, one per feature value partition.
        children: Vec<CartNode>,
    },
    /// A leaf holding the unit indices classified into it.
    Leaf {
        /// Stored unit indices, in training order.
        units: Vec<i32>,
    },
}

/// A classification tree with unit indices at its leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    root: CartNode,
}

impl Cart {
    /// Wrap a root node.
    #[must_use]
    pub fn new(root: CartNode) -> Self {
        Self { root }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &CartNode {
        &self.root
    }

    /// Depth-first iterator over the unit slices stored at each leaf.
    #[must_use]
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            stack: vec![&self.root],
        }
    }

    /// Every unit index reachable from a leaf, duplicates preserved.
    pub fn leaf_units(&self) -> impl Iterator<Item = i32> + '_ {
        self.leaves().flatten().copied()
    }

    /// Number of leaves in the tree.
    #[must_use]
    pub fn num_leaves(&self) -> usize {
        self.leaves().count()
    }

    /// Load a classification-tree container.
    pub fn load(path: &Path) -> CotejarResult<Self> {
        let mut r = ContainerReader::open(path)?;
        r.expect_header(CART_KIND)?;
        let root = read_node(&mut r, 0)?;
        let cart = Self::new(root);
        debug!(
            path = %path.display(),
            num_leaves = cart.num_leaves(),
            "loaded classification tree"
        );
        Ok(cart)
    }

    /// Write this tree as a classification-tree container.
    pub fn write(&self, path: &Path) -> CotejarResult<()> {
        let mut w = ContainerWriter::create(path)?;
        w.write_header(CART_KIND)?;
        write_node(&mut w, &self.root)?;
        w.finish()
    }
}

/// Iterator returned by [`Cart::leaves`].
pub struct Leaves<'a> {
    stack: Vec<&'a CartNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a [i32];

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                CartNode::Decision { children, .. } => {
                    self.stack.extend(children.iter().rev());
                }
                CartNode::Leaf { units } => return Some(units),
            }
        }
        None
    }
}

fn read_node<R: Read>(r: &mut ContainerReader<R>, depth: u32) -> CotejarResult<CartNode> {
    if depth > MAX_DEPTH {
        return Err(r.err(format!("tree deeper than {MAX_DEPTH} levels")));
    }
    match r.read_u8()? {
        TAG_DECISION => {
            let feature = r.read_u32()?;
            let num_children = r.read_u32()? as usize;
            let mut children = Vec::new();
            for _ in 0..num_children {
                children.push(read_node(r, depth + 1)?);
            }
            Ok(CartNode::Decision { feature, children })
        }
        TAG_LEAF => {
            let num_units = r.read_u32()? as usize;
            let mut units = Vec::new();
            for _ in 0..num_units {
                units.push(r.read_i32()?);
            }
            Ok(CartNode::Leaf { units })
        }
        tag => Err(r.err(format!("unknown node tag {tag}"))),
    }
}

fn write_node<W: Write>(w: &mut ContainerWriter<W>, node: &CartNode) -> CotejarResult<()> {
    match node {
        CartNode::Decision { feature, children } => {
            w.write_u8(TAG_DECISION)?;
            w.write_u32(*feature)?;
            w.write_u32(children.len() as u32)?;
            for child in children {
                write_node(w, child)?;
            }
        }
        CartNode::Leaf { units } => {
            w.write_u8(TAG_LEAF)?;
            w.write_u32(units.len() as u32)?;
            for &unit in units {
                w.write_i32(unit)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CotejarError;

    fn sample_tree() -> Cart {
        Cart::new(CartNode::Decision {
            feature: 0,
            children: vec![
                CartNode::Leaf {
                    units: vec![1, 2, 3],
                },
                CartNode::Decision {
                    feature: 2,
                    children: vec![
                        CartNode::Leaf { units: vec![4] },
                        CartNode::Leaf { units: vec![] },
                    ],
                },
            ],
        })
    }

    #[test]
    fn test_leaf_traversal_visits_every_leaf() {
        let cart = sample_tree();
        assert_eq!(cart.num_leaves(), 3);
        let units: Vec<i32> = cart.leaf_units().collect();
        assert_eq!(units, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicates_preserved_across_leaves() {
        let cart = Cart::new(CartNode::Decision {
            feature: 0,
            children: vec![
                CartNode::Leaf { units: vec![7, 8] },
                CartNode::Leaf { units: vec![8] },
            ],
        });
        let units: Vec<i32> = cart.leaf_units().collect();
        assert_eq!(units, vec![7, 8, 8]);
    }

    #[test]
    fn test_single_leaf_root() {
        let cart = Cart::new(CartNode::Leaf {
            units: vec![-1, 0, 5],
        });
        assert_eq!(cart.num_leaves(), 1);
        assert_eq!(cart.leaf_units().count(), 3);
    }

    #[test]
    fn test_container_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.mry");
        let cart = sample_tree();
        cart.write(&path).unwrap();
        let loaded = Cart::load(&path).unwrap();
        assert_eq!(loaded, cart);
    }

    #[test]
    fn test_load_rejects_unknown_tag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.mry");
        let cart = Cart::new(CartNode::Leaf { units: vec![] });
        cart.write(&path).unwrap();
        // corrupt the node tag (last 5 bytes are tag + empty unit count)
        let mut bytes = std::fs::read(&path).unwrap();
        let n = bytes.len();
        bytes[n - 5] = 9;
        std::fs::write(&path, bytes).unwrap();
        let err = Cart::load(&path).unwrap_err();
        assert!(matches!(err, CotejarError::Format { .. }));
        assert!(err.to_string().contains("unknown node tag 9"));
    }

    #[test]
    fn test_depth_limit_guards_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.mry");
        let mut node = CartNode::Leaf { units: vec![] };
        for _ in 0..80 {
            node = CartNode::Decision {
                feature: 0,
                children: vec![node],
            };
        }
        Cart::new(node).write(&path).unwrap();
        let err = Cart::load(&path).unwrap_err();
        assert!(err.to_string().contains("deeper than"));
    }
}
