//! Tree flattening for nested test results.
//!
//! Walks a testable unit's nested suite tree in pre-order and returns every
//! leaf paired with the name of its immediate parent group.

use crate::error::{Location, ReportError};
use crate::record::{TestMetadata, TestNode};

/// Group label used when a group node carries neither name nor identifier.
pub const UNNAMED_GROUP: &str = "(unnamed group)";

/// Default bound on nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A leaf test paired with its owning group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatLeaf<'a> {
    pub leaf: &'a TestMetadata,
    pub group: &'a str,
}

/// Flatten `nodes` (the top-level tests of the section named `section`).
///
/// Leaves directly under the section are grouped under the section name.
/// Nesting deeper than `max_depth` is rejected rather than followed.
pub fn flatten_tests<'a>(
    section: &'a str,
    nodes: &'a [TestNode],
    max_depth: usize,
    location: &Location,
) -> Result<Vec<FlatLeaf<'a>>, ReportError> {
    let mut leaves = Vec::new();
    collect(section, nodes, 0, max_depth, location, &mut leaves)?;
    Ok(leaves)
}

fn collect<'a>(
    group: &'a str,
    nodes: &'a [TestNode],
    depth: usize,
    max_depth: usize,
    location: &Location,
    out: &mut Vec<FlatLeaf<'a>>,
) -> Result<(), ReportError> {
    if depth >= max_depth {
        return Err(ReportError::NestingTooDeep { limit: max_depth, location: location.with_group(group) });
    }

    for node in nodes {
        match node {
            TestNode::Group(child) => {
                let name = child.name.as_deref().or(child.identifier.as_deref()).unwrap_or(UNNAMED_GROUP);
                collect(name, &child.subtests, depth + 1, max_depth, location, out)?;
            }
            TestNode::Leaf(leaf) => out.push(FlatLeaf { leaf, group }),
        }
    }
    Ok(())
}
