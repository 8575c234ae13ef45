//! Assemble a nested menu forest from a flat `parentId`-linked list.
//!
//! Nodes live in an arena addressed by index; parent links are resolved
//! through an id → index map, never through references. A node that cannot
//! be reached from any root is part of a parent cycle.

use std::collections::{HashMap, HashSet};

use cmsadmin_core::MenuId;

use super::{BackendMenuNode, MenuError};

/// Build a nested forest from flat nodes.
///
/// - Roots are nodes with `parentId` 0/absent, or whose parent is not in the list.
/// - Siblings keep their relative input order.
/// - Any `children` already present on the input nodes are discarded.
pub fn assemble_forest(flat: Vec<BackendMenuNode>) -> Result<Vec<BackendMenuNode>, MenuError> {
    let mut index: HashMap<MenuId, usize> = HashMap::with_capacity(flat.len());
    for (i, node) in flat.iter().enumerate() {
        let id = node.id.ok_or_else(|| MenuError::MalformedNode {
            at: format!("[{i}]"),
            reason: "missing id".to_string(),
        })?;
        if index.insert(id, i).is_some() {
            return Err(MenuError::DuplicateId(id));
        }
    }

    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    for (i, node) in flat.iter().enumerate() {
        let parent = node
            .parent_id
            .filter(|p| !p.is_zero())
            .and_then(|p| index.get(&p).copied());
        match parent {
            Some(p) => children[p].push(i),
            None => roots.push(i),
        }
    }

    // Anything not reachable from a root sits on a cycle.
    let mut reached: HashSet<usize> = HashSet::with_capacity(flat.len());
    let mut stack: Vec<usize> = roots.clone();
    while let Some(i) = stack.pop() {
        if reached.insert(i) {
            stack.extend(children[i].iter().copied());
        }
    }
    if let Some(i) = (0..flat.len()).find(|i| !reached.contains(i)) {
        let id = flat[i].id.unwrap_or_default();
        return Err(MenuError::Cycle(id));
    }

    let mut arena: Vec<Option<BackendMenuNode>> = flat.into_iter().map(Some).collect();
    Ok(roots
        .iter()
        .filter_map(|&r| take_subtree(&mut arena, &children, r))
        .collect())
}

fn take_subtree(
    arena: &mut [Option<BackendMenuNode>],
    children: &[Vec<usize>],
    i: usize,
) -> Option<BackendMenuNode> {
    let mut node = arena[i].take()?;
    let kids: Vec<BackendMenuNode> = children[i]
        .iter()
        .filter_map(|&c| take_subtree(arena, children, c))
        .collect();
    node.children = if kids.is_empty() { None } else { Some(kids) };
    Some(node)
}
