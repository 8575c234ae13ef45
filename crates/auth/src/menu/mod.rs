//! Menu tree builder: backend menu graph → routable navigation forest.
//!
//! The transform is a structural map. Node count, nesting depth and sibling
//! order of the output always equal those of the input; nodes are never
//! filtered or reordered here (authorization already happened server-side).

mod assemble;
mod i18n;

pub use assemble::assemble_forest;
pub use i18n::{Catalog, Translator, localize_forest, translate_menu_title};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cmsadmin_core::MenuId;

/// Component used when the backend names none.
pub const LAYOUT_COMPONENT: &str = "BasicLayout";

// ─────────────────────────────────────────────────────────────────────────────
// Backend shape (input)
// ─────────────────────────────────────────────────────────────────────────────

/// Presentation metadata as sent by the backend. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendMenuMeta {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub hide_in_menu: Option<bool>,
    pub hide_in_tab: Option<bool>,
    pub hide_in_breadcrumb: Option<bool>,
    pub keep_alive: Option<bool>,
    pub frame_src: Option<String>,
    pub order: Option<i32>,
}

/// A node of the backend menu tree (`GET /menus/user`).
///
/// Identity fields are optional at the wire level so that a malformed node can
/// be reported with its position instead of failing deserialization blindly;
/// [`build_route`] rejects nodes missing `id`, `name` or `path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendMenuNode {
    pub id: Option<MenuId>,
    pub parent_id: Option<MenuId>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub meta: Option<BackendMenuMeta>,
    pub children: Option<Vec<BackendMenuNode>>,
}

impl BackendMenuNode {
    /// Node with the identity fields set and nothing else.
    pub fn new(id: u64, parent_id: u64, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: Some(MenuId::new(id)),
            parent_id: Some(MenuId::new(parent_id)),
            name: Some(name.into()),
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_meta(mut self, meta: BackendMenuMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_children(mut self, children: Vec<BackendMenuNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// `true` when the node sits at the root level (`parentId` 0 or absent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none_or(|p| p.is_zero())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Frontend shape (output)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
    pub hide_in_menu: bool,
    pub hide_in_tab: bool,
    pub hide_in_breadcrumb: bool,
    pub keep_alive: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub frame_src: Option<String>,
    pub order: i32,
}

/// A routable navigation node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    pub path: String,
    pub name: String,
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub redirect: Option<String>,
    pub meta: RouteMeta,
    /// Present only when the node has at least one child.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub children: Option<Vec<RouteNode>>,
}

impl RouteNode {
    /// Leaf route rendered by the layout component with default metadata.
    pub fn layout(path: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: path.into(),
            component: LAYOUT_COMPONENT.to_string(),
            redirect: None,
            meta: RouteMeta {
                title: name.clone(),
                icon: None,
                hide_in_menu: false,
                hide_in_tab: false,
                hide_in_breadcrumb: false,
                keep_alive: true,
                frame_src: None,
                order: 0,
            },
            name,
            children: None,
        }
    }

    pub fn children(&self) -> &[RouteNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(RouteNode::node_count).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(RouteNode::depth).max().unwrap_or(0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuError {
    /// `at` is the position of the node, e.g. `"[0].children[2]"`.
    #[error("malformed menu node at {at}: {reason}")]
    MalformedNode { at: String, reason: String },

    #[error("menu node {0} appears more than once")]
    DuplicateId(MenuId),

    #[error("menu node {0} is part of a parent cycle")]
    Cycle(MenuId),
}

// ─────────────────────────────────────────────────────────────────────────────
// Transform
// ─────────────────────────────────────────────────────────────────────────────

/// Transform one backend node (and its subtree) into a route.
pub fn build_route(node: &BackendMenuNode) -> Result<RouteNode, MenuError> {
    build_at(node, "[0]".to_string())
}

/// Transform a whole backend forest, preserving order.
///
/// One malformed node anywhere fails the whole build: a partial navigation
/// tree is never returned.
pub fn build_forest(nodes: &[BackendMenuNode]) -> Result<Vec<RouteNode>, MenuError> {
    let routes = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| build_at(n, format!("[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        roots = routes.len(),
        nodes = routes.iter().map(RouteNode::node_count).sum::<usize>(),
        "built menu forest"
    );
    Ok(routes)
}

fn build_at(node: &BackendMenuNode, at: String) -> Result<RouteNode, MenuError> {
    let malformed = |reason: &str| MenuError::MalformedNode {
        at: at.clone(),
        reason: reason.to_string(),
    };

    match node.id {
        Some(id) if !id.is_zero() => {}
        Some(_) => return Err(malformed("id must be non-zero")),
        None => return Err(malformed("missing id")),
    }
    let name = non_empty(&node.name).ok_or_else(|| malformed("missing name"))?;
    let path = non_empty(&node.path).ok_or_else(|| malformed("missing path"))?;

    let meta = node.meta.clone().unwrap_or_default();
    let route_meta = RouteMeta {
        title: non_empty(&meta.title).unwrap_or(name).to_string(),
        icon: meta.icon,
        hide_in_menu: meta.hide_in_menu.unwrap_or(false),
        hide_in_tab: meta.hide_in_tab.unwrap_or(false),
        hide_in_breadcrumb: meta.hide_in_breadcrumb.unwrap_or(false),
        keep_alive: meta.keep_alive != Some(false),
        frame_src: meta.frame_src,
        order: meta.order.unwrap_or(0),
    };

    let children = match node.children.as_deref() {
        Some(kids) if !kids.is_empty() => Some(
            kids.iter()
                .enumerate()
                .map(|(i, child)| build_at(child, format!("{at}.children[{i}]")))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        _ => None,
    };

    Ok(RouteNode {
        path: path.to_string(),
        name: name.to_string(),
        component: non_empty(&node.component)
            .unwrap_or(LAYOUT_COMPONENT)
            .to_string(),
        redirect: non_empty(&node.redirect).map(str::to_string),
        meta: route_meta,
        children,
    })
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}
