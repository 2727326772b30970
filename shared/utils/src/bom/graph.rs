//! Hierarchy Resolver
//!
//! Turns a flat, ordered mBOM item list into a directed parent -> child graph
//! with a level-banded 2D layout for rendering.
//!
//! Parents come from explicit `dependencies` when present, otherwise from the
//! first item in list order sitting one level above. Resolution is total: an
//! empty list gives an empty graph, dangling references give edges whose
//! source has no node, and a list with no derivable edges is chained in list
//! order.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bomforge_models::ManufacturingBomItem;

use crate::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub level: u32,
    pub position: Position,
    pub is_root: bool,
    pub item: ManufacturingBomItem,
}

/// Where an edge came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// Listed in the child's `dependencies`
    Dependency,
    /// Inferred from the child's level
    LevelInferred,
    /// List-order chain used when nothing else connects the items
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl GraphEdge {
    fn new(source: &str, target: &str, kind: EdgeKind) -> Self {
        Self {
            id: format!("{}-{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Root part numbers in list order
    pub roots: Vec<String>,
    pub max_level: u32,
}

impl DependencyGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.source == id)
            .map(|e| e.target.as_str())
    }

    /// Edges with an endpoint that has no node; renderers filter these out.
    pub fn dangling_edges(&self) -> Vec<&GraphEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }
}

/// Parent -> children adjacency kept in first-seen parent order.
#[derive(Default)]
struct Adjacency<'a> {
    order: Vec<&'a str>,
    children: HashMap<&'a str, Vec<(&'a str, EdgeKind)>>,
}

impl<'a> Adjacency<'a> {
    fn link(&mut self, parent: &'a str, child: &'a str, kind: EdgeKind) {
        if !self.children.contains_key(parent) {
            self.order.push(parent);
        }
        self.children.entry(parent).or_default().push((child, kind));
    }

    fn into_edges(self) -> Vec<GraphEdge> {
        let Adjacency { order, mut children } = self;
        order
            .into_iter()
            .flat_map(|parent| {
                children
                    .remove(parent)
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |(child, kind)| GraphEdge::new(parent, child, kind))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyResolver {
    layout: LayoutConfig,
}

impl HierarchyResolver {
    /// Spacings that are not finite and positive fall back to the defaults,
    /// otherwise nodes would stack on top of each other.
    pub fn new(layout: LayoutConfig) -> Self {
        let defaults = LayoutConfig::default();
        Self {
            layout: LayoutConfig {
                horizontal_spacing: usable_spacing("horizontal", layout.horizontal_spacing, defaults.horizontal_spacing),
                vertical_spacing: usable_spacing("vertical", layout.vertical_spacing, defaults.vertical_spacing),
            },
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Build the positioned graph for `items`. Never fails.
    pub fn resolve(&self, items: &[ManufacturingBomItem]) -> DependencyGraph {
        if items.is_empty() {
            return DependencyGraph::default();
        }

        let (adjacency, parented) = derive_adjacency(items);
        let roots = detect_roots(items, &parented);

        let mut edges = adjacency.into_edges();
        if edges.is_empty() && items.len() > 1 {
            debug!(items = items.len(), "No hierarchy edges derived, chaining items in list order");
            edges = items
                .windows(2)
                .map(|pair| GraphEdge::new(pair[0].part_number(), pair[1].part_number(), EdgeKind::Sequential))
                .collect();
        }

        let root_set: HashSet<&str> = roots.iter().map(String::as_str).collect();
        let (nodes, max_level) = self.layout_nodes(items, &root_set);

        debug!(nodes = nodes.len(), edges = edges.len(), roots = roots.len(), "Resolved BOM hierarchy");

        DependencyGraph {
            nodes,
            edges,
            roots,
            max_level,
        }
    }

    fn layout_nodes(
        &self,
        items: &[ManufacturingBomItem],
        roots: &HashSet<&str>,
    ) -> (Vec<GraphNode>, u32) {
        let mut by_level: BTreeMap<u32, Vec<&ManufacturingBomItem>> = BTreeMap::new();
        for item in items {
            by_level.entry(item.level()).or_default().push(item);
        }
        let max_level = by_level.keys().next_back().copied().unwrap_or(0);

        let spacing_x = self.layout.horizontal_spacing;
        let spacing_y = self.layout.vertical_spacing;

        let nodes = by_level
            .into_iter()
            .flat_map(|(level, level_items)| {
                let start_x = -((level_items.len() - 1) as f64 * spacing_x) / 2.0;
                level_items.into_iter().enumerate().map(move |(index, item)| GraphNode {
                    id: item.part_number().to_string(),
                    level,
                    position: Position {
                        x: start_x + index as f64 * spacing_x,
                        y: level as f64 * spacing_y,
                    },
                    is_root: roots.contains(item.part_number()),
                    item: item.clone(),
                })
            })
            .collect();

        (nodes, max_level)
    }
}

/// Step 1: explicit dependencies first, else the first item one level up.
fn derive_adjacency(items: &[ManufacturingBomItem]) -> (Adjacency<'_>, HashSet<&str>) {
    let mut first_at_level: HashMap<u32, &str> = HashMap::new();
    for item in items {
        first_at_level.entry(item.level()).or_insert(item.part_number());
    }

    let mut adjacency = Adjacency::default();
    let mut parented = HashSet::new();

    for item in items {
        let child = item.part_number();
        if item.has_dependencies() {
            for parent in &item.dependencies {
                adjacency.link(parent, child, EdgeKind::Dependency);
            }
            parented.insert(child);
        } else if item.level() > 0 {
            if let Some(&parent) = first_at_level.get(&(item.level() - 1)) {
                adjacency.link(parent, child, EdgeKind::LevelInferred);
                parented.insert(child);
            }
        }
    }

    (adjacency, parented)
}

/// Step 2: unparented items, or the first item when everything has a parent.
fn detect_roots(items: &[ManufacturingBomItem], parented: &HashSet<&str>) -> Vec<String> {
    let mut roots: Vec<String> = items
        .iter()
        .filter(|i| !parented.contains(i.part_number()))
        .map(|i| i.part_number().to_string())
        .collect();

    if roots.is_empty() {
        if let Some(first) = items.first() {
            debug!(part_number = first.part_number(), "No unparented items, using first item as root");
            roots.push(first.part_number().to_string());
        }
    }

    roots
}

/// Resolve with the default layout spacing
pub fn resolve(items: &[ManufacturingBomItem]) -> DependencyGraph {
    HierarchyResolver::default().resolve(items)
}

fn usable_spacing(axis: &str, value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!(axis, value, fallback, "Invalid layout spacing, using default");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(part_number: &str, level: u32) -> ManufacturingBomItem {
        ManufacturingBomItem::new(part_number, format!("{} description", part_number)).with_level(level)
    }

    fn edge_pairs(graph: &DependencyGraph) -> Vec<(&str, &str)> {
        graph
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let graph = resolve(&[]);
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.roots.is_empty());
    }

    #[test]
    fn test_single_item_has_no_edges() {
        let graph = resolve(&[item("A", 0)]);
        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.roots, vec!["A"]);
        assert!(graph.nodes[0].is_root);
    }

    #[test]
    fn test_sequential_fallback_chain() {
        let graph = resolve(&[item("A", 0), item("B", 0), item("C", 0)]);

        assert_eq!(edge_pairs(&graph), vec![("A", "B"), ("B", "C")]);
        assert!(graph.edges.iter().all(|e| e.kind == EdgeKind::Sequential));
        assert_eq!(graph.edges[0].id, "A-B");
        // Fallback edges do not parent anything
        assert_eq!(graph.roots, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_level_inference_uses_first_candidate() {
        let items = vec![item("ROOT", 0), item("S1", 1), item("S2", 1), item("P1", 2), item("P2", 2)];
        let graph = resolve(&items);

        assert_eq!(
            edge_pairs(&graph),
            vec![("ROOT", "S1"), ("ROOT", "S2"), ("S1", "P1"), ("S1", "P2")]
        );
        assert!(graph.edges.iter().all(|e| e.kind == EdgeKind::LevelInferred));
        assert_eq!(graph.roots, vec!["ROOT"]);
    }

    #[test]
    fn test_candidate_later_in_list_still_wins() {
        // Parent candidates come from the whole list, not just earlier items
        let items = vec![item("CHILD", 1), item("TOP", 0)];
        let graph = resolve(&items);

        assert_eq!(edge_pairs(&graph), vec![("TOP", "CHILD")]);
        assert_eq!(graph.roots, vec!["TOP"]);
    }

    #[test]
    fn test_level_without_candidate_stays_root() {
        let graph = resolve(&[item("A", 0), item("ORPHAN", 3)]);
        assert!(graph.roots.contains(&"ORPHAN".to_string()));
        // No edges at all, so the list-order chain applies
        assert_eq!(edge_pairs(&graph), vec![("A", "ORPHAN")]);
    }

    #[test]
    fn test_explicit_dependencies_take_precedence() {
        let items = vec![
            item("X", 0),
            item("SIB", 1),
            item("D", 2).with_dependencies(["X"]),
        ];
        let graph = resolve(&items);

        let into_d: Vec<&str> = graph
            .edges
            .iter()
            .filter(|e| e.target == "D")
            .map(|e| e.source.as_str())
            .collect();
        assert_eq!(into_d, vec!["X"]);
        assert_eq!(graph.edges.iter().find(|e| e.target == "D").unwrap().kind, EdgeKind::Dependency);
        assert_eq!(graph.children_of("SIB").count(), 0);
    }

    #[test]
    fn test_empty_dependency_list_at_level_zero_is_root() {
        let items = vec![item("A", 0).with_dependencies(Vec::<String>::new()), item("B", 0)];
        let graph = resolve(&items);
        assert!(graph.node("A").unwrap().is_root);
    }

    #[test]
    fn test_dangling_dependency_is_kept() {
        let items = vec![item("A", 0).with_dependencies(["GHOST"])];
        let graph = resolve(&items);

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(edge_pairs(&graph), vec![("GHOST", "A")]);
        assert!(graph.node("GHOST").is_none());
        assert_eq!(graph.dangling_edges().len(), 1);
        // A is parented, so the first item becomes the fallback root
        assert_eq!(graph.roots, vec!["A"]);
    }

    #[test]
    fn test_self_dependency_is_a_self_loop() {
        let items = vec![item("A", 0).with_dependencies(["A"]), item("B", 0)];
        let graph = resolve(&items);

        assert_eq!(edge_pairs(&graph), vec![("A", "A")]);
        assert_eq!(graph.roots, vec!["B"]);
        assert!(graph.dangling_edges().is_empty());
    }

    #[test]
    fn test_cycle_falls_back_to_first_root() {
        let items = vec![
            item("A", 0).with_dependencies(["B"]),
            item("B", 0).with_dependencies(["A"]),
        ];
        let graph = resolve(&items);

        assert_eq!(graph.roots, vec!["A"]);
        assert!(graph.node("A").unwrap().is_root);
        assert!(!graph.node("B").unwrap().is_root);
    }

    #[test]
    fn test_edges_grouped_by_first_seen_parent() {
        let items = vec![
            item("P", 0),
            item("Q", 0),
            item("C1", 1).with_dependencies(["Q"]),
            item("C2", 1).with_dependencies(["P", "Q"]),
        ];
        let graph = resolve(&items);

        assert_eq!(edge_pairs(&graph), vec![("Q", "C1"), ("Q", "C2"), ("P", "C2")]);
    }

    #[test]
    fn test_layout_centers_levels() {
        let items = vec![item("A", 0), item("B", 1), item("C", 1), item("D", 1)];
        let graph = HierarchyResolver::new(LayoutConfig {
            horizontal_spacing: 100.0,
            vertical_spacing: 50.0,
        })
        .resolve(&items);

        let a = graph.node("A").unwrap().position;
        assert_eq!(a, Position { x: 0.0, y: 0.0 });

        let xs: Vec<f64> = ["B", "C", "D"].iter().map(|id| graph.node(id).unwrap().position.x).collect();
        assert_eq!(xs, vec![-100.0, 0.0, 100.0]);
        assert!(["B", "C", "D"].iter().all(|id| graph.node(id).unwrap().position.y == 50.0));
        assert_eq!(graph.max_level, 1);
    }

    #[test]
    fn test_unusable_spacing_falls_back_to_defaults() {
        let items = vec![item("A", 0), item("B", 1), item("C", 1)];
        for spacing in [0.0, -40.0, f64::NAN, f64::INFINITY] {
            let resolver = HierarchyResolver::new(LayoutConfig {
                horizontal_spacing: spacing,
                vertical_spacing: spacing,
            });
            assert_eq!(*resolver.layout(), LayoutConfig::default());

            let graph = resolver.resolve(&items);
            let b = graph.node("B").unwrap().position;
            let c = graph.node("C").unwrap().position;
            assert_eq!(b, Position { x: -125.0, y: 180.0 });
            assert_eq!(c, Position { x: 125.0, y: 180.0 });
            assert_ne!(graph.node("A").unwrap().position.y, b.y);
        }
    }

    #[test]
    fn test_one_bad_axis_keeps_the_other() {
        let resolver = HierarchyResolver::new(LayoutConfig {
            horizontal_spacing: 100.0,
            vertical_spacing: 0.0,
        });
        assert_eq!(resolver.layout().horizontal_spacing, 100.0);
        assert_eq!(resolver.layout().vertical_spacing, 180.0);
    }

    #[test]
    fn test_nodes_ordered_by_ascending_level() {
        let items = vec![item("DEEP", 2), item("TOP", 0), item("MID", 1)];
        let graph = resolve(&items);
        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["TOP", "MID", "DEEP"]);
        assert_eq!(graph.max_level, 2);
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let items = vec![item("A", 0), item("B", 1).with_dependencies(["A", "GHOST"]), item("C", 1)];
        assert_eq!(resolve(&items), resolve(&items));
    }
}
