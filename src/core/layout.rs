//! Custom dashboard panel ordering and row packing.
//!
//! Panels are packed `graphs_per_row` to a row; an expanded panel always takes
//! a row of its own. Reordering is expansion aware: when the mover or the
//! neighbour it moves towards is expanded, the move jumps two slots so it
//! passes a whole row instead of trading places inside it. An expanded mover
//! is lifted out and reinserted, so the row it passes keeps its order. A plain
//! mover swaps with its target. Jumps are clamped to the ends of the list, and
//! a move up followed by a move down of the same panel restores the original
//! order.

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::error::{LabError, Result};
use crate::models::{GraphConfig, GraphType};

pub const DEFAULT_GRAPHS_PER_ROW: usize = 2;

const ID_SUFFIX_LEN: usize = 9;

/// Time based id with a random base-36 suffix.
pub fn new_graph_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| std::char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0'))
        .collect();
    format!("{}{}", Utc::now().timestamp_millis(), suffix)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardLayout {
    graphs: Vec<GraphConfig>,
}

impl DashboardLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graphs(graphs: Vec<GraphConfig>) -> Self {
        Self { graphs }
    }

    pub fn graphs(&self) -> &[GraphConfig] {
        &self.graphs
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// One single-test panel per name. Returns the new ids.
    pub fn add_single(&mut self, test_names: &[String]) -> Result<Vec<String>> {
        if test_names.is_empty() {
            return Err(LabError::EmptySelection);
        }
        let ids = test_names
            .iter()
            .map(|name| {
                let id = new_graph_id();
                self.graphs.push(GraphConfig {
                    id: id.clone(),
                    graph_type: GraphType::Single,
                    test_names: vec![name.clone()],
                    expanded: false,
                });
                id
            })
            .collect();
        debug!("Added {} single graphs", test_names.len());
        Ok(ids)
    }

    /// One combined panel holding every name.
    pub fn add_multi(&mut self, test_names: &[String]) -> Result<String> {
        if test_names.is_empty() {
            return Err(LabError::EmptySelection);
        }
        let id = new_graph_id();
        self.graphs.push(GraphConfig {
            id: id.clone(),
            graph_type: GraphType::Multi,
            test_names: test_names.to_vec(),
            expanded: false,
        });
        debug!("Added combined graph of {} tests", test_names.len());
        Ok(id)
    }

    pub fn add(&mut self, graph_type: GraphType, test_names: &[String]) -> Result<Vec<String>> {
        match graph_type {
            GraphType::Single => self.add_single(test_names),
            GraphType::Multi => self.add_multi(test_names).map(|id| vec![id]),
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.graphs.len();
        self.graphs.retain(|graph| graph.id != id);
        before != self.graphs.len()
    }

    /// Flips the expanded flag and returns the new value.
    pub fn toggle_expanded(&mut self, id: &str) -> Result<bool> {
        let graph = self
            .graphs
            .iter_mut()
            .find(|graph| graph.id == id)
            .ok_or_else(|| LabError::GraphNotFound(id.to_string()))?;
        graph.expanded = !graph.expanded;
        Ok(graph.expanded)
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        self.shift(index, Direction::Up)
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        self.shift(index, Direction::Down)
    }

    fn shift(&mut self, index: usize, direction: Direction) -> bool {
        let len = self.graphs.len();
        if index >= len {
            return false;
        }
        let neighbour = match direction {
            Direction::Up if index > 0 => index - 1,
            Direction::Down if index + 1 < len => index + 1,
            _ => return false,
        };

        let mover_expanded = self.graphs[index].expanded;
        let step = if mover_expanded || self.graphs[neighbour].expanded {
            2
        } else {
            1
        };
        let target = match direction {
            Direction::Up => index.saturating_sub(step),
            Direction::Down => (index + step).min(len - 1),
        };

        match direction {
            Direction::Up if mover_expanded => self.graphs[target..=index].rotate_right(1),
            Direction::Down if mover_expanded => self.graphs[index..=target].rotate_left(1),
            _ => self.graphs.swap(index, target),
        }
        true
    }

    /// Packs panels into display rows. Derived on every call, never stored.
    pub fn layout_rows(&self, graphs_per_row: usize) -> Vec<Vec<&GraphConfig>> {
        let per_row = graphs_per_row.max(1);
        let mut rows = Vec::new();
        let mut current: Vec<&GraphConfig> = Vec::new();

        for graph in &self.graphs {
            if graph.expanded {
                if !current.is_empty() {
                    rows.push(std::mem::take(&mut current));
                }
                rows.push(vec![graph]);
                continue;
            }
            current.push(graph);
            if current.len() == per_row {
                rows.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            rows.push(current);
        }
        rows
    }

    /// Every test shown on the dashboard, first-seen order.
    pub fn test_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.graphs.iter().flat_map(|graph| graph.test_names.iter()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

/// Checklist state of the "Add Graph" panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestSelection {
    names: Vec<String>,
}

impl TestSelection {
    pub fn toggle(&mut self, test_name: &str) {
        match self.names.iter().position(|name| name == test_name) {
            Some(index) => {
                self.names.remove(index);
            }
            None => self.names.push(test_name.to_string()),
        }
    }

    pub fn contains(&self, test_name: &str) -> bool {
        self.names.iter().any(|name| name == test_name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Adds graphs for the current selection and clears it on success.
    pub fn commit(&mut self, layout: &mut DashboardLayout, graph_type: GraphType) -> Result<Vec<String>> {
        let ids = layout.add(graph_type, &self.names)?;
        self.names.clear();
        Ok(ids)
    }
}
