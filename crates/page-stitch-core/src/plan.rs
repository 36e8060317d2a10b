use crate::error::{Result, StitchError};
use crate::join::joined_dimensions;
use crate::model::{Axis, Orientation};
use serde::{Deserialize, Serialize};

/// Composition strategies, chosen once from the orientation multiset and
/// dispatched as a tagged variant rather than scattered conditionals.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Four landscape pages: stack into two tall strips, join side by side.
    AllLandscape,
    /// Four portrait pages: two wide strips, stacked.
    AllPortrait,
    /// Portrait cluster joined horizontally, landscape cluster vertically,
    /// clusters joined along whichever axis best squares the result.
    MixedClusters,
    /// Two pages joined along whichever axis yields the squarer result.
    Pair,
    /// Row-major grid (2x2 for four inputs, smallest covering grid otherwise).
    Grid,
}

/// Reference to a plan node: an input leaf or the result of an earlier op.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeRef {
    Input(usize),
    /// Result of `ops[i]`.
    Joined(usize),
}

/// One pair join within a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct JoinOp {
    pub left: NodeRef,
    pub right: NodeRef,
    pub axis: Axis,
}

/// A binary tree of join operations producing one composite.
///
/// Leaves are input indices; each appears exactly once. `ops` is in
/// execution order (operands always precede their consumer) and holds
/// `input_count - 1` entries; the last op is the root. Immutable after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArrangementPlan {
    pub strategy: Strategy,
    pub ops: Vec<JoinOp>,
    pub input_count: usize,
}

impl ArrangementPlan {
    /// Node holding the final composite.
    pub fn root(&self) -> NodeRef {
        if self.ops.is_empty() {
            NodeRef::Input(0)
        } else {
            NodeRef::Joined(self.ops.len() - 1)
        }
    }

    /// Predicted composite dimensions for the given input dimensions,
    /// without touching pixels. Replays the dimension law over `ops`.
    pub fn planned_dimensions(&self, dims: &[(u32, u32)]) -> Result<(u32, u32)> {
        if dims.len() != self.input_count {
            return Err(StitchError::WrongImageCount {
                expected: self.input_count,
                actual: dims.len(),
            });
        }
        let mut joined: Vec<(u32, u32)> = Vec::with_capacity(self.ops.len());
        let resolve = |node: NodeRef, joined: &[(u32, u32)]| -> Result<(u32, u32)> {
            match node {
                NodeRef::Input(i) => dims.get(i).copied(),
                NodeRef::Joined(i) => joined.get(i).copied(),
            }
            .ok_or_else(|| StitchError::InvalidInput(format!("plan references {node:?} out of range")))
        };
        for op in &self.ops {
            let a = resolve(op.left, &joined)?;
            let b = resolve(op.right, &joined)?;
            joined.push(joined_dimensions(a, b, op.axis));
        }
        resolve(self.root(), &joined)
    }
}

/// Plan how to join `dims.len()` images into one near-square composite.
///
/// Two and four images get specialized strategies; any other count uses the
/// generic grid. A total, deterministic function of the input dimensions:
/// identical inputs always yield structurally identical plans.
pub fn plan(dims: &[(u32, u32)]) -> Result<ArrangementPlan> {
    if dims.is_empty() {
        return Err(StitchError::Empty);
    }
    for (i, &(w, h)) in dims.iter().enumerate() {
        if w == 0 || h == 0 {
            return Err(StitchError::InvalidInput(format!(
                "image {i} has zero dimensions"
            )));
        }
    }
    Ok(match dims.len() {
        2 => plan_two(dims),
        4 => plan_four(dims),
        _ => plan_grid(dims),
    })
}

/// Tracks node dimensions while ops are appended, so axis choices can be
/// made from predicted sizes before any pixel work happens.
struct PlanBuilder<'a> {
    input_dims: &'a [(u32, u32)],
    ops: Vec<JoinOp>,
    joined_dims: Vec<(u32, u32)>,
}

impl<'a> PlanBuilder<'a> {
    fn new(input_dims: &'a [(u32, u32)]) -> Self {
        Self {
            input_dims,
            ops: Vec::with_capacity(input_dims.len().saturating_sub(1)),
            joined_dims: Vec::new(),
        }
    }

    fn dims(&self, node: NodeRef) -> (u32, u32) {
        match node {
            NodeRef::Input(i) => self.input_dims[i],
            NodeRef::Joined(i) => self.joined_dims[i],
        }
    }

    fn join(&mut self, left: NodeRef, right: NodeRef, axis: Axis) -> NodeRef {
        let d = joined_dimensions(self.dims(left), self.dims(right), axis);
        self.ops.push(JoinOp { left, right, axis });
        self.joined_dims.push(d);
        NodeRef::Joined(self.ops.len() - 1)
    }

    /// Join a non-empty run of nodes left-to-right along one axis.
    fn join_run(&mut self, nodes: &[NodeRef], axis: Axis) -> NodeRef {
        let mut acc = nodes[0];
        for &n in &nodes[1..] {
            acc = self.join(acc, n, axis);
        }
        acc
    }

    fn finish(self, strategy: Strategy) -> ArrangementPlan {
        ArrangementPlan {
            strategy,
            ops: self.ops,
            input_count: self.input_dims.len(),
        }
    }
}

/// Deviation of a size from the square aspect ratio.
fn squareness(dims: (u32, u32)) -> f64 {
    (dims.0 as f64 / dims.1 as f64 - 1.0).abs()
}

/// Axis whose joined result is closer to square; ties break to horizontal.
fn squarer_axis(a: (u32, u32), b: (u32, u32)) -> Axis {
    let h = squareness(joined_dimensions(a, b, Axis::Horizontal));
    let v = squareness(joined_dimensions(a, b, Axis::Vertical));
    if h <= v { Axis::Horizontal } else { Axis::Vertical }
}

fn plan_two(dims: &[(u32, u32)]) -> ArrangementPlan {
    let mut b = PlanBuilder::new(dims);
    let axis = squarer_axis(dims[0], dims[1]);
    b.join(NodeRef::Input(0), NodeRef::Input(1), axis);
    b.finish(Strategy::Pair)
}

fn plan_four(dims: &[(u32, u32)]) -> ArrangementPlan {
    let orientations: [Orientation; 4] =
        std::array::from_fn(|i| Orientation::of(dims[i].0, dims[i].1));
    match select_strategy(&orientations) {
        Strategy::AllLandscape => {
            // Two wide pairs stacked into tall strips, strips side by side;
            // squarer than a 2x2 grid of wide images.
            let mut b = PlanBuilder::new(dims);
            let left = b.join(NodeRef::Input(0), NodeRef::Input(1), Axis::Vertical);
            let right = b.join(NodeRef::Input(2), NodeRef::Input(3), Axis::Vertical);
            b.join(left, right, Axis::Horizontal);
            b.finish(Strategy::AllLandscape)
        }
        Strategy::AllPortrait => {
            let mut b = PlanBuilder::new(dims);
            let top = b.join(NodeRef::Input(0), NodeRef::Input(1), Axis::Horizontal);
            let bottom = b.join(NodeRef::Input(2), NodeRef::Input(3), Axis::Horizontal);
            b.join(top, bottom, Axis::Vertical);
            b.finish(Strategy::AllPortrait)
        }
        Strategy::MixedClusters => {
            let mut b = PlanBuilder::new(dims);
            let portraits: Vec<NodeRef> = orientations
                .iter()
                .enumerate()
                .filter(|(_, o)| !matches!(o, Orientation::Landscape))
                .map(|(i, _)| NodeRef::Input(i))
                .collect();
            let landscapes: Vec<NodeRef> = orientations
                .iter()
                .enumerate()
                .filter(|(_, o)| matches!(o, Orientation::Landscape))
                .map(|(i, _)| NodeRef::Input(i))
                .collect();
            let p = b.join_run(&portraits, Axis::Horizontal);
            let l = b.join_run(&landscapes, Axis::Vertical);
            let axis = squarer_axis(b.dims(p), b.dims(l));
            b.join(p, l, axis);
            b.finish(Strategy::MixedClusters)
        }
        Strategy::Pair | Strategy::Grid => plan_grid(dims),
    }
}

/// Pick the four-image strategy from the orientation multiset. Squares
/// count toward the portrait cluster; if either cluster would be empty the
/// mixed strategy degenerates to the grid.
fn select_strategy(orientations: &[Orientation; 4]) -> Strategy {
    let landscapes = orientations
        .iter()
        .filter(|o| matches!(o, Orientation::Landscape))
        .count();
    let portraits = orientations
        .iter()
        .filter(|o| matches!(o, Orientation::Portrait))
        .count();
    let squares = 4 - landscapes - portraits;
    if landscapes == 4 {
        Strategy::AllLandscape
    } else if portraits == 4 {
        Strategy::AllPortrait
    } else if landscapes > 0 && portraits + squares > 0 {
        Strategy::MixedClusters
    } else {
        Strategy::Grid
    }
}

/// Generic fallback: smallest grid with rows x cols >= count, row-major.
/// Rows are joined horizontally and then stacked; the joiner's canvas
/// padding supplies the blank area of a short final row.
fn plan_grid(dims: &[(u32, u32)]) -> ArrangementPlan {
    let n = dims.len();
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    let mut b = PlanBuilder::new(dims);
    let mut row_nodes = Vec::with_capacity(rows);
    for r in 0..rows {
        let start = r * cols;
        let end = ((r + 1) * cols).min(n);
        let cells: Vec<NodeRef> = (start..end).map(NodeRef::Input).collect();
        row_nodes.push(b.join_run(&cells, Axis::Horizontal));
    }
    b.join_run(&row_nodes, Axis::Vertical);
    b.finish(Strategy::Grid)
}
