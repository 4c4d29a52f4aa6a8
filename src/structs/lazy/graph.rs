//! # Task Graph
//!
//! Symbolic nodes of a lazy computation.
//!
//! Every node is an immutable [`Task`] shared through `Arc`, so building a
//! derived array only allocates the new node. Task names are unique per
//! process and serve as memoisation keys during execution.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::operators::{ArrayFunction, Operator, Reduction, Ufunc};
use crate::structs::chunks::ChunkLayout;

static TASK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh task name with the given prefix, e.g. `add-17`.
pub(crate) fn next_name(prefix: &str) -> String {
    format!("{}-{}", prefix, TASK_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// What a task computes from its inputs.
#[derive(Debug, Clone)]
pub enum TaskOp {
    /// Leaf holding materialised values.
    Source(Arc<Vec64<f64>>),
    /// Leaf filled with one value.
    Fill(f64),
    /// Leaf holding `start + i * step`.
    Arange { start: f64, step: f64 },
    Ufunc(Ufunc),
    Operator(Operator),
    Function(ArrayFunction),
    Reduce { reduction: Reduction, axis: Option<usize> },
    Cumsum { axis: usize },
    Clip { min: Option<f64>, max: Option<f64> },
    Round { decimals: i32 },
    Cast,
    View { from: DType },
    /// Same values under the task's shape: reshape and squeeze.
    Reshape,
    /// Same values under the task's chunk layout.
    Rechunk,
    SwapAxes { a: usize, b: usize },
    Repeat { repeats: usize, axis: Option<usize> },
    TopK { k: i64 },
    Copy,
}

impl TaskOp {
    pub fn name(&self) -> &'static str {
        match self {
            TaskOp::Source(_) => "array",
            TaskOp::Fill(_) => "full",
            TaskOp::Arange { .. } => "arange",
            TaskOp::Ufunc(u) => u.name(),
            TaskOp::Operator(o) => o.name(),
            TaskOp::Function(f) => f.name(),
            TaskOp::Reduce { reduction, .. } => reduction.name(),
            TaskOp::Cumsum { .. } => "cumsum",
            TaskOp::Clip { .. } => "clip",
            TaskOp::Round { .. } => "round",
            TaskOp::Cast => "astype",
            TaskOp::View { .. } => "view",
            TaskOp::Reshape => "reshape",
            TaskOp::Rechunk => "rechunk",
            TaskOp::SwapAxes { .. } => "swapaxes",
            TaskOp::Repeat { .. } => "repeat",
            TaskOp::TopK { .. } => "topk",
            TaskOp::Copy => "copy",
        }
    }
}

/// A task input: another task's output or a scalar.
#[derive(Debug, Clone)]
pub enum TaskInput {
    Task(Arc<Task>),
    Scalar(f64),
}

#[derive(Debug)]
pub struct Task {
    pub(crate) name: String,
    pub(crate) op: TaskOp,
    pub(crate) inputs: Vec<TaskInput>,
    pub(crate) shape: Vec<usize>,
    pub(crate) dtype: DType,
    pub(crate) chunks: ChunkLayout,
}

impl Task {
    pub(crate) fn new(
        op: TaskOp,
        inputs: Vec<TaskInput>,
        shape: Vec<usize>,
        dtype: DType,
        chunks: ChunkLayout,
    ) -> Arc<Task> {
        Arc::new(Task {
            name: next_name(op.name()),
            op,
            inputs,
            shape,
            dtype,
            chunks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn op(&self) -> &TaskOp {
        &self.op
    }

    pub fn inputs(&self) -> &[TaskInput] {
        &self.inputs
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

/// Graph of tasks reachable from one root.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    root: Arc<Task>,
}

impl TaskGraph {
    pub fn new(root: Arc<Task>) -> Self {
        Self { root }
    }

    #[inline]
    pub fn root(&self) -> &Arc<Task> {
        &self.root
    }

    /// Names of every task reachable from the root, dependencies first.
    pub fn keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![(Arc::clone(&self.root), false)];
        while let Some((task, expanded)) = stack.pop() {
            if expanded {
                order.push(task.name.clone());
                continue;
            }
            if !seen.insert(task.name.clone()) {
                continue;
            }
            stack.push((Arc::clone(&task), true));
            for input in task.inputs.iter().rev() {
                if let TaskInput::Task(dep) = input {
                    if !seen.contains(&dep.name) {
                        stack.push((Arc::clone(dep), false));
                    }
                }
            }
        }
        order
    }

    /// Number of distinct tasks in the graph.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Chunk type reported in array representations.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMeta {
    pub chunktype: &'static str,
}

impl Default for ArrayMeta {
    fn default() -> Self {
        Self {
            chunktype: "ndarray",
        }
    }
}

/// The arguments that rebuild a lazy array through `LazyArray::new`.
#[derive(Debug, Clone)]
pub struct LazyArrayArgs {
    pub graph: TaskGraph,
    pub name: String,
    pub chunks: ChunkLayout,
    pub dtype: DType,
    pub meta: ArrayMeta,
    pub shape: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        let a = next_name("add");
        let b = next_name("add");
        assert_ne!(a, b);
        assert!(a.starts_with("add-"));
    }

    #[test]
    fn test_keys_dependency_order() {
        let layout = ChunkLayout::auto(&[2]);
        let leaf = Task::new(TaskOp::Fill(1.0), vec![], vec![2], DType::Float64, layout.clone());
        let sum = Task::new(
            TaskOp::Operator(Operator::Add),
            vec![TaskInput::Task(Arc::clone(&leaf)), TaskInput::Task(Arc::clone(&leaf))],
            vec![2],
            DType::Float64,
            layout,
        );
        let graph = TaskGraph::new(Arc::clone(&sum));
        assert_eq!(graph.keys(), vec![leaf.name().to_string(), sum.name().to_string()]);
        assert_eq!(graph.len(), 2);
    }
}
