//! # **LazyArray Module** - *Chunked Lazy N-dimensional Array*
//!
//! A symbolic array: a task graph plus the metadata that describes its output.
//!
//! ## Overview
//! - Every method builds a new task and returns a new `LazyArray`; nothing is
//!   evaluated until `compute()` (see [`crate::Collection`]).
//! - Shapes, dtypes and chunk layouts are derived eagerly, so shape, axis and
//!   broadcasting errors surface when the operation is built rather than when
//!   the graph runs.
//! - Cloning is cheap: graph nodes are shared through `Arc`.
//!
//! ## Example
//! ```
//! use unitarrow::{ChunkSpec, Collection, LazyArray};
//!
//! let a = LazyArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2], ChunkSpec::Uniform(vec![1, 2])).unwrap();
//! let b = (&a * 2.0).unwrap();
//! assert_eq!(b.compute().unwrap().as_slice(), &[2.0, 4.0, 6.0, 8.0]);
//! ```

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::enums::operators::{ArrayFunction, Operator, Reduction, Ufunc};
use crate::kernels::elementwise::broadcast_shapes;
use crate::kernels::shape_ops::{concat_shape, dot_shape};
use crate::structs::chunks::{ChunkLayout, ChunkSpec, split_axis};
use crate::structs::lazy::graph::{ArrayMeta, LazyArrayArgs, Task, TaskGraph, TaskInput, TaskOp};
use crate::traits::print::format_shape;
use crate::traits::type_unions::Numeric;

#[derive(Debug, Clone)]
pub struct LazyArray {
    graph: TaskGraph,
    name: String,
    chunks: ChunkLayout,
    dtype: DType,
    meta: ArrayMeta,
    shape: Vec<usize>,
}

/// An operand of an engine operation.
#[derive(Debug, Clone)]
pub enum Input {
    Array(LazyArray),
    Scalar(f64),
}

impl Input {
    fn as_array(&self) -> Option<&LazyArray> {
        match self {
            Input::Array(a) => Some(a),
            Input::Scalar(_) => None,
        }
    }

    fn to_task_input(&self) -> TaskInput {
        match self {
            Input::Array(a) => TaskInput::Task(Arc::clone(a.graph.root())),
            Input::Scalar(v) => TaskInput::Scalar(*v),
        }
    }
}

impl From<LazyArray> for Input {
    fn from(a: LazyArray) -> Self {
        Input::Array(a)
    }
}

impl From<&LazyArray> for Input {
    fn from(a: &LazyArray) -> Self {
        Input::Array(a.clone())
    }
}

impl From<f64> for Input {
    fn from(v: f64) -> Self {
        Input::Scalar(v)
    }
}

impl LazyArray {
    /// Builds an array from its graph and metadata.
    ///
    /// # Errors
    /// - `ChunkLayoutError` when `chunks` does not tile `shape`.
    /// - `GraphError` when the graph root is not the task `name` describing
    ///   `shape` and `dtype`.
    pub fn new(
        graph: TaskGraph,
        name: impl Into<String>,
        chunks: ChunkLayout,
        dtype: DType,
        meta: ArrayMeta,
        shape: Vec<usize>,
    ) -> Result<Self, UnitArrowError> {
        let name = name.into();
        chunks.validate(&shape)?;
        let root = graph.root();
        if root.name() != name {
            return Err(UnitArrowError::GraphError {
                message: format!("graph root is {}, not {}", root.name(), name),
            });
        }
        if root.shape() != shape.as_slice() || root.dtype() != dtype {
            return Err(UnitArrowError::GraphError {
                message: format!(
                    "task {} has shape {:?} and dtype {}, array declares {:?} and {}",
                    name,
                    root.shape(),
                    root.dtype(),
                    shape,
                    dtype
                ),
            });
        }
        Ok(Self {
            graph,
            name,
            chunks,
            dtype,
            meta,
            shape,
        })
    }

    /// The construction arguments that rebuild this array.
    pub fn reduce(&self) -> LazyArrayArgs {
        LazyArrayArgs {
            graph: self.graph.clone(),
            name: self.name.clone(),
            chunks: self.chunks.clone(),
            dtype: self.dtype,
            meta: self.meta.clone(),
            shape: self.shape.clone(),
        }
    }

    pub fn from_args(args: LazyArrayArgs) -> Result<Self, UnitArrowError> {
        Self::new(args.graph, args.name, args.chunks, args.dtype, args.meta, args.shape)
    }

    fn from_task(task: Arc<Task>) -> Self {
        Self {
            name: task.name().to_string(),
            chunks: task.chunks.clone(),
            dtype: task.dtype(),
            shape: task.shape().to_vec(),
            graph: TaskGraph::new(task),
            meta: ArrayMeta::default(),
        }
    }

    fn leaf(op: TaskOp, shape: &[usize], chunks: &ChunkSpec, dtype: DType) -> Result<Self, UnitArrowError> {
        let layout = ChunkLayout::from_spec(chunks, shape)?;
        Ok(Self::from_task(Task::new(op, vec![], shape.to_vec(), dtype, layout)))
    }

    fn derive(&self, op: TaskOp, shape: Vec<usize>, dtype: DType, chunks: ChunkLayout) -> Self {
        let inputs = vec![TaskInput::Task(Arc::clone(self.graph.root()))];
        Self::from_task(Task::new(op, inputs, shape, dtype, chunks))
    }

    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Array over `data` in row-major order. The dtype follows `T`.
    pub fn from_vec<T: Numeric>(data: Vec<T>, shape: &[usize], chunks: ChunkSpec) -> Result<Self, UnitArrowError> {
        Self::from_slice(&data, shape, chunks)
    }

    pub fn from_slice<T: Numeric>(data: &[T], shape: &[usize], chunks: ChunkSpec) -> Result<Self, UnitArrowError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(UnitArrowError::ShapeError {
                message: format!(
                    "{} values cannot be arranged into shape {:?}",
                    data.len(),
                    shape
                ),
            });
        }
        let mut values = Vec64::with_capacity(data.len());
        for v in data {
            values.push(v.to_carried());
        }
        Self::leaf(TaskOp::Source(Arc::new(values)), shape, &chunks, T::DTYPE)
    }

    pub fn full(shape: &[usize], value: f64, chunks: ChunkSpec, dtype: DType) -> Result<Self, UnitArrowError> {
        Self::leaf(TaskOp::Fill(value), shape, &chunks, dtype)
    }

    pub fn ones(shape: &[usize], chunks: ChunkSpec, dtype: DType) -> Result<Self, UnitArrowError> {
        Self::full(shape, 1.0, chunks, dtype)
    }

    pub fn zeros(shape: &[usize], chunks: ChunkSpec, dtype: DType) -> Result<Self, UnitArrowError> {
        Self::full(shape, 0.0, chunks, dtype)
    }

    /// Evenly spaced values in `[start, stop)`.
    pub fn arange(start: f64, stop: f64, step: f64, chunks: ChunkSpec, dtype: DType) -> Result<Self, UnitArrowError> {
        if step == 0.0 || !step.is_finite() {
            return Err(UnitArrowError::ShapeError {
                message: format!("arange step must be finite and non-zero, got {}", step),
            });
        }
        let len = ((stop - start) / step).ceil().max(0.0) as usize;
        Self::leaf(TaskOp::Arange { start, step }, &[len], &chunks, dtype)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[inline]
    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn chunks(&self) -> &ChunkLayout {
        &self.chunks
    }

    pub fn chunksize(&self) -> Vec<usize> {
        self.chunks.chunksize()
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    #[inline]
    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    fn check_axis(&self, axis: usize) -> Result<(), UnitArrowError> {
        if axis >= self.ndim() {
            return Err(UnitArrowError::AxisError {
                axis,
                ndim: self.ndim(),
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Elementwise hooks
    // ---------------------------------------------------------------------

    /// Applies `ufunc` elementwise, broadcasting the inputs.
    pub fn elemwise(ufunc: Ufunc, inputs: &[Input]) -> Result<Self, UnitArrowError> {
        if inputs.len() != ufunc.arity() {
            return Err(UnitArrowError::GraphError {
                message: format!(
                    "{} takes {} operands, got {}",
                    ufunc.name(),
                    ufunc.arity(),
                    inputs.len()
                ),
            });
        }
        let promoted = promote_inputs(inputs)?;
        let dtype = if ufunc.is_predicate() {
            DType::Bool
        } else if produces_float(ufunc) {
            promoted.to_float()
        } else {
            promoted
        };
        Self::broadcast_task(TaskOp::Ufunc(ufunc), inputs, dtype)
    }

    /// Applies a binary arithmetic operator, broadcasting the operands.
    pub fn binary(op: Operator, lhs: &Input, rhs: &Input) -> Result<Self, UnitArrowError> {
        let inputs = [lhs.clone(), rhs.clone()];
        if op.is_unary() {
            return Err(UnitArrowError::GraphError {
                message: format!("{} is not a binary operator", op.name()),
            });
        }
        let promoted = promote_inputs(&inputs)?;
        let dtype = match op {
            Operator::Divide => promoted.to_float(),
            _ => promoted,
        };
        Self::broadcast_task(TaskOp::Operator(op), &inputs, dtype)
    }

    fn broadcast_task(op: TaskOp, inputs: &[Input], dtype: DType) -> Result<Self, UnitArrowError> {
        let mut shape: Vec<usize> = Vec::new();
        for a in inputs.iter().filter_map(Input::as_array) {
            shape = broadcast_shapes(&shape, a.shape())?;
        }
        // Keep the layout of an operand that already has the output shape.
        let chunks = inputs
            .iter()
            .filter_map(Input::as_array)
            .find(|a| a.shape() == shape.as_slice())
            .map(|a| a.chunks.clone())
            .unwrap_or_else(|| ChunkLayout::auto(&shape));
        let task_inputs = inputs.iter().map(Input::to_task_input).collect();
        Ok(Self::from_task(Task::new(op, task_inputs, shape, dtype, chunks)))
    }

    pub fn abs(&self) -> Self {
        self.derive(TaskOp::Operator(Operator::Abs), self.shape.clone(), self.dtype, self.chunks.clone())
    }

    pub fn neg(&self) -> Self {
        self.derive(TaskOp::Operator(Operator::Neg), self.shape.clone(), self.dtype, self.chunks.clone())
    }

    pub fn pow(&self, exponent: impl Into<Input>) -> Result<Self, UnitArrowError> {
        Self::binary(Operator::Power, &Input::Array(self.clone()), &exponent.into())
    }

    /// Multiplies every value by `factor`, as used by unit conversions.
    pub fn scale(&self, factor: f64) -> Result<Self, UnitArrowError> {
        Self::binary(Operator::Multiply, &Input::Array(self.clone()), &Input::Scalar(factor))
    }

    // ---------------------------------------------------------------------
    // Array functions
    // ---------------------------------------------------------------------

    /// Applies a function that sees whole operands rather than single elements.
    pub fn array_function(func: ArrayFunction, inputs: &[Input]) -> Result<Self, UnitArrowError> {
        let arrays: Vec<&LazyArray> = inputs.iter().filter_map(Input::as_array).collect();
        if arrays.len() != inputs.len() || arrays.is_empty() {
            return Err(UnitArrowError::ShapeError {
                message: format!("{} requires array operands", func.name()),
            });
        }
        let first = arrays[0];
        match func {
            ArrayFunction::Concatenate { axis } => {
                let shape = concat_shape(arrays.iter().map(|a| a.shape()), axis)?;
                let dtype = arrays
                    .iter()
                    .skip(1)
                    .fold(first.dtype, |d, a| d.promote(a.dtype));
                let mut blocks: Vec<usize> = arrays
                    .iter()
                    .flat_map(|a| a.chunks.chunks()[axis].iter().copied())
                    .filter(|&b| b > 0)
                    .collect();
                if blocks.is_empty() {
                    blocks.push(0);
                }
                let chunks = first.chunks.with_axis(axis, blocks);
                let task_inputs = inputs.iter().map(Input::to_task_input).collect();
                Ok(Self::from_task(Task::new(TaskOp::Function(func), task_inputs, shape, dtype, chunks)))
            }
            ArrayFunction::Dot => {
                let [a, b] = arrays.as_slice() else {
                    return Err(UnitArrowError::ShapeError {
                        message: format!("dot takes 2 operands, got {}", arrays.len()),
                    });
                };
                let shape = dot_shape(a.shape(), b.shape())?;
                let chunks = ChunkLayout::auto(&shape);
                let task_inputs = inputs.iter().map(Input::to_task_input).collect();
                let dtype = a.dtype.promote(b.dtype);
                Ok(Self::from_task(Task::new(TaskOp::Function(func), task_inputs, shape, dtype, chunks)))
            }
            ArrayFunction::Var { axis, .. } | ArrayFunction::Median { axis } => {
                let (shape, chunks) = first.reduced_layout(axis)?;
                Ok(first.derive(TaskOp::Function(func), shape, first.dtype.to_float(), chunks))
            }
            ArrayFunction::Ptp { axis } => {
                let (shape, chunks) = first.reduced_layout(axis)?;
                Ok(first.derive(TaskOp::Function(func), shape, first.dtype, chunks))
            }
            ArrayFunction::Diff { axis } => {
                first.check_axis(axis)?;
                let mut shape = first.shape.clone();
                shape[axis] = shape[axis].saturating_sub(1);
                let chunks = first.chunks.with_axis(axis, shrink_last(&first.chunks.chunks()[axis]));
                Ok(first.derive(TaskOp::Function(func), shape, first.dtype, chunks))
            }
        }
    }

    fn reduced_layout(&self, axis: Option<usize>) -> Result<(Vec<usize>, ChunkLayout), UnitArrowError> {
        match axis {
            None => Ok((Vec::new(), ChunkLayout::auto(&[]))),
            Some(axis) => {
                self.check_axis(axis)?;
                let mut shape = self.shape.clone();
                shape.remove(axis);
                Ok((shape, self.chunks.drop_axis(axis)))
            }
        }
    }

    fn reduction(&self, reduction: Reduction, axis: Option<usize>, dtype: DType) -> Result<Self, UnitArrowError> {
        let (shape, chunks) = self.reduced_layout(axis)?;
        Ok(self.derive(TaskOp::Reduce { reduction, axis }, shape, dtype, chunks))
    }

    // ---------------------------------------------------------------------
    // Simple operations
    // ---------------------------------------------------------------------

    pub fn min(&self, axis: Option<usize>) -> Result<Self, UnitArrowError> {
        self.reduction(Reduction::Min, axis, self.dtype)
    }

    pub fn max(&self, axis: Option<usize>) -> Result<Self, UnitArrowError> {
        self.reduction(Reduction::Max, axis, self.dtype)
    }

    pub fn sum(&self, axis: Option<usize>) -> Result<Self, UnitArrowError> {
        self.reduction(Reduction::Sum, axis, accumulator(self.dtype))
    }

    pub fn mean(&self, axis: Option<usize>) -> Result<Self, UnitArrowError> {
        self.reduction(Reduction::Mean, axis, self.dtype.to_float())
    }

    pub fn std(&self, axis: Option<usize>, ddof: usize) -> Result<Self, UnitArrowError> {
        self.reduction(Reduction::Std { ddof }, axis, self.dtype.to_float())
    }

    pub fn cumsum(&self, axis: usize) -> Result<Self, UnitArrowError> {
        self.check_axis(axis)?;
        Ok(self.derive(
            TaskOp::Cumsum { axis },
            self.shape.clone(),
            accumulator(self.dtype),
            self.chunks.clone(),
        ))
    }

    /// Removes `axis`, which must have length 1, or every length 1 axis when `None`.
    pub fn squeeze(&self, axis: Option<usize>) -> Result<Self, UnitArrowError> {
        let drop: Vec<usize> = match axis {
            Some(axis) => {
                self.check_axis(axis)?;
                if self.shape[axis] != 1 {
                    return Err(UnitArrowError::ShapeError {
                        message: format!(
                            "cannot squeeze axis {} of length {}",
                            axis, self.shape[axis]
                        ),
                    });
                }
                vec![axis]
            }
            None => (0..self.ndim()).filter(|&k| self.shape[k] == 1).collect(),
        };
        let mut shape = Vec::with_capacity(self.ndim());
        let mut chunks = Vec::with_capacity(self.ndim());
        for (k, blocks) in self.chunks.chunks().iter().enumerate() {
            if !drop.contains(&k) {
                shape.push(self.shape[k]);
                chunks.push(blocks.clone());
            }
        }
        let chunks = ChunkLayout::new(chunks, &shape)?;
        Ok(self.derive(TaskOp::Reshape, shape, self.dtype, chunks))
    }

    pub fn rechunk(&self, chunks: ChunkSpec) -> Result<Self, UnitArrowError> {
        let layout = ChunkLayout::from_spec(&chunks, &self.shape)?;
        Ok(self.derive(TaskOp::Rechunk, self.shape.clone(), self.dtype, layout))
    }

    /// Limits values to `[min, max]`. A missing bound leaves that side open.
    pub fn clip(&self, min: Option<f64>, max: Option<f64>) -> Result<Self, UnitArrowError> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(UnitArrowError::ShapeError {
                    message: format!("clip bounds are reversed: {} > {}", lo, hi),
                });
            }
        }
        Ok(self.derive(TaskOp::Clip { min, max }, self.shape.clone(), self.dtype, self.chunks.clone()))
    }

    /// Reinterprets the element bits as `dtype`, which must have the same item size.
    pub fn view(&self, dtype: DType) -> Result<Self, UnitArrowError> {
        self.dtype.reinterpret(dtype, 0.0)?;
        Ok(self.derive(TaskOp::View { from: self.dtype }, self.shape.clone(), dtype, self.chunks.clone()))
    }

    pub fn swapaxes(&self, a: usize, b: usize) -> Result<Self, UnitArrowError> {
        self.check_axis(a)?;
        self.check_axis(b)?;
        let mut shape = self.shape.clone();
        shape.swap(a, b);
        Ok(self.derive(TaskOp::SwapAxes { a, b }, shape, self.dtype, self.chunks.swap_axes(a, b)))
    }

    pub fn round(&self, decimals: i32) -> Result<Self, UnitArrowError> {
        Ok(self.derive(TaskOp::Round { decimals }, self.shape.clone(), self.dtype, self.chunks.clone()))
    }

    /// Shallow copy sharing the same graph.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy backed by a task of its own.
    pub fn deep_copy(&self) -> Self {
        self.derive(TaskOp::Copy, self.shape.clone(), self.dtype, self.chunks.clone())
    }

    pub fn repeat(&self, repeats: usize, axis: Option<usize>) -> Result<Self, UnitArrowError> {
        let (shape, chunks) = match axis {
            Some(axis) => {
                self.check_axis(axis)?;
                let mut shape = self.shape.clone();
                shape[axis] *= repeats;
                let blocks = if shape[axis] == 0 {
                    vec![0]
                } else {
                    self.chunks.chunks()[axis].iter().map(|b| b * repeats).collect()
                };
                (shape, self.chunks.with_axis(axis, blocks))
            }
            None => {
                let shape = vec![self.size() * repeats];
                let chunks = ChunkLayout::auto(&shape);
                (shape, chunks)
            }
        };
        Ok(self.derive(TaskOp::Repeat { repeats, axis }, shape, self.dtype, chunks))
    }

    pub fn astype(&self, dtype: DType) -> Result<Self, UnitArrowError> {
        Ok(self.derive(TaskOp::Cast, self.shape.clone(), dtype, self.chunks.clone()))
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<Self, UnitArrowError> {
        let size: usize = shape.iter().product();
        if size != self.size() {
            return Err(UnitArrowError::ShapeError {
                message: format!(
                    "cannot reshape array of size {} into shape {:?}",
                    self.size(),
                    shape
                ),
            });
        }
        let chunks = if shape == self.shape.as_slice() {
            self.chunks.clone()
        } else {
            ChunkLayout::auto(shape)
        };
        Ok(self.derive(TaskOp::Reshape, shape.to_vec(), self.dtype, chunks))
    }

    /// The `k` largest values along the last axis, or the `|k|` smallest when `k < 0`.
    pub fn topk(&self, k: i64) -> Result<Self, UnitArrowError> {
        let Some(&n) = self.shape.last() else {
            return Err(UnitArrowError::ShapeError {
                message: "topk requires at least one dimension".into(),
            });
        };
        let take = k.unsigned_abs() as usize;
        if take > n {
            return Err(UnitArrowError::ShapeError {
                message: format!("topk of {} values along an axis of length {}", take, n),
            });
        }
        let last = self.ndim() - 1;
        let mut shape = self.shape.clone();
        shape[last] = take;
        let chunks = self.chunks.with_axis(last, split_axis(take, take));
        Ok(self.derive(TaskOp::TopK { k }, shape, self.dtype, chunks))
    }
}

/// Ufuncs whose results are floating point for any input.
fn produces_float(ufunc: Ufunc) -> bool {
    use Ufunc::*;
    matches!(
        ufunc,
        Sin | Cos
            | Tan
            | Arcsin
            | Arccos
            | Arctan
            | Sqrt
            | Cbrt
            | Reciprocal
            | Exp
            | Expm1
            | Log
            | Log2
            | Log10
            | Log1p
            | Hypot
            | Arctan2
    )
}

/// Result dtype of sums over `dtype`.
fn accumulator(dtype: DType) -> DType {
    match dtype {
        DType::Bool | DType::Int32 => DType::Int64,
        other => other,
    }
}

fn promote_inputs(inputs: &[Input]) -> Result<DType, UnitArrowError> {
    let mut arrays = inputs.iter().filter_map(Input::as_array);
    let first = arrays.next().ok_or_else(|| UnitArrowError::GraphError {
        message: "operation needs at least one array operand".into(),
    })?;
    let dtype = arrays.fold(first.dtype, |d, a| d.promote(a.dtype));
    if inputs.iter().any(|i| matches!(i, Input::Scalar(_))) {
        Ok(dtype.promote_scalar())
    } else {
        Ok(dtype)
    }
}

/// Blocks of an axis after its length shrinks by one.
fn shrink_last(blocks: &[usize]) -> Vec<usize> {
    let mut out = blocks.to_vec();
    if let Some(last) = out.last_mut() {
        *last = last.saturating_sub(1);
    }
    if out.len() > 1 && out.last() == Some(&0) {
        out.pop();
    }
    out
}

impl Display for LazyArray {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lazy_array<{}, shape={}, dtype={}, chunksize={}, chunktype={}>",
            self.name,
            format_shape(&self.shape),
            self.dtype,
            format_shape(&self.chunksize()),
            self.meta.chunktype
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::collection::Collection;

    fn grid() -> LazyArray {
        LazyArray::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2], ChunkSpec::Uniform(vec![1, 2])).unwrap()
    }

    #[test]
    fn test_new_validates() {
        let a = grid();
        let args = a.reduce();
        let rebuilt = LazyArray::from_args(args.clone()).unwrap();
        assert_eq!(rebuilt.name(), a.name());

        let bad_chunks = ChunkLayout::auto(&[4]);
        assert!(matches!(
            LazyArray::new(args.graph.clone(), args.name.clone(), bad_chunks, args.dtype, ArrayMeta::default(), vec![2, 2]),
            Err(UnitArrowError::ChunkLayoutError { .. })
        ));
        assert!(matches!(
            LazyArray::new(args.graph, "other", args.chunks, args.dtype, args.meta, args.shape),
            Err(UnitArrowError::GraphError { .. })
        ));
    }

    #[test]
    fn test_constructors() {
        let a = LazyArray::arange(0.0, 5.0, 2.0, ChunkSpec::Auto, DType::Int64).unwrap();
        assert_eq!(a.shape(), &[3]);
        assert_eq!(a.compute().unwrap().as_slice(), &[0.0, 2.0, 4.0]);
        let z = LazyArray::zeros(&[2, 3], ChunkSpec::Auto, DType::Float32).unwrap();
        assert_eq!(z.compute().unwrap().as_slice(), &[0.0; 6]);
        assert!(LazyArray::from_vec(vec![1i32, 2, 3], &[2, 2], ChunkSpec::Auto).is_err());
        assert_eq!(
            LazyArray::from_vec(vec![1i32, 2], &[2], ChunkSpec::Auto).unwrap().dtype(),
            DType::Int32
        );
    }

    #[test]
    fn test_elemwise_and_binary() {
        let a = grid();
        let s = LazyArray::elemwise(Ufunc::Sqrt, &[Input::from(&a)]).unwrap();
        assert_eq!(s.dtype(), DType::Float64);
        assert_eq!(s.chunks(), a.chunks());
        let lt = LazyArray::elemwise(Ufunc::Less, &[Input::from(&a), Input::Scalar(2.5)]).unwrap();
        assert_eq!(lt.dtype(), DType::Bool);
        assert_eq!(lt.compute().unwrap().as_slice(), &[1.0, 1.0, 0.0, 0.0]);
        let row = LazyArray::from_vec(vec![10.0, 20.0], &[2], ChunkSpec::Auto).unwrap();
        let sum = LazyArray::binary(Operator::Add, &Input::from(&a), &Input::from(&row)).unwrap();
        assert_eq!(sum.compute().unwrap().as_slice(), &[11.0, 22.0, 13.0, 24.0]);
        let bad = LazyArray::from_vec(vec![1.0, 2.0, 3.0], &[3], ChunkSpec::Auto).unwrap();
        assert!(matches!(
            LazyArray::binary(Operator::Add, &Input::from(&a), &Input::from(&bad)),
            Err(UnitArrowError::BroadcastError { .. })
        ));
    }

    #[test]
    fn test_reductions_and_shape_ops() {
        let a = grid();
        assert_eq!(a.sum(None).unwrap().compute().unwrap().item().unwrap(), 10.0);
        let m = a.mean(Some(0)).unwrap();
        assert_eq!(m.shape(), &[2]);
        assert_eq!(m.chunks().chunks(), &[vec![2]]);
        assert_eq!(m.compute().unwrap().as_slice(), &[2.0, 3.0]);
        assert_eq!(a.swapaxes(0, 1).unwrap().compute().unwrap().as_slice(), &[1.0, 3.0, 2.0, 4.0]);
        assert_eq!(a.reshape(&[4]).unwrap().shape(), &[4]);
        assert!(a.reshape(&[3]).is_err());
        let col = a.reshape(&[4, 1]).unwrap().squeeze(None).unwrap();
        assert_eq!(col.shape(), &[4]);
        assert!(a.squeeze(Some(0)).is_err());
        assert_eq!(a.clip(Some(2.0), Some(3.0)).unwrap().compute().unwrap().as_slice(), &[2.0, 2.0, 3.0, 3.0]);
        assert_eq!(a.topk(1).unwrap().compute().unwrap().as_slice(), &[2.0, 4.0]);
        assert_eq!(a.cumsum(1).unwrap().compute().unwrap().as_slice(), &[1.0, 3.0, 3.0, 7.0]);
        assert!(a.sum(Some(3)).is_err());
    }

    #[test]
    fn test_casts() {
        let a = grid();
        let ints = a.astype(DType::Int64).unwrap();
        assert_eq!(ints.dtype(), DType::Int64);
        let bits = a.view(DType::Int64).unwrap().view(DType::Float64).unwrap();
        assert_eq!(bits.compute().unwrap().as_slice(), &[1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(a.view(DType::Int32), Err(UnitArrowError::TypeError { .. })));
        let r = LazyArray::from_vec(vec![1.25, 2.5], &[2], ChunkSpec::Auto).unwrap();
        assert_eq!(r.round(1).unwrap().compute().unwrap().as_slice(), &[1.2, 2.5]);
    }

    #[test]
    fn test_array_functions() {
        let a = grid();
        let cat = LazyArray::array_function(ArrayFunction::Concatenate { axis: 0 }, &[Input::from(&a), Input::from(&a)]).unwrap();
        assert_eq!(cat.shape(), &[4, 2]);
        assert_eq!(cat.chunks().chunks()[0], vec![1, 1, 1, 1]);
        let dot = LazyArray::array_function(ArrayFunction::Dot, &[Input::from(&a), Input::from(&a)]).unwrap();
        assert_eq!(dot.compute().unwrap().as_slice(), &[7.0, 10.0, 15.0, 22.0]);
        let diff = LazyArray::array_function(ArrayFunction::Diff { axis: 0 }, &[Input::from(&a)]).unwrap();
        assert_eq!(diff.shape(), &[1, 2]);
        assert_eq!(diff.chunks().chunks()[0], vec![1]);
        assert!(LazyArray::array_function(ArrayFunction::Dot, &[Input::from(&a), Input::Scalar(1.0)]).is_err());
    }

    #[test]
    fn test_shared_subgraph_and_display() {
        let a = grid();
        let b = (&a + &a).unwrap();
        assert_eq!(b.graph().len(), 2);
        let text = a.to_string();
        assert!(text.starts_with("lazy_array<array-"));
        assert!(text.ends_with("shape=(2, 2), dtype=float64, chunksize=(1, 2), chunktype=ndarray>"));
    }
}
