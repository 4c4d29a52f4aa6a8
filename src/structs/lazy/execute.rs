//! # Executor
//!
//! Evaluates a task graph depth first, memoising every task by name so
//! shared subgraphs run once.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::UnitArrowError;
use crate::enums::operators::{ArrayFunction, Reduction};
use crate::kernels::elementwise::{binary_map, fill_chunked, row_len, unary_map};
use crate::kernels::{reduce, shape_ops};
use crate::structs::lazy::graph::{Task, TaskGraph, TaskInput, TaskOp};
use crate::structs::nd_array::NdArray;

/// Runs `graph` and returns the root's value.
pub fn execute(graph: &TaskGraph) -> Result<NdArray, UnitArrowError> {
    let mut memo: HashMap<String, Arc<NdArray>> = HashMap::new();
    let out = evaluate(graph.root(), &mut memo)?;
    drop(memo);
    Ok(Arc::try_unwrap(out).unwrap_or_else(|shared| (*shared).clone()))
}

fn evaluate(
    task: &Arc<Task>,
    memo: &mut HashMap<String, Arc<NdArray>>,
) -> Result<Arc<NdArray>, UnitArrowError> {
    if let Some(done) = memo.get(&task.name) {
        return Ok(Arc::clone(done));
    }
    let mut args = Vec::with_capacity(task.inputs.len());
    for input in &task.inputs {
        args.push(match input {
            TaskInput::Task(dep) => evaluate(dep, memo)?,
            TaskInput::Scalar(v) => Arc::new(NdArray::scalar(*v, DType::Float64)),
        });
    }
    debug!(task = %task.name, op = task.op.name(), shape = ?task.shape, dtype = %task.dtype, "evaluating task");
    let out = Arc::new(run(task, &args)?);
    if out.shape() != task.shape.as_slice() {
        return Err(UnitArrowError::GraphError {
            message: format!(
                "task {} produced shape {:?}, expected {:?}",
                task.name,
                out.shape(),
                task.shape
            ),
        });
    }
    memo.insert(task.name.clone(), Arc::clone(&out));
    Ok(out)
}

fn run(task: &Task, args: &[Arc<NdArray>]) -> Result<NdArray, UnitArrowError> {
    let dtype = task.dtype;
    let blocks = task.chunks.row_blocks();
    let len: usize = task.shape.iter().product();
    let shape = task.shape.clone();
    let rows = row_len(&shape);
    match &task.op {
        TaskOp::Source(values) => {
            let data = fill_chunked(len, &blocks, rows, |i| dtype.cast(values[i]));
            Ok(NdArray::from_parts(data, shape, dtype))
        }
        TaskOp::Fill(v) => {
            let v = dtype.cast(*v);
            Ok(NdArray::from_parts(fill_chunked(len, &blocks, rows, |_| v), shape, dtype))
        }
        TaskOp::Arange { start, step } => {
            let (start, step) = (*start, *step);
            let data = fill_chunked(len, &blocks, rows, |i| dtype.cast(start + i as f64 * step));
            Ok(NdArray::from_parts(data, shape, dtype))
        }
        TaskOp::Ufunc(ufunc) => match ufunc.arity() {
            1 => Ok(unary_map(arg(args, 0)?, dtype, &blocks, |x| ufunc.apply_unary(x))),
            _ => binary_map(arg(args, 0)?, arg(args, 1)?, dtype, &blocks, |a, b| {
                ufunc.apply_binary(a, b)
            }),
        },
        TaskOp::Operator(op) => {
            if op.is_unary() {
                Ok(unary_map(arg(args, 0)?, dtype, &blocks, |x| op.apply_binary(x, 0.0)))
            } else {
                binary_map(arg(args, 0)?, arg(args, 1)?, dtype, &blocks, |a, b| {
                    op.apply_binary(a, b)
                })
            }
        }
        TaskOp::Function(func) => run_function(*func, args, dtype),
        TaskOp::Reduce { reduction, axis } => reduce::reduce(arg(args, 0)?, *reduction, *axis, dtype),
        TaskOp::Cumsum { axis } => reduce::cumsum(arg(args, 0)?, *axis, dtype),
        TaskOp::Clip { min, max } => {
            let (lo, hi) = (min.unwrap_or(f64::NEG_INFINITY), max.unwrap_or(f64::INFINITY));
            Ok(unary_map(arg(args, 0)?, dtype, &blocks, |x| {
                if x.is_nan() { x } else { x.max(lo).min(hi) }
            }))
        }
        TaskOp::Round { decimals } => {
            let d = *decimals;
            Ok(unary_map(arg(args, 0)?, dtype, &blocks, |x| shape_ops::round_to(x, d)))
        }
        TaskOp::Cast | TaskOp::Copy | TaskOp::Rechunk => {
            Ok(unary_map(arg(args, 0)?, dtype, &blocks, |x| x))
        }
        TaskOp::View { from } => {
            let src = arg(args, 0)?;
            let mut data = Vec64::with_capacity(src.len());
            for v in src.as_slice() {
                data.push(from.reinterpret(dtype, *v)?);
            }
            Ok(NdArray::from_parts(data, shape, dtype))
        }
        TaskOp::Reshape => Ok(arg(args, 0)?.clone().with_shape(shape)),
        TaskOp::SwapAxes { a, b } => shape_ops::swapaxes(arg(args, 0)?, *a, *b),
        TaskOp::Repeat { repeats, axis } => shape_ops::repeat(arg(args, 0)?, *repeats, *axis),
        TaskOp::TopK { k } => reduce::topk(arg(args, 0)?, *k),
    }
}

fn run_function(
    func: ArrayFunction,
    args: &[Arc<NdArray>],
    dtype: DType,
) -> Result<NdArray, UnitArrowError> {
    match func {
        ArrayFunction::Concatenate { axis } => {
            let refs: Vec<&NdArray> = args.iter().map(|a| a.as_ref()).collect();
            shape_ops::concatenate(&refs, axis, dtype)
        }
        ArrayFunction::Dot => shape_ops::dot(arg(args, 0)?, arg(args, 1)?, dtype),
        ArrayFunction::Var { axis, ddof } => {
            reduce::reduce(arg(args, 0)?, Reduction::Var { ddof }, axis, dtype)
        }
        ArrayFunction::Median { axis } => reduce::reduce(arg(args, 0)?, Reduction::Median, axis, dtype),
        ArrayFunction::Ptp { axis } => reduce::reduce(arg(args, 0)?, Reduction::Ptp, axis, dtype),
        ArrayFunction::Diff { axis } => shape_ops::diff(arg(args, 0)?, axis),
    }
}

#[inline]
fn arg(args: &[Arc<NdArray>], idx: usize) -> Result<&NdArray, UnitArrowError> {
    args.get(idx)
        .map(|a| a.as_ref())
        .ok_or_else(|| UnitArrowError::GraphError {
            message: format!("task is missing input {}", idx),
        })
}
