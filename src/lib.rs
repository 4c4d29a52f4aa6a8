//! # unitarrow
//!
//! Unit-aware chunked lazy arrays.
//!
//! A [`UnitLazyArray`] couples a [`LazyArray`] task graph with a magnitude 1.0
//! [`Quantity`] sidecar. Elementwise ufuncs, array functions, operators and
//! unit conversions derive the unit of their result up front from the
//! sidecars, and the unit is attached to the data only when the graph is
//! computed through [`Collection::compute`].
//!
//! ## Layout
//! - `units`: dimensions, units, registry, unit systems, quantities and the
//!   rules combining units across operations.
//! - `structs::lazy`: the chunked task graph, its executor and [`LazyArray`].
//! - `kernels`: per-chunk numerical kernels, operand sanitation and unit
//!   resolution, and the arithmetic operator impls.
//! - `traits`: printing, numeric type unions and materialisation.
//!
//! ## Features
//! - `parallel_proc`: evaluates elementwise chunks in parallel with Rayon.

pub mod enums {
    pub mod dtype;
    pub mod error;
    pub mod intercept;
    pub mod operators;
}

pub mod units {
    pub mod combine;
    pub mod dimensions;
    pub mod format;
    pub mod parse;
    pub mod quantity;
    pub mod registry;
    pub mod spec;
    pub mod system;
    pub mod unit;
    pub mod unit_array;
}

pub mod structs {
    pub mod lazy {
        pub mod execute;
        pub mod graph;
        pub mod lazy_array;
    }
    pub mod chunks;
    pub mod nd_array;
    pub mod unit_lazy_array;
}

pub mod kernels {
    pub mod arithmetic {
        pub mod types;
    }
    pub mod routing {
        pub mod resolve;
        pub mod sanitize;
    }
    pub mod elementwise;
    pub mod reduce;
    pub mod shape_ops;
}

pub mod traits {
    pub mod collection;
    pub mod print;
    pub mod type_unions;
}

pub use enums::dtype::DType;
pub use enums::error::UnitArrowError;
pub use enums::intercept::{ConversionOp, SimpleOp};
pub use enums::operators::{ArrayFunction, Operation, Operator, Reduction, Ufunc};

pub use units::combine::{Resolved, UnitToken};
pub use units::dimensions::{BaseDimension, Dimensions};
pub use units::quantity::Quantity;
pub use units::registry::UnitRegistry;
pub use units::spec::{UnitInput, UnitSpec};
pub use units::system::UnitSystem;
pub use units::unit::Unit;
pub use units::unit_array::UnitArray;

pub use structs::chunks::{ChunkLayout, ChunkSpec, DEFAULT_CHUNK_SIZE};
pub use structs::lazy::execute::execute;
pub use structs::lazy::graph::{ArrayMeta, LazyArrayArgs, TaskGraph};
pub use structs::lazy::lazy_array::{Input, LazyArray};
pub use structs::nd_array::NdArray;
pub use structs::unit_lazy_array::{LazyResult, UnitLazyArray};

pub use kernels::routing::resolve::resolve;
pub use kernels::routing::sanitize::{Operand, sanitize};

pub use traits::collection::{Collection, Finalized};
pub use traits::print::Print;
pub use traits::type_unions::{Float, Numeric};
