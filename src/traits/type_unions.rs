use std::fmt::Debug;

use num_traits::{Float as NumFloat, Num, NumCast, ToPrimitive};

use crate::enums::dtype::DType;

/// Trait for types valid as float elements of a lazy array.
///
/// Extends and constrains the *num-traits* `Float` implementation to fit the crate's type universe.
pub trait Float: NumFloat + Copy + Default + ToPrimitive + PartialEq + 'static {}
impl Float for f32 {}
impl Float for f64 {}

/// Trait for element types a lazy array can be built from.
///
/// Useful when specifying `my_fn::<T: Numeric>() {}`.
///
/// Extends and constrains the *num-traits* `Num` implementation to fit the crate's type universe.
/// `DTYPE` is the dtype the array declares when built from a slice of `Self`.
pub trait Numeric:
    Num + NumCast + Copy + Default + ToPrimitive + PartialEq + Debug + Send + Sync + 'static
{
    const DTYPE: DType;

    /// Widens into the `f64` the engine carries.
    #[inline]
    fn to_carried(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl Numeric for f32 {
    const DTYPE: DType = DType::Float32;
}
impl Numeric for f64 {
    const DTYPE: DType = DType::Float64;
}
impl Numeric for i32 {
    const DTYPE: DType = DType::Int32;
}
impl Numeric for i64 {
    const DTYPE: DType = DType::Int64;
}
