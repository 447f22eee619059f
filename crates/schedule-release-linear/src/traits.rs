//! Scaling traits used by the release computations.

use core::marker::PhantomData;

/// An error that can happen at [`FracScale`].
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FracScaleError {
    /// The intermediate product did not fit the computation type.
    #[error("overflow")]
    Overflow,
    /// The fraction denominator was zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The scaled value did not fit back into the value type.
    #[error("type conversion")]
    Conversion,
}

/// Fractional scaler.
///
/// Computes `value * (nom / denom)` rounding towards zero. Both the elapsed share of the release
/// window and the pro-rata share of a holder are expressed through it.
pub trait FracScale {
    /// The value type to scale.
    type Value;
    /// The type used for the fraction nominator and denominator.
    type FracPart;

    /// Compute `value * nom / denom`, floored.
    fn frac_scale(
        value: &Self::Value,
        nom: &Self::FracPart,
        denom: &Self::FracPart,
    ) -> Result<Self::Value, FracScaleError>;
}

/// A scaler that upcasts into `T` to do the multiplication before the division.
///
/// With `T = num::BigUint` the product never overflows, so the only possible failures are
/// a zero denominator or a result that does not fit back into `Value`.
pub struct SimpleFracScaler<T, Value, FracPart>(PhantomData<(T, Value, FracPart)>);

impl<T, Value, FracPart> FracScale for SimpleFracScaler<T, Value, FracPart>
where
    T: num_traits::CheckedMul + num_traits::CheckedDiv + num_traits::Zero,
    Value: Into<T> + Copy + num_traits::Zero,
    FracPart: Into<T> + Copy,
    T: TryInto<Value>,
{
    type Value = Value;
    type FracPart = FracPart;

    fn frac_scale(
        value: &Self::Value,
        nom: &Self::FracPart,
        denom: &Self::FracPart,
    ) -> Result<Self::Value, FracScaleError> {
        let denom: T = (*denom).into();
        if denom.is_zero() {
            return Err(FracScaleError::DivisionByZero);
        }

        let upscaled = (*value)
            .into()
            .checked_mul(&(*nom).into())
            .ok_or(FracScaleError::Overflow)?;
        if upscaled.is_zero() {
            return Ok(num_traits::Zero::zero());
        }

        let downscaled = upscaled
            .checked_div(&denom)
            .ok_or(FracScaleError::DivisionByZero)?;
        downscaled
            .try_into()
            .map_err(|_| FracScaleError::Conversion)
    }
}
