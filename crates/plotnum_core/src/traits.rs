use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars by the ODE steppers.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A real function of one real variable.
///
/// Every closure `Fn(f64) -> f64` is one. State a method-style callback needs
/// is captured by the closure or bound explicitly with [`with_context`].
pub trait RealFunction {
    fn value(&self, x: f64) -> f64;
}

impl<F: Fn(f64) -> f64> RealFunction for F {
    fn value(&self, x: f64) -> f64 {
        self(x)
    }
}

/// A function evaluated against an explicit, typed context value.
pub struct Contextual<'a, C, F> {
    context: &'a C,
    function: F,
}

impl<C, F> RealFunction for Contextual<'_, C, F>
where
    F: Fn(&C, f64) -> f64,
{
    fn value(&self, x: f64) -> f64 {
        (self.function)(self.context, x)
    }
}

/// Binds `context` as the first argument of `function`.
pub fn with_context<C, F>(context: &C, function: F) -> Contextual<'_, C, F>
where
    F: Fn(&C, f64) -> f64,
{
    Contextual { context, function }
}

/// A plane curve `t -> (x(t), y(t))` defined on `domain()`.
///
/// This is the `(X(t), Y(t), t_min, t_max)` quadruple the plotting layer consumes.
pub trait ParametricCurve {
    fn x(&self, t: f64) -> f64;
    fn y(&self, t: f64) -> f64;
    fn domain(&self) -> (f64, f64);

    fn point(&self, t: f64) -> (f64, f64) {
        (self.x(t), self.y(t))
    }
}

/// Right hand side of a first order system `dx/dt = f(t, x)`.
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the vector field.
    /// x: current state
    /// t: current time
    /// out: buffer to write dx/dt into
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A trait for solvers that can step a system forward.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// state: current state (updated after step)
    /// dt: step size
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Line {
        slope: f64,
    }

    #[test]
    fn closures_are_real_functions() {
        let offset = 2.0;
        let f = |x: f64| x + offset;
        assert_eq!(f.value(1.0), 3.0);
    }

    #[test]
    fn with_context_threads_state_into_the_callback() {
        let line = Line { slope: 3.0 };
        let f = with_context(&line, |l: &Line, x| l.slope * x);
        assert_eq!(f.value(2.0), 6.0);
    }
}
