use crate::error::{NumericsError, Result};
use crate::traits::{DynamicalSystem, Scalar, Steppable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Coefficients `(A, b, c)` of an explicit Runge-Kutta method.
///
/// `a` is `stages x stages` and strictly lower triangular; `b` and `c` have
/// one entry per stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButcherTableau {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
}

impl ButcherTableau {
    pub fn euler() -> Self {
        Self {
            a: vec![vec![0.0]],
            b: vec![1.0],
            c: vec![0.0],
        }
    }

    pub fn heun() -> Self {
        Self {
            a: vec![vec![0.0, 0.0], vec![1.0, 0.0]],
            b: vec![0.5, 0.5],
            c: vec![0.0, 1.0],
        }
    }

    pub fn rk4() -> Self {
        Self {
            a: vec![
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.5, 0.0, 0.0, 0.0],
                vec![0.0, 0.5, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            b: vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
            c: vec![0.0, 0.5, 0.5, 1.0],
        }
    }

    pub fn stages(&self) -> usize {
        self.b.len()
    }

    /// Checks shapes and that the method is explicit.
    pub fn validate(&self) -> Result<()> {
        let stages = self.stages();
        if stages == 0 {
            return Err(NumericsError::InvalidTableau("no stages".to_string()));
        }
        if self.c.len() != stages || self.a.len() != stages {
            return Err(NumericsError::InvalidTableau(format!(
                "{stages} weights need {stages} nodes and {stages} rows, got {} and {}",
                self.c.len(),
                self.a.len()
            )));
        }
        for (i, row) in self.a.iter().enumerate() {
            if row.len() != stages {
                return Err(NumericsError::InvalidTableau(format!(
                    "row {i} has {} entries, expected {stages}",
                    row.len()
                )));
            }
            if let Some(j) = (i..stages).find(|&j| row[j] != 0.0) {
                return Err(NumericsError::InvalidTableau(format!(
                    "entry ({i}, {j}) must be zero for an explicit method"
                )));
            }
        }
        let all = self.a.iter().flatten().chain(&self.b).chain(&self.c);
        if let Some(value) = all.copied().find(|v| !v.is_finite()) {
            return Err(NumericsError::InvalidTableau(format!(
                "coefficients must be finite, found {value}"
            )));
        }
        Ok(())
    }
}

/// Built-in methods plus user supplied tableaus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RungeKuttaMethod {
    Euler,
    Heun,
    Rk4,
    Custom(ButcherTableau),
}

impl RungeKuttaMethod {
    pub fn tableau(&self) -> ButcherTableau {
        match self {
            RungeKuttaMethod::Euler => ButcherTableau::euler(),
            RungeKuttaMethod::Heun => ButcherTableau::heun(),
            RungeKuttaMethod::Rk4 => ButcherTableau::rk4(),
            RungeKuttaMethod::Custom(tableau) => tableau.clone(),
        }
    }
}

impl FromStr for RungeKuttaMethod {
    type Err = NumericsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euler" => Ok(RungeKuttaMethod::Euler),
            "heun" => Ok(RungeKuttaMethod::Heun),
            "rk4" => Ok(RungeKuttaMethod::Rk4),
            _ => Err(NumericsError::UnknownMethod(s.to_string())),
        }
    }
}

impl From<ButcherTableau> for RungeKuttaMethod {
    fn from(tableau: ButcherTableau) -> Self {
        RungeKuttaMethod::Custom(tableau)
    }
}

/// Explicit Runge-Kutta stepper for an arbitrary tableau.
/// Stage buffers are allocated once for the given state dimension.
pub struct ExplicitRungeKutta<T: Scalar> {
    a: Vec<Vec<T>>,
    b: Vec<T>,
    c: Vec<T>,
    k: Vec<Vec<T>>,
    tmp: Vec<T>,
}

impl<T: Scalar> ExplicitRungeKutta<T> {
    pub fn new(tableau: &ButcherTableau, dim: usize) -> Result<Self> {
        tableau.validate()?;
        let convert = |values: &[f64]| -> Result<Vec<T>> {
            values
                .iter()
                .map(|&v| {
                    T::from_f64(v).ok_or_else(|| {
                        NumericsError::InvalidTableau(format!("{v} is not representable"))
                    })
                })
                .collect()
        };

        let a = tableau
            .a
            .iter()
            .map(|row| convert(row.as_slice()))
            .collect::<Result<Vec<_>>>()?;
        let b = convert(&tableau.b)?;
        let c = convert(&tableau.c)?;
        let stages = b.len();

        Ok(Self {
            a,
            b,
            c,
            k: vec![vec![T::zero(); dim]; stages],
            tmp: vec![T::zero(); dim],
        })
    }
}

impl<T: Scalar> Steppable<T> for ExplicitRungeKutta<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        let t0 = *t;

        // k_i = f(t + c_i dt, x + dt * sum_{j<i} a_ij k_j)
        for i in 0..self.b.len() {
            for n in 0..state.len() {
                let mut acc = T::zero();
                for j in 0..i {
                    acc = acc + self.a[i][j] * self.k[j][n];
                }
                self.tmp[n] = state[n] + dt * acc;
            }
            system.apply(t0 + self.c[i] * dt, &self.tmp, &mut self.k[i]);
        }

        // x_next = x + dt * sum_i b_i k_i
        for n in 0..state.len() {
            let mut acc = T::zero();
            for (b, k) in self.b.iter().zip(&self.k) {
                acc = acc + *b * k[n];
            }
            state[n] = state[n] + dt * acc;
        }

        *t = t0 + dt;
    }
}

/// Wraps a closure `f(t, x, dx)` as a [`DynamicalSystem`].
pub struct FnSystem<F> {
    dimension: usize,
    f: F,
}

impl<F> FnSystem<F> {
    pub fn new(dimension: usize, f: F) -> Self {
        Self { dimension, f }
    }
}

impl<T, F> DynamicalSystem<T> for FnSystem<F>
where
    T: Scalar,
    F: Fn(T, &[T], &mut [T]),
{
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn apply(&self, t: T, x: &[T], out: &mut [T]) {
        (self.f)(t, x, out)
    }
}

/// Integrates `system` from `x0` over `interval` with `steps` equal steps.
///
/// Returns `steps + 1` states: the initial one followed by the state after
/// each step, the last belonging to `interval.1`.
pub fn trajectory<S: DynamicalSystem<f64>>(
    method: &RungeKuttaMethod,
    system: &S,
    x0: &[f64],
    interval: (f64, f64),
    steps: usize,
) -> Result<Vec<Vec<f64>>> {
    if steps == 0 {
        return Err(NumericsError::InvalidArgument(
            "Runge-Kutta integration needs at least one step".to_string(),
        ));
    }
    if system.dimension() != x0.len() {
        return Err(NumericsError::DimensionMismatch(format!(
            "system has dimension {}, initial state has {} entries",
            system.dimension(),
            x0.len()
        )));
    }

    let (t0, t1) = interval;
    let h = (t1 - t0) / steps as f64;
    let mut stepper = ExplicitRungeKutta::new(&method.tableau(), x0.len())?;

    let mut states = Vec::with_capacity(steps + 1);
    let mut state = x0.to_vec();
    states.push(state.clone());
    for i in 0..steps {
        let mut t = t0 + i as f64 * h;
        stepper.step(system, &mut t, &mut state, h);
        states.push(state.clone());
    }
    Ok(states)
}

/// [`trajectory`] for a right hand side given as a closure `f(t, x, dx)`.
pub fn runge_kutta<F>(
    method: &RungeKuttaMethod,
    x0: &[f64],
    interval: (f64, f64),
    steps: usize,
    f: F,
) -> Result<Vec<Vec<f64>>>
where
    F: Fn(f64, &[f64], &mut [f64]),
{
    trajectory(method, &FnSystem::new(x0.len(), f), x0, interval, steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::E;

    fn growth(_t: f64, x: &[f64], dx: &mut [f64]) {
        dx[0] = x[0];
    }

    #[test]
    fn euler_approximates_e() {
        let states = runge_kutta(&RungeKuttaMethod::Euler, &[1.0], (0.0, 1.0), 1000, growth)
            .expect("trajectory");
        assert_eq!(states.len(), 1001);
        assert_eq!(states[0], vec![1.0]);
        assert!((states[1000][0] - E).abs() < 1e-2);
    }

    #[test]
    fn rk4_is_much_more_accurate() {
        let states = runge_kutta(&RungeKuttaMethod::Rk4, &[1.0], (0.0, 1.0), 10, growth)
            .expect("trajectory");
        assert!((states[10][0] - E).abs() < 1e-5);
    }

    #[test]
    fn heun_is_exact_for_linear_time_dependence() {
        let states = runge_kutta(&RungeKuttaMethod::Heun, &[0.0], (0.0, 1.0), 1, |t, _x, dx| {
            dx[0] = 2.0 * t;
        })
        .expect("trajectory");
        assert!((states[1][0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn custom_midpoint_tableau() {
        let midpoint = ButcherTableau {
            a: vec![vec![0.0, 0.0], vec![0.5, 0.0]],
            b: vec![0.0, 1.0],
            c: vec![0.0, 0.5],
        };
        // Harmonic oscillator, one full period.
        let period = 2.0 * std::f64::consts::PI;
        let states = runge_kutta(&midpoint.into(), &[1.0, 0.0], (0.0, period), 2000, |_t, x, dx| {
            dx[0] = x[1];
            dx[1] = -x[0];
        })
        .expect("trajectory");
        let last = &states[2000];
        assert!((last[0] - 1.0).abs() < 1e-4);
        assert!(last[1].abs() < 1e-4);
    }

    #[test]
    fn stepper_works_on_f32() {
        let system = FnSystem::new(1, |_t: f32, x: &[f32], dx: &mut [f32]| dx[0] = -x[0]);
        let mut stepper = ExplicitRungeKutta::<f32>::new(&ButcherTableau::rk4(), 1).expect("stepper");
        let mut t = 0.0f32;
        let mut state = [1.0f32];
        for _ in 0..10 {
            stepper.step(&system, &mut t, &mut state, 0.1);
        }
        assert!((state[0] - (-1.0f32).exp()).abs() < 1e-4);
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn method_names() {
        assert_eq!("euler".parse::<RungeKuttaMethod>(), Ok(RungeKuttaMethod::Euler));
        assert_eq!("RK4".parse::<RungeKuttaMethod>(), Ok(RungeKuttaMethod::Rk4));
        let err = "dopri5".parse::<RungeKuttaMethod>().expect_err("unknown");
        assert_eq!(err, NumericsError::UnknownMethod("dopri5".to_string()));
    }

    #[test]
    fn builtin_tableaus_are_valid() {
        for tableau in [ButcherTableau::euler(), ButcherTableau::heun(), ButcherTableau::rk4()] {
            tableau.validate().expect("valid tableau");
            let weights: f64 = tableau.b.iter().sum();
            assert!((weights - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn implicit_tableau_is_rejected() {
        let implicit = ButcherTableau {
            a: vec![vec![0.5]],
            b: vec![1.0],
            c: vec![0.5],
        };
        let err = implicit.validate().expect_err("diagonal entry");
        assert!(matches!(err, NumericsError::InvalidTableau(_)));

        let ragged = ButcherTableau {
            a: vec![vec![0.0, 0.0], vec![1.0]],
            b: vec![0.5, 0.5],
            c: vec![0.0, 1.0],
        };
        assert!(ragged.validate().is_err());
    }

    #[test]
    fn bad_arguments() {
        let err = runge_kutta(&RungeKuttaMethod::Euler, &[1.0], (0.0, 1.0), 0, growth)
            .expect_err("no steps");
        assert!(matches!(err, NumericsError::InvalidArgument(_)));

        let system = FnSystem::new(2, growth);
        let err = trajectory(&RungeKuttaMethod::Euler, &system, &[1.0], (0.0, 1.0), 4)
            .expect_err("dimension");
        assert!(matches!(err, NumericsError::DimensionMismatch(_)));
    }
}
