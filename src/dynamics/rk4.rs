use glam::Vec3;

/// Values the integrator can step: anything with vector-space arithmetic.
pub trait Interpolatable: Clone + Copy {
    fn add(self, other: Self) -> Self;
    fn scale(self, factor: f32) -> Self;
}

impl Interpolatable for f32 {
    fn add(self, other: Self) -> Self { self + other }
    fn scale(self, factor: f32) -> Self { self * factor }
}

impl Interpolatable for Vec3 {
    fn add(self, other: Self) -> Self { self + other }
    fn scale(self, factor: f32) -> Self { self * factor }
}

/// One classical 4th-order Runge-Kutta step of `x'' = accel(x, x')`.
///
/// Returns the new `(position, velocity)`. For `Vec3` the acceleration
/// functions used by the chain are componentwise, so this is the same as
/// integrating each axis on its own.
pub fn rk4<T, F>(x: T, v: T, dt: f32, accel: F) -> (T, T)
where
    T: Interpolatable,
    F: Fn(T, T) -> T,
{
    let half = 0.5 * dt;

    let x1 = x;
    let v1 = v;
    let a1 = accel(x1, v1);

    let x2 = x.add(v1.scale(half));
    let v2 = v.add(a1.scale(half));
    let a2 = accel(x2, v2);

    let x3 = x.add(v2.scale(half));
    let v3 = v.add(a2.scale(half));
    let a3 = accel(x3, v3);

    let x4 = x.add(v3.scale(dt));
    let v4 = v.add(a3.scale(dt));
    let a4 = accel(x4, v4);

    let sixth = dt / 6.0;
    let xf = x.add(v1.add(v2.scale(2.0)).add(v3.scale(2.0)).add(v4).scale(sixth));
    let vf = v.add(a1.add(a2.scale(2.0)).add(a3.scale(2.0)).add(a4).scale(sixth));

    (xf, vf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // x'' = -k x, x(0) = 1, v(0) = 0  =>  x(t) = cos(sqrt(k) t)
    fn harmonic_error(dt: f32, duration: f32) -> f32 {
        let k = 0.5_f32;
        let steps = (duration / dt).round() as usize;
        let (mut x, mut v) = (1.0_f32, 0.0_f32);
        for _ in 0..steps {
            (x, v) = rk4(x, v, dt, |x, _v| -k * x);
        }
        let t = steps as f32 * dt;
        (x - (k.sqrt() * t).cos()).abs()
    }

    #[test]
    fn converges_to_the_analytic_solution() {
        let coarse = harmonic_error(0.5, 10.0);
        let fine = harmonic_error(0.25, 10.0);

        assert!(coarse < 1e-2, "coarse error {coarse}");
        assert!(fine < coarse, "fine {fine} should beat coarse {coarse}");
    }

    #[test]
    fn zero_timestep_is_a_no_op() {
        let (x, v) = rk4(Vec3::new(1.0, -2.0, 3.0), Vec3::ONE, 0.0, |x, v| -x - v);
        assert_eq!(x, Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(v, Vec3::ONE);
    }

    #[test]
    fn vector_step_matches_per_axis_steps() {
        let accel = |x: f32, v: f32| -0.5 * x - 0.7 * v;
        let (vx, vv) = rk4(
            Vec3::new(-10.0, 2.0, 0.5),
            Vec3::new(0.0, 1.0, -1.0),
            1.0,
            |x: Vec3, v: Vec3| x * -0.5 - v * 0.7,
        );
        let (ax, av) = rk4(2.0_f32, 1.0, 1.0, accel);

        assert_abs_diff_eq!(vx.y, ax, epsilon = 1e-6);
        assert_abs_diff_eq!(vv.y, av, epsilon = 1e-6);
    }
}
