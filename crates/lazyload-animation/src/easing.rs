/// Timing curves, named after their CSS `transition-timing-function`
/// counterparts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// `cubic-bezier(x1, y1, x2, y2)`
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Maps linear progress in `[0, 1]` onto the curve.
    pub fn transform(&self, progress: f32) -> f32 {
        let curve = match *self {
            Easing::Linear => return progress.clamp(0.0, 1.0),
            Easing::Ease => UnitBezier::new(0.25, 0.1, 0.25, 1.0),
            Easing::EaseIn => UnitBezier::new(0.42, 0.0, 1.0, 1.0),
            Easing::EaseOut => UnitBezier::new(0.0, 0.0, 0.58, 1.0),
            Easing::EaseInOut => UnitBezier::new(0.42, 0.0, 0.58, 1.0),
            Easing::CubicBezier(x1, y1, x2, y2) => UnitBezier::new(x1, y1, x2, y2),
        };
        curve.ease(progress)
    }
}

const EPSILON: f32 = 1e-6;

/// Bezier from (0, 0) to (1, 1) in polynomial form, one axis per triple.
struct UnitBezier {
    x: [f32; 3],
    y: [f32; 3],
}

impl UnitBezier {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: Self::coefficients(x1, x2),
            y: Self::coefficients(y1, y2),
        }
    }

    fn coefficients(p1: f32, p2: f32) -> [f32; 3] {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        [1.0 - c - b, b, c]
    }

    fn sample([a, b, c]: [f32; 3], t: f32) -> f32 {
        ((a * t + b) * t + c) * t
    }

    fn slope([a, b, c]: [f32; 3], t: f32) -> f32 {
        (3.0 * a * t + 2.0 * b) * t + c
    }

    fn ease(&self, progress: f32) -> f32 {
        if progress <= 0.0 {
            return 0.0;
        }
        if progress >= 1.0 {
            return 1.0;
        }
        Self::sample(self.y, self.solve_t(progress))
    }

    /// Parameter `t` whose x coordinate is `x`. Newton steps first, halving
    /// once the curve is too flat for them.
    fn solve_t(&self, x: f32) -> f32 {
        let mut t = x;
        for _ in 0..8 {
            let error = Self::sample(self.x, t) - x;
            if error.abs() < EPSILON {
                return t;
            }
            let slope = Self::slope(self.x, t);
            if slope.abs() < EPSILON {
                break;
            }
            t = (t - error / slope).clamp(0.0, 1.0);
        }

        let (mut low, mut high) = (0.0_f32, 1.0_f32);
        t = x;
        for _ in 0..24 {
            let error = Self::sample(self.x, t) - x;
            if error.abs() < EPSILON {
                break;
            }
            if error > 0.0 {
                high = t;
            } else {
                low = t;
            }
            t = (low + high) / 2.0;
        }
        t
    }
}
