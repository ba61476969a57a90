/// Squared exponential covariance `k(x, y) = σ² exp(-|x - y|² / 2ℓ²)`, with
/// pre-computed powers of the length scale.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SquaredExponential {
    signal: f64,
    length_scale: f64,
    signal2: f64,
    inv_ls2: f64,
    inv_ls3: f64,
    inv_ls4: f64,
    inv_ls5: f64,
    inv_ls7: f64,
}

/// The four terms entering the second derivative of `E(x1, x2) f1(x1)
/// f2(x2)` with respect to the two central atoms positions `x1` and `x2`,
/// where `E` is the exponential and `f1`, `f2` the envelope products of the
/// two environments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PairTerms {
    /// the exponential itself
    pub e: f64,
    /// derivative of the exponential with respect to `x1`
    pub f: f64,
    /// derivative of the exponential with respect to `x2`
    pub g: f64,
    /// second derivative of the exponential with respect to `x1` and `x2`
    pub h: f64,
}

impl PairTerms {
    /// Combine these terms with the envelope values (`fi`, `fj`) and their
    /// derivatives (`fdi`, `fdj`) to get `∂²(E fi fj) / ∂x1 ∂x2`
    #[inline]
    pub fn force_force(&self, fi: f64, fdi: f64, fj: f64, fdj: f64) -> f64 {
        self.e * fdi * fdj + self.f * fi * fdj + self.g * fdi * fj + self.h * fi * fj
    }

    /// Get `∂(E fi fj) / ∂x1`
    #[inline]
    pub fn force_energy(&self, fi: f64, fdi: f64, fj: f64) -> f64 {
        self.f * fi * fj + self.e * fdi * fj
    }
}

impl SquaredExponential {
    pub fn new(signal: f64, length_scale: f64) -> SquaredExponential {
        let ls2 = length_scale * length_scale;
        let inv_ls2 = 1.0 / ls2;
        let inv_ls3 = inv_ls2 / length_scale;
        SquaredExponential {
            signal,
            length_scale,
            signal2: signal * signal,
            inv_ls2: inv_ls2,
            inv_ls3: inv_ls3,
            inv_ls4: inv_ls2 * inv_ls2,
            inv_ls5: inv_ls3 * inv_ls2,
            inv_ls7: inv_ls3 * inv_ls2 * inv_ls2,
        }
    }

    pub fn signal(&self) -> f64 {
        self.signal
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    /// Square of the signal variance hyper-parameter
    pub fn signal2(&self) -> f64 {
        self.signal2
    }

    /// Derivative of a kernel proportional to σ² with respect to σ
    #[inline]
    pub fn signal_gradient(&self, kernel: f64) -> f64 {
        2.0 / self.signal * kernel
    }

    /// Get `exp(-distance2 / 2ℓ²)`, without the signal variance
    #[inline]
    pub fn exponential(&self, distance2: f64) -> f64 {
        f64::exp(-0.5 * distance2 * self.inv_ls2)
    }

    /// Compute the four derivative terms from the products of geometric
    /// quantities of the two environments, where `r1` and `r2` are the
    /// distances being compared and `c1`, `c2` the corresponding direction
    /// components along the force axes:
    ///
    /// - `a = Σ c1 c2`
    /// - `b = Σ (r1 - r2) c1`
    /// - `c = Σ (r1 - r2) c2`
    /// - `d = Σ (r1 - r2)²`
    #[inline]
    pub fn terms(&self, a: f64, b: f64, c: f64, d: f64) -> PairTerms {
        let e = self.exponential(d);
        let f = e * b * self.inv_ls2;
        let g = -e * c * self.inv_ls2;
        let h = a * e * self.inv_ls2 - b * c * e * self.inv_ls4;
        return PairTerms { e, f, g, h };
    }

    /// Same as `terms`, also returning the derivatives of the four terms with
    /// respect to the length scale
    #[inline]
    pub fn terms_with_gradient(&self, a: f64, b: f64, c: f64, d: f64) -> (PairTerms, PairTerms) {
        let terms = self.terms(a, b, c, d);
        let e = terms.e;

        let common = d * self.inv_ls5 - 2.0 * self.inv_ls3;
        let gradient = PairTerms {
            e: e * d * self.inv_ls3,
            f: b * e * common,
            g: -c * e * common,
            h: a * e * common - b * c * e * (d * self.inv_ls7 - 4.0 * self.inv_ls5),
        };

        return (terms, gradient);
    }

    /// Kernel between two scalar descriptors `k(q1, q2)`
    #[inline]
    pub fn descriptor_value(&self, q1: f64, q2: f64) -> f64 {
        let diff = q1 - q2;
        self.signal2 * self.exponential(diff * diff)
    }

    /// First derivative `∂k(q1, q2) / ∂q1`
    #[inline]
    pub fn descriptor_derivative(&self, q1: f64, q2: f64) -> f64 {
        let diff = q1 - q2;
        -self.signal2 * self.exponential(diff * diff) * diff * self.inv_ls2
    }

    /// Second derivative `∂²k(q1, q2) / ∂q1 ∂q2`
    #[inline]
    pub fn descriptor_double_derivative(&self, q1: f64, q2: f64) -> f64 {
        let diff = q1 - q2;
        let diff2 = diff * diff;
        self.signal2 * self.exponential(diff2) * (self.inv_ls2 - diff2 * self.inv_ls4)
    }

    /// `∂²k(q1, q2) / ∂q1 ∂q2` and its derivative with respect to the length
    /// scale
    #[inline]
    pub fn descriptor_double_derivative_with_gradient(&self, q1: f64, q2: f64) -> (f64, f64) {
        let diff = q1 - q2;
        let diff2 = diff * diff;
        let e = self.signal2 * self.exponential(diff2);

        let value = e * (self.inv_ls2 - diff2 * self.inv_ls4);
        let gradient = e * (
            5.0 * diff2 * self.inv_ls5 - diff2 * diff2 * self.inv_ls7 - 2.0 * self.inv_ls3
        );
        return (value, gradient);
    }
}
