use crate::Error;

/// Smooth envelope functions, going from 1 at `r = 0` to 0 at the cutoff
/// radius. These are multiplied with the kernels (and used inside the
/// many-body descriptors) so that everything goes smoothly to zero when atoms
/// leave the environment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
#[serde(tag = "type")]
pub enum CutoffFunction {
    /// Quadratic envelope `f(r) = (1 - (r / cutoff)^2)^2` if `r < cutoff`, 0
    /// otherwise. Both the value and the first derivative vanish at the cutoff.
    Quadratic,
    /// Shifted cosine switching function
    /// `f(r) = 1/2 * (1 + cos(π (r - cutoff + width) / width ))`
    ShiftedCosine {
        /// Width of the switching function
        width: f64,
    },
    /// Step function, 1 if `r < cutoff` and 0 if `r >= cutoff`. Kernels using
    /// this are not smooth when atoms cross the cutoff.
    Step,
}

impl Default for CutoffFunction {
    fn default() -> CutoffFunction {
        CutoffFunction::Quadratic
    }
}

impl CutoffFunction {
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            CutoffFunction::Quadratic | CutoffFunction::Step => {},
            CutoffFunction::ShiftedCosine { width } => {
                if *width <= 0.0 || !width.is_finite() {
                    return Err(Error::InvalidParameter(format!(
                        "expected positive width for shifted cosine cutoff function, got {}",
                        width
                    )));
                }
            }
        }
        return Ok(());
    }

    /// Evaluate the cutoff function at the distance `r` for the given `cutoff`
    #[inline]
    pub fn compute(&self, r: f64, cutoff: f64) -> f64 {
        if r >= cutoff {
            return 0.0;
        }

        match self {
            CutoffFunction::Quadratic => {
                let x = 1.0 - (r * r) / (cutoff * cutoff);
                x * x
            }
            CutoffFunction::ShiftedCosine { width } => {
                if r <= (cutoff - width) {
                    1.0
                } else {
                    let s = std::f64::consts::PI * (r - cutoff + width) / width;
                    0.5 * (1. + f64::cos(s))
                }
            }
            CutoffFunction::Step => 1.0,
        }
    }

    /// Evaluate the derivative of the cutoff function with respect to `r` at
    /// the distance `r` for the given `cutoff`
    #[inline]
    pub fn derivative(&self, r: f64, cutoff: f64) -> f64 {
        if r >= cutoff {
            return 0.0;
        }

        match self {
            CutoffFunction::Quadratic => {
                let rc2 = cutoff * cutoff;
                -4.0 * r / rc2 * (1.0 - r * r / rc2)
            }
            CutoffFunction::ShiftedCosine { width } => {
                if r <= (cutoff - width) {
                    0.0
                } else {
                    let s = std::f64::consts::PI * (r - cutoff + width) / width;
                    -0.5 * std::f64::consts::PI * f64::sin(s) / width
                }
            }
            CutoffFunction::Step => 0.0,
        }
    }

    /// Evaluate the cutoff function for a neighbor at distance `r` in the
    /// direction `direction` (one component of the unit vector from the
    /// central atom to the neighbor).
    ///
    /// This returns the value of the function, and its derivative with
    /// respect to the displacement of the central atom along the same axis as
    /// `direction`. Moving the central atom by `dx` changes `r` by
    /// `-direction * dx`, hence the sign of the second value.
    #[inline]
    pub fn with_central_gradient(&self, r: f64, cutoff: f64, direction: f64) -> (f64, f64) {
        let value = self.compute(r, cutoff);
        let gradient = -self.derivative(r, cutoff) * direction;
        return (value, gradient);
    }
}
