mod cutoff;
pub use self::cutoff::CutoffFunction;

mod squared_exponential;
pub(crate) use self::squared_exponential::{SquaredExponential, PairTerms};
