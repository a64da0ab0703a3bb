/// Embedding vector value type
///
/// Immutable fixed-dimension vector. Every operation returns a new value.

use crate::error::{Result, WordArithError};
use nalgebra::DVector;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Dimension of the vectors shipped with the standard model
pub const DEFAULT_DIMENSION: usize = 300;

// How many components Display shows before eliding the rest
const DISPLAY_PREVIEW: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    data: DVector<f64>,
}

impl Embedding {
    /// The zero vector of the given dimension
    pub fn zeros(dimension: usize) -> Self {
        Self {
            data: DVector::zeros(dimension),
        }
    }

    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            data: DVector::from_vec(values),
        }
    }

    pub fn dimension(&self) -> usize {
        self.data.len()
    }

    /// False if any component is infinite or NaN
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.data.norm()
    }

    pub fn is_zero(&self) -> bool {
        self.norm() == 0.0
    }

    pub fn dot(&self, other: &Embedding) -> f64 {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.data.dot(&other.data)
    }

    pub fn add(&self, other: &Embedding) -> Embedding {
        debug_assert_eq!(self.dimension(), other.dimension());
        Self {
            data: &self.data + &other.data,
        }
    }

    pub fn sub(&self, other: &Embedding) -> Embedding {
        debug_assert_eq!(self.dimension(), other.dimension());
        Self {
            data: &self.data - &other.data,
        }
    }

    pub fn scale(&self, factor: f64) -> Embedding {
        Self {
            data: &self.data * factor,
        }
    }

    pub fn divide(&self, denominator: f64) -> Embedding {
        Self {
            data: &self.data / denominator,
        }
    }

    pub fn negate(&self) -> Embedding {
        self.scale(-1.0)
    }

    /// Unit vector in the same direction
    ///
    /// # Returns
    /// * `Err(WordArithError::DegenerateVector)` - If the norm is zero
    pub fn unit(&self) -> Result<Embedding> {
        let norm = self.norm();
        if norm == 0.0 {
            return Err(WordArithError::DegenerateVector(
                "vector has zero norm".to_string(),
            ));
        }
        Ok(self.divide(norm))
    }

    /// Cosine similarity, `None` when either operand has zero norm
    pub fn cosine(&self, other: &Embedding) -> Option<f64> {
        let denominator = self.norm() * other.norm();
        if denominator == 0.0 {
            return None;
        }
        Some(self.dot(other) / denominator)
    }

    /// Component-wise sum of a sequence, zero vector when it is empty
    pub fn sum<'a, I>(dimension: usize, vectors: I) -> Embedding
    where
        I: IntoIterator<Item = &'a Embedding>,
    {
        vectors
            .into_iter()
            .fold(Embedding::zeros(dimension), |acc, v| acc.add(v))
    }
}

impl Add for &Embedding {
    type Output = Embedding;

    fn add(self, rhs: Self) -> Embedding {
        Embedding::add(self, rhs)
    }
}

impl Sub for &Embedding {
    type Output = Embedding;

    fn sub(self, rhs: Self) -> Embedding {
        Embedding::sub(self, rhs)
    }
}

impl Neg for &Embedding {
    type Output = Embedding;

    fn neg(self) -> Embedding {
        self.negate()
    }
}

impl fmt::Display for Embedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: Vec<String> = self
            .data
            .iter()
            .take(DISPLAY_PREVIEW)
            .map(|v| format!("{:.4}", v))
            .collect();

        if self.dimension() > DISPLAY_PREVIEW {
            write!(
                f,
                "[{}, ... ({} dims, norm {:.4})]",
                shown.join(", "),
                self.dimension(),
                self.norm()
            )
        } else {
            write!(f, "[{}]", shown.join(", "))
        }
    }
}
