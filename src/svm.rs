//! Binary support vector machine inference.

use crate::error::{Error, Result};

/// Similarity between a support vector and an input of the same length.
pub trait Kernel {
    fn function(&self, x: &[f64], y: &[f64]) -> f64;
}

/// Dot product plus an additive constant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Linear {
    pub constant: f64,
}

impl Linear {
    pub fn new(constant: f64) -> Self {
        Self { constant }
    }
}

impl Kernel for Linear {
    #[inline]
    fn function(&self, x: &[f64], y: &[f64]) -> f64 {
        self.constant + x.iter().zip(y).map(|(a, b)| a * b).sum::<f64>()
    }
}

/// A trained two-class SVM. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportVectorMachine<K = Linear> {
    number_of_inputs: usize,
    kernel: K,
    support_vectors: Vec<Vec<f64>>,
    weights: Vec<f64>,
    threshold: f64,
}

impl<K: Kernel> SupportVectorMachine<K> {
    pub fn new(
        number_of_inputs: usize,
        kernel: K,
        support_vectors: Vec<Vec<f64>>,
        weights: Vec<f64>,
        threshold: f64,
    ) -> Result<Self> {
        if support_vectors.len() != weights.len() {
            return Err(Error::InvalidModel(format!(
                "{} support vectors but {} weights",
                support_vectors.len(),
                weights.len()
            )));
        }
        if let Some((index, vector)) = support_vectors
            .iter()
            .enumerate()
            .find(|(_, vector)| vector.len() != number_of_inputs)
        {
            return Err(Error::InvalidModel(format!(
                "support vector {} has {} values, expected {}",
                index,
                vector.len(),
                number_of_inputs
            )));
        }
        Ok(Self {
            number_of_inputs,
            kernel,
            support_vectors,
            weights,
            threshold,
        })
    }

    pub fn number_of_inputs(&self) -> usize {
        self.number_of_inputs
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn support_vectors(&self) -> &[Vec<f64>] {
        &self.support_vectors
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Raw decision value: `threshold + Σ weight[i] · k(sv[i], input)`.
    pub fn score(&self, input: &[f64]) -> Result<f64> {
        if input.len() != self.number_of_inputs {
            return Err(Error::InvalidArgument(format!(
                "input has {} values, expected {}",
                input.len(),
                self.number_of_inputs
            )));
        }
        Ok(self
            .support_vectors
            .iter()
            .zip(&self.weights)
            .fold(self.threshold, |sum, (vector, weight)| {
                sum + weight * self.kernel.function(vector, input)
            }))
    }

    /// Positive class iff the score is non-negative.
    pub fn decide(&self, input: &[f64]) -> Result<bool> {
        Ok(self.score(input)? >= 0.0)
    }
}
