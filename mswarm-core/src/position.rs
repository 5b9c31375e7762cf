//! Vetor de posição no espaço de busca
//!
//! `Position` representa tanto um ponto quanto uma velocidade. Tem semântica de
//! valor: toda operação devolve um novo vetor, nada é alterado no lugar, então
//! workers diferentes nunca compartilham um buffer mutável.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Ponto (ou velocidade) de dimensão fixa
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(Vec<f64>);

impl Position {
    /// Cria posição a partir das coordenadas
    pub fn new(coords: Vec<f64>) -> Self {
        Self(coords)
    }

    /// Vetor nulo com `dim` coordenadas
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    /// Número de coordenadas
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Coordenadas como slice
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    fn check_len(&self, other: &Position) -> CoreResult<()> {
        if self.len() != other.len() {
            return Err(CoreError::DimensionMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }
        Ok(())
    }

    /// Soma componente a componente
    pub fn add(&self, other: &Position) -> CoreResult<Position> {
        self.check_len(other)?;
        Ok(Self(self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect()))
    }

    /// Subtração componente a componente (`self - other`)
    pub fn subtract(&self, other: &Position) -> CoreResult<Position> {
        self.check_len(other)?;
        Ok(Self(self.0.iter().zip(&other.0).map(|(a, b)| a - b).collect()))
    }

    /// Multiplica todas as coordenadas por um escalar
    pub fn scale(&self, scalar: f64) -> Position {
        Self(self.0.iter().map(|v| v * scalar).collect())
    }
}

impl From<Vec<f64>> for Position {
    fn from(coords: Vec<f64>) -> Self {
        Self(coords)
    }
}

impl<const N: usize> From<[f64; N]> for Position {
    fn from(coords: [f64; N]) -> Self {
        Self(coords.to_vec())
    }
}

impl Index<usize> for Position {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:.5}", v)?;
        }
        Ok(())
    }
}
