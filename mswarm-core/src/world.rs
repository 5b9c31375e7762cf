//! Espaço de busca limitado
//!
//! Só caixas alinhadas aos eixos são usadas na prática, então o conjunto é
//! fechado: o trait [`World`] descreve a capacidade consumida pelo otimizador e
//! [`BoxWorld`] é a implementação.

use crate::error::{CoreError, CoreResult};
use crate::position::Position;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Capacidade de limites e amostragem do espaço de busca
pub trait World: Send + Sync {
    /// Dimensão do espaço
    fn dimension_size(&self) -> usize;

    /// `true` se todas as coordenadas estão dentro dos limites (inclusivo)
    fn contains(&self, position: &Position) -> bool;

    /// Sorteia um ponto uniforme dentro dos limites
    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position;
}

/// Caixa alinhada aos eixos `[lower, upper]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxWorld {
    lower: Position,
    upper: Position,
}

impl BoxWorld {
    /// Cria mundo validando os limites
    pub fn new(lower: impl Into<Position>, upper: impl Into<Position>) -> CoreResult<Self> {
        let lower = lower.into();
        let upper = upper.into();

        if lower.len() != upper.len() {
            return Err(CoreError::DimensionMismatch {
                expected: lower.len(),
                found: upper.len(),
            });
        }
        if lower.is_empty() {
            return Err(CoreError::EmptyWorld);
        }
        for axis in 0..lower.len() {
            let (lo, hi) = (lower[axis], upper[axis]);
            // a amostragem uniforme escala a largura por 1 / (1 - ε); precisa continuar finita
            let scaled_span = (hi - lo) / (1.0 - f64::EPSILON);
            if !lo.is_finite() || !hi.is_finite() || lo >= hi || !scaled_span.is_finite() {
                return Err(CoreError::InvalidBounds { axis, lower: lo, upper: hi });
            }
        }

        Ok(Self { lower, upper })
    }

    /// Hipercubo `[-half_width, half_width]^dim`
    pub fn symmetric(half_width: f64, dim: usize) -> CoreResult<Self> {
        Self::new(vec![-half_width; dim], vec![half_width; dim])
    }

    /// Canto inferior
    pub fn lower(&self) -> &Position {
        &self.lower
    }

    /// Canto superior
    pub fn upper(&self) -> &Position {
        &self.upper
    }
}

impl World for BoxWorld {
    fn dimension_size(&self) -> usize {
        self.lower.len()
    }

    fn contains(&self, position: &Position) -> bool {
        position.len() == self.dimension_size()
            && position
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi)
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lo, &hi)| rng.gen_range(lo..=hi))
            .collect::<Vec<_>>()
            .into()
    }
}
