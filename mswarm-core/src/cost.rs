//! Funções de custo
//!
//! O otimizador trata a função de custo como uma caixa preta pura: mesma
//! posição, mesmo custo. Um [`CostFunction`] pode declarar a dimensão que
//! aceita; a validação da execução compara isso com o mundo antes de qualquer
//! worker começar.

use crate::error::CoreError;
use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Função escalar a minimizar
pub trait CostFunction: Send + Sync {
    /// Custo de uma posição
    fn cost(&self, position: &Position) -> f64;

    /// Nome legível
    fn name(&self) -> &str;

    /// Dimensão exigida, `None` se aceita qualquer dimensão
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// Adaptador para closures
pub struct CostFn<F> {
    name: String,
    dimension: Option<usize>,
    f: F,
}

impl<F> CostFn<F>
where
    F: Fn(&Position) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            dimension: None,
            f,
        }
    }

    /// Fixa a dimensão aceita
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

impl<F> CostFunction for CostFn<F>
where
    F: Fn(&Position) -> f64 + Send + Sync,
{
    fn cost(&self, position: &Position) -> f64 {
        (self.f)(position)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

impl<F> fmt::Debug for CostFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CostFn")
            .field("name", &self.name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

/// Funções de benchmark embutidas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Benchmark {
    /// Tigela de soma dos quadrados, mínimo 0 na origem
    DeJong,
    /// Paisagem trigonométrica multimodal, mínimo perto de 420.9687 por eixo
    Schwefel,
    /// Variante 2-D: `e^-5 * |p| + 3 * (cos 2x + sin 2y)`
    Ackley,
}

impl Benchmark {
    pub const ALL: [Benchmark; 3] = [Benchmark::DeJong, Benchmark::Schwefel, Benchmark::Ackley];

    /// Descrição curta para listagens
    pub fn description(&self) -> &'static str {
        match self {
            Benchmark::DeJong => "sum of squares, any dimension",
            Benchmark::Schwefel => "multimodal sum of -x*sin(sqrt|x|), any dimension",
            Benchmark::Ackley => "e^-5*|p| + 3*(cos 2x + sin 2y), 2-D only",
        }
    }
}

impl CostFunction for Benchmark {
    fn cost(&self, position: &Position) -> f64 {
        match self {
            Benchmark::DeJong => position.iter().map(|x| x * x).sum(),
            Benchmark::Schwefel => position.iter().map(|x| -x * x.abs().sqrt().sin()).sum(),
            Benchmark::Ackley => {
                let (x, y) = (position[0], position[1]);
                (-5.0f64).exp() * (x * x + y * y).sqrt() + 3.0 * ((2.0 * x).cos() + (2.0 * y).sin())
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            Benchmark::DeJong => "dejong",
            Benchmark::Schwefel => "schwefel",
            Benchmark::Ackley => "ackley",
        }
    }

    fn dimension(&self) -> Option<usize> {
        match self {
            Benchmark::Ackley => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Benchmark {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dejong" | "de-jong" | "sphere" => Ok(Benchmark::DeJong),
            "schwefel" => Ok(Benchmark::Schwefel),
            "ackley" => Ok(Benchmark::Ackley),
            other => Err(CoreError::UnknownFunction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dejong() {
        assert_eq!(Benchmark::DeJong.cost(&Position::from([0.0, 0.0])), 0.0);
        assert_eq!(Benchmark::DeJong.cost(&Position::from([1.0, -2.0, 3.0])), 14.0);
    }

    #[test]
    fn test_schwefel_minimum_region() {
        let near_opt = Benchmark::Schwefel.cost(&Position::from([420.9687, 420.9687]));
        let origin = Benchmark::Schwefel.cost(&Position::from([0.0, 0.0]));
        assert_eq!(origin, 0.0);
        assert!(near_opt < -837.0);
    }

    #[test]
    fn test_ackley_is_2d() {
        assert_eq!(Benchmark::Ackley.dimension(), Some(2));
        assert_eq!(Benchmark::DeJong.dimension(), None);
        let at_origin = Benchmark::Ackley.cost(&Position::from([0.0, 0.0]));
        assert!((at_origin - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("DeJong".parse::<Benchmark>().unwrap(), Benchmark::DeJong);
        assert_eq!("schwefel".parse::<Benchmark>().unwrap(), Benchmark::Schwefel);
        assert!("rastrigin".parse::<Benchmark>().is_err());

        for b in Benchmark::ALL {
            assert_eq!(b.name().parse::<Benchmark>().unwrap(), b);
        }
    }

    #[test]
    fn test_cost_fn_adapter() {
        let f = CostFn::new("abs-sum", |p: &Position| p.iter().map(|x| x.abs()).sum::<f64>())
            .with_dimension(3);
        assert_eq!(f.cost(&Position::from([-1.0, 2.0, -3.0])), 6.0);
        assert_eq!(f.name(), "abs-sum");
        assert_eq!(f.dimension(), Some(3));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Benchmark::Schwefel).unwrap();
        assert_eq!(json, "\"schwefel\"");
        let b: Benchmark = serde_json::from_str("\"dejong\"").unwrap();
        assert_eq!(b, Benchmark::DeJong);
    }
}
