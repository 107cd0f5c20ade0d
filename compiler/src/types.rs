//! Expression type descriptors.
//!
//! An [`ExprType`] is a base container kind plus a count of array
//! dimensions. It is never stored in the tree; semantic analysis computes
//! one per expression and keeps it wherever it likes.

use std::fmt;

// ── Base kinds ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Int,
    Double,
    Vector,
    RowVector,
    Matrix,
}

impl BaseType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Double => "double",
            Self::Vector => "vector",
            Self::RowVector => "row_vector",
            Self::Matrix => "matrix",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "int" => Some(Self::Int),
            "double" => Some(Self::Double),
            "vector" => Some(Self::Vector),
            "row_vector" => Some(Self::RowVector),
            "matrix" => Some(Self::Matrix),
            _ => None,
        }
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Int | Self::Double)
    }

    /// What one index applied to a bare container yields.
    fn indexed(self) -> Option<Self> {
        match self {
            Self::Int | Self::Double => None,
            Self::Vector | Self::RowVector => Some(Self::Double),
            Self::Matrix => Some(Self::RowVector),
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── ExprType ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprType {
    base: BaseType,
    num_dims: usize,
}

impl Default for ExprType {
    fn default() -> Self {
        Self::scalar(BaseType::Double)
    }
}

impl ExprType {
    pub fn new(base: BaseType, num_dims: usize) -> Self {
        Self { base, num_dims }
    }

    pub fn scalar(base: BaseType) -> Self {
        Self::new(base, 0)
    }

    pub fn base(self) -> BaseType {
        self.base
    }

    pub fn num_dims(self) -> usize {
        self.num_dims
    }

    /// `int` or `double` with no array dimensions.
    pub fn is_primitive(self) -> bool {
        self.base.is_scalar() && self.num_dims == 0
    }

    /// The type left after applying `n` indices. Array dimensions are
    /// consumed first, then the container itself (matrix → row_vector →
    /// double). Returns `None` when there is nothing left to index.
    pub fn index(self, n: usize) -> Option<Self> {
        if n <= self.num_dims {
            return Some(Self::new(self.base, self.num_dims - n));
        }
        let mut base = self.base;
        for _ in 0..(n - self.num_dims) {
            base = base.indexed()?;
        }
        Some(Self::scalar(base))
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if self.num_dims > 0 {
            write!(f, "[{}]", ",".repeat(self.num_dims - 1))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_double_scalar() {
        let t = ExprType::default();
        assert_eq!(t.base(), BaseType::Double);
        assert_eq!(t.num_dims(), 0);
        assert!(t.is_primitive());
    }

    #[test]
    fn test_base_type_names() {
        for base in [
            BaseType::Int,
            BaseType::Double,
            BaseType::Vector,
            BaseType::RowVector,
            BaseType::Matrix,
        ] {
            assert_eq!(BaseType::from_name(base.name()), Some(base));
        }
        assert_eq!(BaseType::from_name("real"), None);
    }

    #[test]
    fn test_is_primitive() {
        assert!(ExprType::scalar(BaseType::Int).is_primitive());
        assert!(!ExprType::new(BaseType::Int, 1).is_primitive());
        assert!(!ExprType::scalar(BaseType::Vector).is_primitive());
    }

    #[test]
    fn test_index_strips_array_dims_first() {
        let t = ExprType::new(BaseType::Matrix, 2);
        assert_eq!(t.index(0), Some(t));
        assert_eq!(t.index(1), Some(ExprType::new(BaseType::Matrix, 1)));
        assert_eq!(t.index(2), Some(ExprType::scalar(BaseType::Matrix)));
        assert_eq!(t.index(3), Some(ExprType::scalar(BaseType::RowVector)));
        assert_eq!(t.index(4), Some(ExprType::scalar(BaseType::Double)));
        assert_eq!(t.index(5), None);
    }

    #[test]
    fn test_index_scalars() {
        let t = ExprType::new(BaseType::Int, 1);
        assert_eq!(t.index(1), Some(ExprType::scalar(BaseType::Int)));
        assert_eq!(t.index(2), None);
        assert_eq!(ExprType::scalar(BaseType::Vector).index(1), Some(ExprType::default()));
    }

    #[test]
    fn test_display() {
        assert_eq!(ExprType::scalar(BaseType::RowVector).to_string(), "row_vector");
        assert_eq!(ExprType::new(BaseType::Double, 1).to_string(), "double[]");
        assert_eq!(ExprType::new(BaseType::Int, 3).to_string(), "int[,,]");
    }
}
