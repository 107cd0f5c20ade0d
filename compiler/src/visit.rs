//! Exhaustive visitors over the three sum types.
//!
//! Every trait method is required, including the one for the `Nil`
//! sentinel, so an implementation that forgets a shape does not compile.
//! Visitors see one node at a time; recursing into children is up to the
//! implementation.

use crate::ast::{BinaryOp, Bounds, Distribution, Expr, Range, Statement, UnaryOp, VarDecl, VarRef};

pub trait ExprVisitor {
    type Output;

    fn visit_nil(&mut self) -> Self::Output;
    fn visit_int(&mut self, value: i64) -> Self::Output;
    fn visit_real(&mut self, value: f64) -> Self::Output;
    fn visit_identifier(&mut self, name: &str) -> Self::Output;
    fn visit_call(&mut self, name: &str, args: &[Expr]) -> Self::Output;
    fn visit_index(&mut self, base: &Expr, index_groups: &[Vec<Expr>]) -> Self::Output;
    fn visit_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Self::Output;
    fn visit_unary(&mut self, op: UnaryOp, operand: &Expr) -> Self::Output;
}

pub trait StmtVisitor {
    type Output;

    fn visit_nil(&mut self) -> Self::Output;
    fn visit_assignment(&mut self, target: &VarRef, value: &Expr) -> Self::Output;
    fn visit_sample(&mut self, target: &VarRef, distribution: &Distribution) -> Self::Output;
    fn visit_block(&mut self, statements: &[Statement]) -> Self::Output;
    fn visit_for(&mut self, variable: &str, range: &Range, body: &Statement) -> Self::Output;
}

pub trait DeclVisitor {
    type Output;

    fn visit_nil(&mut self) -> Self::Output;
    fn visit_int(&mut self, name: &str, bounds: &Bounds, dims: &[Expr]) -> Self::Output;
    fn visit_double(&mut self, name: &str, bounds: &Bounds, dims: &[Expr]) -> Self::Output;
    fn visit_vector(&mut self, name: &str, size: &Expr, dims: &[Expr]) -> Self::Output;
    fn visit_row_vector(&mut self, name: &str, size: &Expr, dims: &[Expr]) -> Self::Output;
    fn visit_matrix(&mut self, name: &str, rows: &Expr, cols: &Expr, dims: &[Expr])
        -> Self::Output;
    fn visit_simplex(&mut self, name: &str, size: &Expr, dims: &[Expr]) -> Self::Output;
    fn visit_positive_ordered(&mut self, name: &str, size: &Expr, dims: &[Expr]) -> Self::Output;
    fn visit_cov_matrix(&mut self, name: &str, size: &Expr, dims: &[Expr]) -> Self::Output;
    fn visit_corr_matrix(&mut self, name: &str, size: &Expr, dims: &[Expr]) -> Self::Output;
}

impl Expr {
    pub fn accept<V: ExprVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Nil => visitor.visit_nil(),
            Expr::IntLiteral(v) => visitor.visit_int(*v),
            Expr::RealLiteral(v) => visitor.visit_real(*v),
            Expr::Identifier { name } => visitor.visit_identifier(name),
            Expr::FunctionCall { name, args } => visitor.visit_call(name, args),
            Expr::Index { base, index_groups } => visitor.visit_index(base, index_groups),
            Expr::Binary { op, left, right } => visitor.visit_binary(*op, left, right),
            Expr::Unary { op, operand } => visitor.visit_unary(*op, operand),
        }
    }
}

impl Statement {
    pub fn accept<V: StmtVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Statement::Nil => visitor.visit_nil(),
            Statement::Assignment { target, value } => visitor.visit_assignment(target, value),
            Statement::Sample {
                target,
                distribution,
            } => visitor.visit_sample(target, distribution),
            Statement::Block { statements } => visitor.visit_block(statements),
            Statement::For {
                variable,
                range,
                body,
            } => visitor.visit_for(variable, range, body),
        }
    }
}

impl VarDecl {
    pub fn accept<V: DeclVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            VarDecl::Nil => visitor.visit_nil(),
            VarDecl::Int { name, bounds, dims } => visitor.visit_int(name, bounds, dims),
            VarDecl::Double { name, bounds, dims } => visitor.visit_double(name, bounds, dims),
            VarDecl::Vector { name, size, dims } => visitor.visit_vector(name, size, dims),
            VarDecl::RowVector { name, size, dims } => visitor.visit_row_vector(name, size, dims),
            VarDecl::Matrix {
                name,
                rows,
                cols,
                dims,
            } => visitor.visit_matrix(name, rows, cols, dims),
            VarDecl::Simplex { name, size, dims } => visitor.visit_simplex(name, size, dims),
            VarDecl::PositiveOrdered { name, size, dims } => {
                visitor.visit_positive_ordered(name, size, dims)
            }
            VarDecl::CovMatrix { name, size, dims } => visitor.visit_cov_matrix(name, size, dims),
            VarDecl::CorrMatrix { name, size, dims } => {
                visitor.visit_corr_matrix(name, size, dims)
            }
        }
    }
}
