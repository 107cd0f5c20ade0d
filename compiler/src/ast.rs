//! Abstract syntax tree for graphical-model programs.
//!
//! A program is three declaration blocks (data, parameters, derived
//! quantities) followed by a model statement. Every node owns its children;
//! `Box` only appears where a type refers to itself.

use std::fmt;
use std::mem;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};
use std::str::FromStr;

use crate::error::AstError;
use crate::types::{BaseType, ExprType};

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 4] = [
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
    ];

    /// Canonical source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

impl FromStr for BinaryOp {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Add),
            "-" => Ok(Self::Subtract),
            "*" => Ok(Self::Multiply),
            "/" => Ok(Self::Divide),
            other => Err(AstError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Negate => "-",
        }
    }
}

impl FromStr for UnaryOp {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-" => Ok(Self::Negate),
            other => Err(AstError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Expr
// ---------------------------------------------------------------------------

/// An expression tree.
///
/// `Nil` is the default value and stands for "no expression". A finished
/// program never contains it; see [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Expr {
    #[default]
    Nil,
    IntLiteral(i64),
    RealLiteral(f64),
    Identifier {
        name: String,
    },
    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
    /// `base[g0][g1]...`, one inner vector per bracket group.
    Index {
        base: Box<Expr>,
        index_groups: Vec<Vec<Expr>>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

impl Expr {
    // ── Constructors ─────────────────────────────────────────────

    pub fn int(value: i64) -> Self {
        Self::IntLiteral(value)
    }

    pub fn real(value: f64) -> Self {
        Self::RealLiteral(value)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier { name: name.into() }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::FunctionCall {
            name: name.into(),
            args,
        }
    }

    pub fn index(base: Expr, index_groups: Vec<Vec<Expr>>) -> Self {
        Self::Index {
            base: Box::new(base),
            index_groups,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn neg(operand: Expr) -> Self {
        Self::unary(UnaryOp::Negate, operand)
    }

    /// Applies one more bracket group. An existing index node gains a
    /// trailing group; any other expression becomes the base of a new one.
    pub fn push_index_group(&mut self, group: Vec<Expr>) {
        match self {
            Self::Index { index_groups, .. } => index_groups.push(group),
            other => {
                let base = mem::take(other);
                *other = Self::index(base, vec![group]);
            }
        }
    }

    /// Replaces `self` with `self <op> rhs`. Repeated calls build a
    /// left-leaning chain.
    fn fold_binary(&mut self, op: BinaryOp, rhs: Expr) {
        let left = mem::take(self);
        *self = Self::binary(op, left, rhs);
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn is_nil(&self) -> bool {
        match self {
            Self::Nil => true,
            Self::IntLiteral(_)
            | Self::RealLiteral(_)
            | Self::Identifier { .. }
            | Self::FunctionCall { .. }
            | Self::Index { .. }
            | Self::Binary { .. }
            | Self::Unary { .. } => false,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::IntLiteral(_) | Self::RealLiteral(_))
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Nil | Self::IntLiteral(_) | Self::RealLiteral(_) | Self::Identifier { .. } => {
                Vec::new()
            }
            Self::FunctionCall { args, .. } => args.iter().collect(),
            Self::Index { base, index_groups } => {
                let mut out = vec![base.as_ref()];
                out.extend(index_groups.iter().flatten());
                out
            }
            Self::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Self::Unary { operand, .. } => vec![operand.as_ref()],
        }
    }

    /// Height of the tree; a leaf has depth 1. Runs on an explicit stack so
    /// arbitrarily long operator chains are safe to measure.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((expr, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(expr.children().into_iter().map(|c| (c, depth + 1)));
        }
        max
    }
}

impl AddAssign for Expr {
    fn add_assign(&mut self, rhs: Expr) {
        self.fold_binary(BinaryOp::Add, rhs);
    }
}

impl SubAssign for Expr {
    fn sub_assign(&mut self, rhs: Expr) {
        self.fold_binary(BinaryOp::Subtract, rhs);
    }
}

impl MulAssign for Expr {
    fn mul_assign(&mut self, rhs: Expr) {
        self.fold_binary(BinaryOp::Multiply, rhs);
    }
}

impl DivAssign for Expr {
    fn div_assign(&mut self, rhs: Expr) {
        self.fold_binary(BinaryOp::Divide, rhs);
    }
}

impl Expr {
    /// Moves every child out of `self` into `out`, leaving `Nil` behind.
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        match self {
            Self::Nil | Self::IntLiteral(_) | Self::RealLiteral(_) | Self::Identifier { .. } => {}
            Self::FunctionCall { args, .. } => out.append(args),
            Self::Index { base, index_groups } => {
                out.push(mem::take(base.as_mut()));
                for group in index_groups.iter_mut() {
                    out.append(group);
                }
            }
            Self::Binary { left, right, .. } => {
                out.push(mem::take(left.as_mut()));
                out.push(mem::take(right.as_mut()));
            }
            Self::Unary { operand, .. } => out.push(mem::take(operand.as_mut())),
        }
    }
}

// Tear-down runs on a heap stack; the derived drop would recurse once per
// level of an operator chain.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

enum Piece<'a> {
    Node(&'a Expr),
    Text(&'a str),
}

/// Queues `items` separated by commas so they pop in order.
fn push_list<'a>(stack: &mut Vec<Piece<'a>>, items: &'a [Expr]) {
    for (i, item) in items.iter().enumerate().rev() {
        stack.push(Piece::Node(item));
        if i > 0 {
            stack.push(Piece::Text(", "));
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![Piece::Node(self)];
        while let Some(piece) = stack.pop() {
            let expr = match piece {
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Node(expr) => expr,
            };
            match expr {
                Self::Nil => f.write_str("nil")?,
                Self::IntLiteral(v) => write!(f, "{v}")?,
                Self::RealLiteral(v) => write!(f, "{v:?}")?,
                Self::Identifier { name } => f.write_str(name)?,
                Self::FunctionCall { name, args } => {
                    write!(f, "{name}(")?;
                    stack.push(Piece::Text(")"));
                    push_list(&mut stack, args);
                }
                Self::Index { base, index_groups } => {
                    for group in index_groups.iter().rev() {
                        stack.push(Piece::Text("]"));
                        push_list(&mut stack, group);
                        stack.push(Piece::Text("["));
                    }
                    stack.push(Piece::Node(base.as_ref()));
                }
                Self::Binary { op, left, right } => {
                    f.write_str("(")?;
                    stack.push(Piece::Text(")"));
                    stack.push(Piece::Node(right.as_ref()));
                    stack.push(Piece::Text(" "));
                    stack.push(Piece::Text(op.symbol()));
                    stack.push(Piece::Text(" "));
                    stack.push(Piece::Node(left.as_ref()));
                }
                Self::Unary { op, operand } => {
                    f.write_str(op.symbol())?;
                    stack.push(Piece::Node(operand.as_ref()));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ranges and bounds
// ---------------------------------------------------------------------------

/// Inclusive `low:high` pair, as used by for-loops. Both ends are required.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Range {
    pub low: Expr,
    pub high: Expr,
}

impl Range {
    pub fn new(low: Expr, high: Expr) -> Self {
        Self { low, high }
    }
}

/// Optional lower/upper constraint on an `int` or `double` declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bounds {
    pub low: Option<Expr>,
    pub high: Option<Expr>,
}

impl Bounds {
    pub fn new(low: Option<Expr>, high: Option<Expr>) -> Self {
        Self { low, high }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn lower(low: Expr) -> Self {
        Self::new(Some(low), None)
    }

    pub fn upper(high: Expr) -> Self {
        Self::new(None, Some(high))
    }

    pub fn between(low: Expr, high: Expr) -> Self {
        Self::new(Some(low), Some(high))
    }

    /// Converts a range whose missing endpoints are `Expr::Nil`.
    pub fn from_range(range: Range) -> Self {
        let keep = |e: Expr| if e.is_nil() { None } else { Some(e) };
        Self::new(keep(range.low), keep(range.high))
    }

    pub fn is_unbounded(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }
}

// ---------------------------------------------------------------------------
// Variable references and distributions
// ---------------------------------------------------------------------------

/// Left-hand side of an assignment or sampling statement: `name[dims...]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VarRef {
    pub name: String,
    pub dims: Vec<Expr>,
}

impl VarRef {
    pub fn new(name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            dims,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Distribution {
    pub family: String,
    pub args: Vec<Expr>,
}

impl Distribution {
    pub fn new(family: impl Into<String>, args: Vec<Expr>) -> Self {
        Self {
            family: family.into(),
            args,
        }
    }
}

// ---------------------------------------------------------------------------
// Variable declarations
// ---------------------------------------------------------------------------

/// The declared shape of a variable, without name or payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Int,
    Double,
    Vector,
    RowVector,
    Matrix,
    Simplex,
    PositiveOrdered,
    CovMatrix,
    CorrMatrix,
}

impl DeclKind {
    pub const ALL: [DeclKind; 9] = [
        DeclKind::Int,
        DeclKind::Double,
        DeclKind::Vector,
        DeclKind::RowVector,
        DeclKind::Matrix,
        DeclKind::Simplex,
        DeclKind::PositiveOrdered,
        DeclKind::CovMatrix,
        DeclKind::CorrMatrix,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Double => "double",
            Self::Vector => "vector",
            Self::RowVector => "row_vector",
            Self::Matrix => "matrix",
            Self::Simplex => "simplex",
            Self::PositiveOrdered => "pos_ordered",
            Self::CovMatrix => "cov_matrix",
            Self::CorrMatrix => "corr_matrix",
        }
    }

    /// The container kind a value of this shape has at runtime.
    pub fn base_type(self) -> BaseType {
        match self {
            Self::Int => BaseType::Int,
            Self::Double => BaseType::Double,
            Self::Vector | Self::Simplex | Self::PositiveOrdered => BaseType::Vector,
            Self::RowVector => BaseType::RowVector,
            Self::Matrix | Self::CovMatrix | Self::CorrMatrix => BaseType::Matrix,
        }
    }

    /// True for shapes whose values live in a constrained space.
    pub fn is_constrained(self) -> bool {
        matches!(
            self,
            Self::Simplex | Self::PositiveOrdered | Self::CovMatrix | Self::CorrMatrix
        )
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A variable declaration. Each shape carries only its own payload plus the
/// variable name and any extra array dimensions (`dims`).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VarDecl {
    #[default]
    Nil,
    Int {
        name: String,
        bounds: Bounds,
        dims: Vec<Expr>,
    },
    Double {
        name: String,
        bounds: Bounds,
        dims: Vec<Expr>,
    },
    Vector {
        name: String,
        size: Expr,
        dims: Vec<Expr>,
    },
    RowVector {
        name: String,
        size: Expr,
        dims: Vec<Expr>,
    },
    Matrix {
        name: String,
        rows: Expr,
        cols: Expr,
        dims: Vec<Expr>,
    },
    Simplex {
        name: String,
        size: Expr,
        dims: Vec<Expr>,
    },
    PositiveOrdered {
        name: String,
        size: Expr,
        dims: Vec<Expr>,
    },
    /// `size` x `size` covariance matrix.
    CovMatrix {
        name: String,
        size: Expr,
        dims: Vec<Expr>,
    },
    /// `size` x `size` correlation matrix.
    CorrMatrix {
        name: String,
        size: Expr,
        dims: Vec<Expr>,
    },
}

impl VarDecl {
    // ── Constructors ─────────────────────────────────────────────

    pub fn int(bounds: Bounds, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::Int {
            name: name.into(),
            bounds,
            dims,
        }
    }

    pub fn double(bounds: Bounds, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::Double {
            name: name.into(),
            bounds,
            dims,
        }
    }

    pub fn vector(size: Expr, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::Vector {
            name: name.into(),
            size,
            dims,
        }
    }

    pub fn row_vector(size: Expr, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::RowVector {
            name: name.into(),
            size,
            dims,
        }
    }

    pub fn matrix(rows: Expr, cols: Expr, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::Matrix {
            name: name.into(),
            rows,
            cols,
            dims,
        }
    }

    pub fn simplex(size: Expr, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::Simplex {
            name: name.into(),
            size,
            dims,
        }
    }

    pub fn positive_ordered(size: Expr, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::PositiveOrdered {
            name: name.into(),
            size,
            dims,
        }
    }

    pub fn cov_matrix(size: Expr, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::CovMatrix {
            name: name.into(),
            size,
            dims,
        }
    }

    pub fn corr_matrix(size: Expr, name: impl Into<String>, dims: Vec<Expr>) -> Self {
        Self::CorrMatrix {
            name: name.into(),
            size,
            dims,
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn is_nil(&self) -> bool {
        match self {
            Self::Nil => true,
            Self::Int { .. }
            | Self::Double { .. }
            | Self::Vector { .. }
            | Self::RowVector { .. }
            | Self::Matrix { .. }
            | Self::Simplex { .. }
            | Self::PositiveOrdered { .. }
            | Self::CovMatrix { .. }
            | Self::CorrMatrix { .. } => false,
        }
    }

    pub fn kind(&self) -> Option<DeclKind> {
        let kind = match self {
            Self::Nil => return None,
            Self::Int { .. } => DeclKind::Int,
            Self::Double { .. } => DeclKind::Double,
            Self::Vector { .. } => DeclKind::Vector,
            Self::RowVector { .. } => DeclKind::RowVector,
            Self::Matrix { .. } => DeclKind::Matrix,
            Self::Simplex { .. } => DeclKind::Simplex,
            Self::PositiveOrdered { .. } => DeclKind::PositiveOrdered,
            Self::CovMatrix { .. } => DeclKind::CovMatrix,
            Self::CorrMatrix { .. } => DeclKind::CorrMatrix,
        };
        Some(kind)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Nil => None,
            Self::Int { name, .. }
            | Self::Double { name, .. }
            | Self::Vector { name, .. }
            | Self::RowVector { name, .. }
            | Self::Matrix { name, .. }
            | Self::Simplex { name, .. }
            | Self::PositiveOrdered { name, .. }
            | Self::CovMatrix { name, .. }
            | Self::CorrMatrix { name, .. } => Some(name.as_str()),
        }
    }

    /// Extra array dimensions, outermost first.
    pub fn dims(&self) -> &[Expr] {
        match self {
            Self::Nil => &[],
            Self::Int { dims, .. }
            | Self::Double { dims, .. }
            | Self::Vector { dims, .. }
            | Self::RowVector { dims, .. }
            | Self::Matrix { dims, .. }
            | Self::Simplex { dims, .. }
            | Self::PositiveOrdered { dims, .. }
            | Self::CovMatrix { dims, .. }
            | Self::CorrMatrix { dims, .. } => dims.as_slice(),
        }
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        match self {
            Self::Int { bounds, .. } | Self::Double { bounds, .. } => Some(bounds),
            Self::Nil
            | Self::Vector { .. }
            | Self::RowVector { .. }
            | Self::Matrix { .. }
            | Self::Simplex { .. }
            | Self::PositiveOrdered { .. }
            | Self::CovMatrix { .. }
            | Self::CorrMatrix { .. } => None,
        }
    }

    /// Size expressions of the container shape (rows before cols for
    /// matrices). Empty for scalars.
    pub fn size_exprs(&self) -> Vec<&Expr> {
        match self {
            Self::Nil | Self::Int { .. } | Self::Double { .. } => Vec::new(),
            Self::Matrix { rows, cols, .. } => vec![rows, cols],
            Self::Vector { size, .. }
            | Self::RowVector { size, .. }
            | Self::Simplex { size, .. }
            | Self::PositiveOrdered { size, .. }
            | Self::CovMatrix { size, .. }
            | Self::CorrMatrix { size, .. } => vec![size],
        }
    }

    /// Type of the declared variable when referenced without indices.
    pub fn declared_type(&self) -> Option<ExprType> {
        self.kind()
            .map(|kind| ExprType::new(kind.base_type(), self.dims().len()))
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Statement {
    #[default]
    Nil,
    Assignment {
        target: VarRef,
        value: Expr,
    },
    /// `target ~ family(args)`
    Sample {
        target: VarRef,
        distribution: Distribution,
    },
    Block {
        statements: Vec<Statement>,
    },
    For {
        variable: String,
        range: Range,
        body: Box<Statement>,
    },
}

impl Statement {
    pub fn assign(target: VarRef, value: Expr) -> Self {
        Self::Assignment { target, value }
    }

    pub fn sample(target: VarRef, distribution: Distribution) -> Self {
        Self::Sample {
            target,
            distribution,
        }
    }

    pub fn block(statements: Vec<Statement>) -> Self {
        Self::Block { statements }
    }

    pub fn for_loop(variable: impl Into<String>, range: Range, body: Statement) -> Self {
        Self::For {
            variable: variable.into(),
            range,
            body: Box::new(body),
        }
    }

    pub fn is_nil(&self) -> bool {
        match self {
            Self::Nil => true,
            Self::Assignment { .. } | Self::Sample { .. } | Self::Block { .. } | Self::For { .. } => {
                false
            }
        }
    }

    pub fn child_statements(&self) -> Vec<&Statement> {
        match self {
            Self::Nil | Self::Assignment { .. } | Self::Sample { .. } => Vec::new(),
            Self::Block { statements } => statements.iter().collect(),
            Self::For { body, .. } => vec![body.as_ref()],
        }
    }

    fn take_children(&mut self, out: &mut Vec<Statement>) {
        match self {
            Self::Nil | Self::Assignment { .. } | Self::Sample { .. } => {}
            Self::Block { statements } => out.append(statements),
            Self::For { body, .. } => out.push(mem::take(body.as_mut())),
        }
    }

    /// Statement nesting depth; expressions are not counted.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((stmt, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(stmt.child_statements().into_iter().map(|s| (s, depth + 1)));
        }
        max
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut stmt) = pending.pop() {
            stmt.take_children(&mut pending);
        }
    }
}

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProgramBlock {
    Data,
    Parameters,
    Derived,
    Model,
}

impl ProgramBlock {
    pub fn name(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Parameters => "parameters",
            Self::Derived => "derived parameters",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for ProgramBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Root of the tree. Block order is significant: later blocks may refer to
/// names declared in earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub data: Vec<VarDecl>,
    pub parameters: Vec<VarDecl>,
    pub derived: Vec<VarDecl>,
    pub model: Statement,
}

impl Program {
    pub fn new(
        data: Vec<VarDecl>,
        parameters: Vec<VarDecl>,
        derived: Vec<VarDecl>,
        model: Statement,
    ) -> Self {
        Self {
            data,
            parameters,
            derived,
            model,
        }
    }

    /// Declarations of one block; the model block declares nothing.
    pub fn block_decls(&self, block: ProgramBlock) -> &[VarDecl] {
        match block {
            ProgramBlock::Data => self.data.as_slice(),
            ProgramBlock::Parameters => self.parameters.as_slice(),
            ProgramBlock::Derived => self.derived.as_slice(),
            ProgramBlock::Model => &[],
        }
    }

    /// Every declaration in data, parameters, derived order.
    pub fn declarations(&self) -> impl Iterator<Item = (ProgramBlock, &VarDecl)> + '_ {
        [
            ProgramBlock::Data,
            ProgramBlock::Parameters,
            ProgramBlock::Derived,
        ]
        .into_iter()
        .flat_map(move |block| self.block_decls(block).iter().map(move |d| (block, d)))
    }

    /// First declaration with the given name, searching blocks in order.
    pub fn find_decl(&self, name: &str) -> Option<(ProgramBlock, &VarDecl)> {
        self.declarations().find(|(_, d)| d.name() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::ident("x")
    }

    #[test]
    fn test_binary_op_symbols_round_trip() {
        for op in BinaryOp::ALL {
            assert_eq!(op.symbol().parse::<BinaryOp>().unwrap(), op);
        }
        assert!("%".parse::<BinaryOp>().is_err());
        assert!("+".parse::<UnaryOp>().is_err());
        assert_eq!("-".parse::<UnaryOp>().unwrap(), UnaryOp::Negate);
    }

    #[test]
    fn test_fold_each_operator() {
        let mut add = x();
        add += Expr::int(2);
        assert_eq!(add, Expr::binary(BinaryOp::Add, x(), Expr::int(2)));

        let mut sub = x();
        sub -= Expr::int(2);
        assert_eq!(sub, Expr::binary(BinaryOp::Subtract, x(), Expr::int(2)));

        let mut mul = x();
        mul *= Expr::int(2);
        assert_eq!(mul, Expr::binary(BinaryOp::Multiply, x(), Expr::int(2)));

        let mut div = x();
        div /= Expr::int(2);
        assert_eq!(div, Expr::binary(BinaryOp::Divide, x(), Expr::int(2)));
    }

    #[test]
    fn test_fold_onto_nil_keeps_nil_on_left() {
        let mut e = Expr::default();
        e += Expr::int(1);
        match &e {
            Expr::Binary { left, .. } => assert!(left.is_nil()),
            other => panic!("expected Binary, got {other:?}"),
        }
    }

    #[test]
    fn test_push_index_group_wraps_plain_base() {
        let mut e = x();
        e.push_index_group(vec![Expr::ident("i")]);
        assert_eq!(e, Expr::index(x(), vec![vec![Expr::ident("i")]]));
    }

    #[test]
    fn test_display() {
        let mut e = Expr::call("exp", vec![Expr::neg(x()), Expr::real(1.0)]);
        e *= Expr::index(Expr::ident("y"), vec![vec![Expr::int(1)], vec![Expr::int(2)]]);
        assert_eq!(e.to_string(), "(exp(-x, 1.0) * y[1][2])");
    }

    #[test]
    fn test_is_literal() {
        assert!(Expr::int(3).is_literal());
        assert!(Expr::real(0.5).is_literal());
        assert!(!x().is_literal());
        assert!(!Expr::neg(Expr::int(3)).is_literal());
        assert!(!Expr::Nil.is_literal());
    }

    #[test]
    fn test_bounds_only_on_scalars() {
        let k = || Expr::ident("K");
        assert!(VarDecl::int(Bounds::unbounded(), "n", vec![]).bounds().is_some());
        assert!(VarDecl::double(Bounds::unbounded(), "s", vec![]).bounds().is_some());
        for d in [
            VarDecl::Nil,
            VarDecl::vector(k(), "v", vec![]),
            VarDecl::row_vector(k(), "r", vec![]),
            VarDecl::matrix(k(), k(), "m", vec![]),
            VarDecl::simplex(k(), "t", vec![]),
            VarDecl::positive_ordered(k(), "c", vec![]),
            VarDecl::cov_matrix(k(), "S", vec![]),
            VarDecl::corr_matrix(k(), "O", vec![]),
        ] {
            assert!(d.bounds().is_none(), "{d:?}");
        }
    }

    #[test]
    fn test_expr_depth() {
        assert_eq!(x().depth(), 1);
        let mut e = x();
        for _ in 0..10 {
            e += Expr::int(1);
        }
        assert_eq!(e.depth(), 11);
    }

    #[test]
    fn test_decl_accessors() {
        let d = VarDecl::matrix(Expr::ident("M"), Expr::ident("N"), "Sigma", vec![Expr::int(3)]);
        assert_eq!(d.name(), Some("Sigma"));
        assert_eq!(d.kind(), Some(DeclKind::Matrix));
        assert_eq!(d.size_exprs(), vec![&Expr::ident("M"), &Expr::ident("N")]);
        assert_eq!(d.dims(), &[Expr::int(3)]);
        assert!(d.bounds().is_none());

        let nil = VarDecl::default();
        assert_eq!(nil.name(), None);
        assert_eq!(nil.kind(), None);
        assert!(nil.dims().is_empty());
        assert!(nil.declared_type().is_none());
    }

    #[test]
    fn test_bounds_from_range() {
        let b = Bounds::from_range(Range::new(Expr::int(0), Expr::Nil));
        assert_eq!(b, Bounds::lower(Expr::int(0)));
        assert!(Bounds::from_range(Range::default()).is_unbounded());
    }

    #[test]
    fn test_statement_depth() {
        let inner = Statement::assign(VarRef::scalar("y"), x());
        let s = Statement::block(vec![Statement::for_loop(
            "i",
            Range::new(Expr::int(1), Expr::int(3)),
            Statement::block(vec![inner]),
        )]);
        assert_eq!(s.depth(), 4);
    }

    #[test]
    fn test_find_decl_prefers_earlier_block() {
        let p = Program::new(
            vec![VarDecl::int(Bounds::unbounded(), "N", vec![])],
            vec![VarDecl::double(Bounds::unbounded(), "N", vec![])],
            vec![],
            Statement::block(vec![]),
        );
        let (block, decl) = p.find_decl("N").unwrap();
        assert_eq!(block, ProgramBlock::Data);
        assert_eq!(decl.kind(), Some(DeclKind::Int));
        assert!(p.find_decl("missing").is_none());
    }
}
