//! Internal-consistency checks for parser-built trees.
//!
//! The checker rejects shapes no grammar production can legitimately
//! produce: sentinels left in place of real nodes, empty names, empty
//! bracket groups, and trees nested deeper than the configured limit. It
//! does not look at types or scoping; a well-formed tree may still be an
//! ill-typed program.
//!
//! The walk uses an explicit work stack, so deep trees cost heap rather
//! than call-stack space.

use tracing::{debug, trace, warn};

use crate::ast::{Expr, Program, ProgramBlock, Statement, VarDecl, VarRef};
use crate::config::AstConfig;
use crate::error::{AstError, Result};

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

pub fn check_program(program: &Program, config: &AstConfig) -> Result<()> {
    debug!(
        data = program.data.len(),
        parameters = program.parameters.len(),
        derived = program.derived.len(),
        max_depth = config.max_depth,
        "checking program"
    );
    let mut walk = Walk::new(config);
    for (block, decl) in program.declarations() {
        walk.decl(decl, block)?;
    }
    walk.push_stmt(&program.model, 1, "model body".into());
    walk.run()
}

pub fn check_decl(decl: &VarDecl, block: ProgramBlock, config: &AstConfig) -> Result<()> {
    let mut walk = Walk::new(config);
    walk.decl(decl, block)?;
    walk.run()
}

pub fn check_statement(stmt: &Statement, config: &AstConfig) -> Result<()> {
    let mut walk = Walk::new(config);
    walk.push_stmt(stmt, 1, "statement".into());
    walk.run()
}

pub fn check_expr(expr: &Expr, config: &AstConfig) -> Result<()> {
    let mut walk = Walk::new(config);
    walk.push_expr(expr, 1, "expression".into());
    walk.run()
}

// ---------------------------------------------------------------------------
// Work stack
// ---------------------------------------------------------------------------

enum Pending<'a> {
    Expr {
        expr: &'a Expr,
        depth: usize,
        context: String,
    },
    Stmt {
        stmt: &'a Statement,
        depth: usize,
        context: String,
    },
}

struct Walk<'a> {
    stack: Vec<Pending<'a>>,
    max_depth: usize,
    visited: usize,
}

impl<'a> Walk<'a> {
    fn new(config: &AstConfig) -> Self {
        Self {
            stack: Vec::new(),
            max_depth: config.max_depth,
            visited: 0,
        }
    }

    fn push_expr(&mut self, expr: &'a Expr, depth: usize, context: String) {
        self.stack.push(Pending::Expr {
            expr,
            depth,
            context,
        });
    }

    fn push_stmt(&mut self, stmt: &'a Statement, depth: usize, context: String) {
        self.stack.push(Pending::Stmt {
            stmt,
            depth,
            context,
        });
    }

    /// Pushes `items` so they pop in source order.
    fn push_exprs(&mut self, items: Vec<(&'a Expr, String)>, depth: usize) {
        for (expr, context) in items.into_iter().rev() {
            self.push_expr(expr, depth, context);
        }
    }

    fn decl(&mut self, decl: &'a VarDecl, block: ProgramBlock) -> Result<()> {
        let Some(name) = decl.name() else {
            return Err(fail(AstError::unexpected_nil(format!(
                "{block} declaration"
            ))));
        };
        if name.is_empty() {
            return Err(fail(AstError::empty_name(format!("{block} declaration"))));
        }
        trace!(%block, name, kind = ?decl.kind(), "checking declaration");

        // Bounds are optional by type, so there is no sentinel to reject
        // there; a present bound must still be a real expression.
        let mut items = Vec::new();
        if let Some(bounds) = decl.bounds() {
            if let Some(low) = &bounds.low {
                items.push((low, format!("lower bound of `{name}`")));
            }
            if let Some(high) = &bounds.high {
                items.push((high, format!("upper bound of `{name}`")));
            }
        }
        for size in decl.size_exprs() {
            items.push((size, format!("size of `{name}`")));
        }
        for dim in decl.dims() {
            items.push((dim, format!("array dimension of `{name}`")));
        }
        self.push_exprs(items, 2);
        Ok(())
    }

    fn var_ref(&mut self, target: &'a VarRef, depth: usize, what: &str) -> Result<()> {
        if target.name.is_empty() {
            return Err(fail(AstError::empty_name(format!("{what} target"))));
        }
        let items = target
            .dims
            .iter()
            .map(|d| (d, format!("index of `{}`", target.name)))
            .collect();
        self.push_exprs(items, depth);
        Ok(())
    }

    fn run(mut self) -> Result<()> {
        while let Some(pending) = self.stack.pop() {
            self.visited += 1;
            match pending {
                Pending::Expr {
                    expr,
                    depth,
                    context,
                } => {
                    self.enter(depth, &context)?;
                    self.expr(expr, depth, context)?;
                }
                Pending::Stmt {
                    stmt,
                    depth,
                    context,
                } => {
                    self.enter(depth, &context)?;
                    self.stmt(stmt, depth, context)?;
                }
            }
        }
        debug!(nodes = self.visited, "tree is well formed");
        Ok(())
    }

    fn enter(&self, depth: usize, context: &str) -> Result<()> {
        if depth > self.max_depth {
            return Err(fail(AstError::DepthExceeded {
                limit: self.max_depth,
                context: context.to_string(),
            }));
        }
        Ok(())
    }

    fn expr(&mut self, expr: &'a Expr, depth: usize, context: String) -> Result<()> {
        let next = depth + 1;
        match expr {
            Expr::Nil => return Err(fail(AstError::unexpected_nil(context))),
            Expr::IntLiteral(_) | Expr::RealLiteral(_) => {}
            Expr::Identifier { name } => {
                if name.is_empty() {
                    return Err(fail(AstError::empty_name(format!("identifier in {context}"))));
                }
            }
            Expr::FunctionCall { name, args } => {
                if name.is_empty() {
                    return Err(fail(AstError::empty_name(format!(
                        "function called in {context}"
                    ))));
                }
                let items = args
                    .iter()
                    .map(|a| (a, format!("argument of `{name}`")))
                    .collect();
                self.push_exprs(items, next);
            }
            Expr::Index { base, index_groups } => {
                let mut items = vec![(base.as_ref(), "indexed expression".to_string())];
                for group in index_groups {
                    if group.is_empty() {
                        return Err(fail(AstError::EmptyIndexGroup { context }));
                    }
                    items.extend(group.iter().map(|i| (i, "index".to_string())));
                }
                self.push_exprs(items, next);
            }
            Expr::Binary { op, left, right } => {
                self.push_exprs(
                    vec![
                        (left.as_ref(), format!("left operand of `{op}`")),
                        (right.as_ref(), format!("right operand of `{op}`")),
                    ],
                    next,
                );
            }
            Expr::Unary { op, operand } => {
                self.push_expr(operand, next, format!("operand of unary `{op}`"));
            }
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &'a Statement, depth: usize, context: String) -> Result<()> {
        let next = depth + 1;
        match stmt {
            Statement::Nil => return Err(fail(AstError::unexpected_nil(context))),
            Statement::Assignment { target, value } => {
                self.push_expr(value, next, format!("value assigned to `{}`", target.name));
                self.var_ref(target, next, "assignment")?;
            }
            Statement::Sample {
                target,
                distribution,
            } => {
                if distribution.family.is_empty() {
                    return Err(fail(AstError::empty_name("distribution family")));
                }
                let family = &distribution.family;
                let items = distribution
                    .args
                    .iter()
                    .map(|a| (a, format!("argument of `{family}`")))
                    .collect();
                self.push_exprs(items, next);
                self.var_ref(target, next, "sampling")?;
            }
            Statement::Block { statements } => {
                for s in statements.iter().rev() {
                    self.push_stmt(s, next, "block statement".into());
                }
            }
            Statement::For {
                variable,
                range,
                body,
            } => {
                if variable.is_empty() {
                    return Err(fail(AstError::empty_name("for-loop variable")));
                }
                self.push_stmt(body, next, format!("body of loop over `{variable}`"));
                self.push_exprs(
                    vec![
                        (&range.low, format!("lower bound of loop over `{variable}`")),
                        (&range.high, format!("upper bound of loop over `{variable}`")),
                    ],
                    next,
                );
            }
        }
        Ok(())
    }
}

fn fail(err: AstError) -> AstError {
    warn!(error = %err, "malformed tree");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Bounds, Range};

    fn config() -> AstConfig {
        AstConfig::default()
    }

    #[test]
    fn test_unbounded_scalar_is_fine() {
        let d = VarDecl::double(Bounds::unbounded(), "sigma", vec![]);
        assert!(check_decl(&d, ProgramBlock::Parameters, &config()).is_ok());
    }

    #[test]
    fn test_nil_size_is_rejected() {
        let d = VarDecl::simplex(Expr::Nil, "theta", vec![]);
        let err = check_decl(&d, ProgramBlock::Parameters, &config()).unwrap_err();
        assert_eq!(err, AstError::unexpected_nil("size of `theta`"));
    }

    #[test]
    fn test_nil_decl_is_rejected() {
        let err = check_decl(&VarDecl::Nil, ProgramBlock::Data, &config()).unwrap_err();
        assert_eq!(err, AstError::unexpected_nil("data declaration"));
    }

    #[test]
    fn test_for_loop_nil_bound() {
        let s = Statement::for_loop(
            "n",
            Range::new(Expr::int(1), Expr::Nil),
            Statement::block(vec![]),
        );
        let err = check_statement(&s, &config()).unwrap_err();
        assert_eq!(err, AstError::unexpected_nil("upper bound of loop over `n`"));
    }

    #[test]
    fn test_empty_index_group() {
        let e = Expr::index(Expr::ident("x"), vec![vec![Expr::int(1)], vec![]]);
        assert!(matches!(
            check_expr(&e, &config()),
            Err(AstError::EmptyIndexGroup { .. })
        ));
    }

    #[test]
    fn test_reports_first_defect_in_source_order() {
        let e = Expr::call("f", vec![Expr::ident(""), Expr::Nil]);
        let err = check_expr(&e, &config()).unwrap_err();
        assert!(matches!(err, AstError::EmptyName { .. }), "{err:?}");
    }

    #[test]
    fn test_depth_limit() {
        let mut e = Expr::int(0);
        for _ in 0..10 {
            e += Expr::int(1);
        }
        assert!(check_expr(&e, &AstConfig::with_max_depth(11)).is_ok());
        let err = check_expr(&e, &AstConfig::with_max_depth(10)).unwrap_err();
        assert!(matches!(err, AstError::DepthExceeded { limit: 10, .. }));
    }
}
