//! Two-direction traversal of the syntax tree.
//!
//! Every node can walk its children either in execution order
//! ([`Direction::Forward`]) or in reverse ([`Direction::Backward`]). The
//! reverse walk reverses statement lists, argument lists and the operands of
//! every node, so a reader that follows a declaration in execution order is
//! seen before it.
//!
//! A [`Visitor`] overrides the `visit_*` hooks it cares about and calls back
//! into [`Stmt::walk`] / [`Expr::walk`] / [`Function::walk`] for the rest.
//! Type annotations and import/export lists are not walked.

use crate::stmt::{ClassMemberKind, ExportDecl};
use crate::{Expr, Function, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

/// Iterate `items` in the given direction.
pub fn ordered<T>(items: &[T], direction: Direction) -> impl DoubleEndedIterator<Item = &T> {
    let (forward, backward) = match direction {
        Direction::Forward => (Some(items.iter()), None),
        Direction::Backward => (None, Some(items.iter().rev())),
    };
    forward.into_iter().flatten().chain(backward.into_iter().flatten())
}

pub trait Visitor {
    type Error;

    fn direction(&self) -> Direction {
        Direction::Forward
    }

    fn visit_block(&mut self, stmts: &[Stmt]) -> Result<(), Self::Error> {
        for stmt in ordered(stmts, self.direction()) {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), Self::Error> {
        stmt.walk(self)
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), Self::Error> {
        expr.walk(self)
    }

    fn visit_function(&mut self, func: &Function) -> Result<(), Self::Error> {
        func.walk(self)
    }
}

fn visit_all<'a, V, I>(visitor: &mut V, exprs: I) -> Result<(), V::Error>
where
    V: Visitor + ?Sized,
    I: DoubleEndedIterator<Item = &'a Expr>,
{
    match visitor.direction() {
        Direction::Forward => {
            for expr in exprs {
                visitor.visit_expr(expr)?;
            }
        }
        Direction::Backward => {
            for expr in exprs.rev() {
                visitor.visit_expr(expr)?;
            }
        }
    }
    Ok(())
}

impl Function {
    /// Visit parameter defaults and the body.
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        let defaults = self.params.iter().filter_map(|p| p.default.as_ref());
        match visitor.direction() {
            Direction::Forward => {
                visit_all(visitor, defaults)?;
                visitor.visit_block(&self.body)
            }
            Direction::Backward => {
                visitor.visit_block(&self.body)?;
                visit_all(visitor, defaults)
            }
        }
    }
}

impl Expr {
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        match self {
            Expr::Int { .. }
            | Expr::Float { .. }
            | Expr::Str { .. }
            | Expr::Bool { .. }
            | Expr::Null { .. }
            | Expr::Ident(_)
            | Expr::This(_)
            | Expr::Super(_) => Ok(()),
            Expr::Array { items, .. } => visit_all(visitor, items.iter()),
            Expr::Member { object, .. } => visitor.visit_expr(object),
            Expr::Index { object, index, .. } => visit_all(visitor, [&**object, &**index].into_iter()),
            Expr::Call { callee, args, .. } | Expr::New { class: callee, args, .. } => {
                visit_all(visitor, std::iter::once(&**callee).chain(args.iter()))
            }
            Expr::Unary { operand, .. } | Expr::Await { operand, .. } => visitor.visit_expr(operand),
            Expr::Binary { lhs, rhs, .. } => visit_all(visitor, [&**lhs, &**rhs].into_iter()),
            // the value runs before the store
            Expr::Assign { target, value, .. } => {
                visit_all(visitor, [&**value, &**target].into_iter())
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
                ..
            } => visit_all(visitor, [&**cond, &**then, &**otherwise].into_iter()),
            Expr::Function(func) => visitor.visit_function(func),
        }
    }
}

impl Stmt {
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        let direction = visitor.direction();
        match self {
            Stmt::Var(decl) => visit_all(visitor, decl.decls.iter().filter_map(|d| d.init.as_ref())),
            Stmt::Function(func) => visitor.visit_function(func),
            Stmt::Class(class) => {
                let mut parts: Vec<ClassPart<'_>> = Vec::new();
                if let Some(ctor) = &class.constructor {
                    parts.push(ClassPart::Function(ctor));
                }
                for member in &class.members {
                    match &member.kind {
                        ClassMemberKind::Method(func) => parts.push(ClassPart::Function(func)),
                        ClassMemberKind::Property { init: Some(init), .. } => {
                            parts.push(ClassPart::Expr(init))
                        }
                        ClassMemberKind::Property { init: None, .. } => {}
                    }
                }
                for part in ordered(&parts, direction) {
                    match part {
                        ClassPart::Function(func) => visitor.visit_function(func)?,
                        ClassPart::Expr(expr) => visitor.visit_expr(expr)?,
                    }
                }
                Ok(())
            }
            Stmt::Interface(_) | Stmt::Import(_) => Ok(()),
            Stmt::Enum(decl) => visit_all(visitor, decl.members.iter().filter_map(|m| m.value.as_ref())),
            Stmt::Expr(expr) | Stmt::Throw { value: expr, .. } => visitor.visit_expr(expr),
            Stmt::Return { value, .. } => match value {
                Some(value) => visitor.visit_expr(value),
                None => Ok(()),
            },
            Stmt::If {
                branches,
                otherwise,
                ..
            } => {
                if direction == Direction::Backward {
                    if let Some(otherwise) = otherwise {
                        visitor.visit_block(otherwise)?;
                    }
                }
                for branch in ordered(branches, direction) {
                    match direction {
                        Direction::Forward => {
                            visitor.visit_expr(&branch.cond)?;
                            visitor.visit_block(&branch.body)?;
                        }
                        Direction::Backward => {
                            visitor.visit_block(&branch.body)?;
                            visitor.visit_expr(&branch.cond)?;
                        }
                    }
                }
                if direction == Direction::Forward {
                    if let Some(otherwise) = otherwise {
                        visitor.visit_block(otherwise)?;
                    }
                }
                Ok(())
            }
            Stmt::While { cond, body, .. } => match direction {
                Direction::Forward => {
                    visitor.visit_expr(cond)?;
                    visitor.visit_block(body)
                }
                Direction::Backward => {
                    visitor.visit_block(body)?;
                    visitor.visit_expr(cond)
                }
            },
            Stmt::For {
                init,
                cond,
                step,
                body,
                ..
            } => {
                let head = cond.iter().chain(step.iter());
                match direction {
                    Direction::Forward => {
                        if let Some(init) = init {
                            visitor.visit_stmt(init)?;
                        }
                        visit_all(visitor, head)?;
                        visitor.visit_block(body)
                    }
                    Direction::Backward => {
                        visitor.visit_block(body)?;
                        visit_all(visitor, head)?;
                        match init {
                            Some(init) => visitor.visit_stmt(init),
                            None => Ok(()),
                        }
                    }
                }
            }
            Stmt::Switch { subject, cases, .. } => {
                if direction == Direction::Forward {
                    visitor.visit_expr(subject)?;
                }
                for case in ordered(cases, direction) {
                    match direction {
                        Direction::Forward => {
                            if let Some(test) = &case.test {
                                visitor.visit_expr(test)?;
                            }
                            visitor.visit_block(&case.body)?;
                        }
                        Direction::Backward => {
                            visitor.visit_block(&case.body)?;
                            if let Some(test) = &case.test {
                                visitor.visit_expr(test)?;
                            }
                        }
                    }
                }
                if direction == Direction::Backward {
                    visitor.visit_expr(subject)?;
                }
                Ok(())
            }
            Stmt::Block { body, .. } => visitor.visit_block(body),
            Stmt::Break { .. } | Stmt::Continue { .. } => Ok(()),
            Stmt::Try {
                body,
                catch,
                finally,
                ..
            } => {
                let mut blocks: Vec<&[Stmt]> = vec![body.as_slice()];
                if let Some(catch) = catch {
                    blocks.push(catch.body.as_slice());
                }
                if let Some(finally) = finally {
                    blocks.push(finally.as_slice());
                }
                for block in ordered(&blocks, direction) {
                    visitor.visit_block(block)?;
                }
                Ok(())
            }
            Stmt::Export(ExportDecl::Declaration { stmt, .. }) => visitor.visit_stmt(stmt),
            Stmt::Export(_) => Ok(()),
        }
    }
}

enum ClassPart<'a> {
    Function(&'a Function),
    Expr(&'a Expr),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{expr, stmt};

    /// Records identifier names in visiting order.
    struct Names {
        direction: Direction,
        seen: Vec<String>,
    }

    impl Visitor for Names {
        type Error = ();

        fn direction(&self) -> Direction {
            self.direction
        }

        fn visit_expr(&mut self, expr: &Expr) -> Result<(), ()> {
            if let Expr::Ident(ident) = expr {
                self.seen.push(ident.name.clone());
            }
            expr.walk(self)
        }
    }

    fn names(body: &[Stmt], direction: Direction) -> Vec<String> {
        let mut visitor = Names {
            direction,
            seen: Vec::new(),
        };
        visitor.visit_block(body).unwrap();
        visitor.seen
    }

    #[test]
    fn ordered_iterates_both_ways() {
        let items = [1, 2, 3];
        let fwd: Vec<_> = ordered(&items, Direction::Forward).copied().collect();
        let bwd: Vec<_> = ordered(&items, Direction::Backward).copied().collect();
        assert_eq!(fwd, [1, 2, 3]);
        assert_eq!(bwd, [3, 2, 1]);
    }

    #[test]
    fn backward_reverses_statements_and_operands() {
        let body = vec![
            stmt::expr(expr::call(expr::var("f"), vec![expr::var("a"), expr::var("b")])),
            stmt::expr(expr::binary(
                crate::BinaryOp::Add,
                expr::var("c"),
                expr::var("d"),
            )),
        ];

        assert_eq!(names(&body, Direction::Forward), ["f", "a", "b", "c", "d"]);
        assert_eq!(names(&body, Direction::Backward), ["d", "c", "b", "a", "f"]);
    }

    #[test]
    fn if_branches_reverse() {
        let body = vec![stmt::if_else(
            vec![
                (expr::var("c1"), vec![stmt::expr(expr::var("b1"))]),
                (expr::var("c2"), vec![stmt::expr(expr::var("b2"))]),
            ],
            Some(vec![stmt::expr(expr::var("e"))]),
        )];

        assert_eq!(names(&body, Direction::Forward), ["c1", "b1", "c2", "b2", "e"]);
        assert_eq!(names(&body, Direction::Backward), ["e", "b2", "c2", "b1", "c1"]);
    }

    #[test]
    fn assignment_visits_value_first() {
        let body = vec![stmt::expr(expr::assign(expr::var("x"), expr::var("y")))];
        assert_eq!(names(&body, Direction::Forward), ["y", "x"]);
        assert_eq!(names(&body, Direction::Backward), ["x", "y"]);
    }
}
