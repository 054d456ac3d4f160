//! Return path verification for functions with a declared return value.
//!
//! The check is structural: a statement list returns on every path when its
//! last reachable statement does. `if` needs an `else` whose branches all
//! return, `switch` needs a `default` and every clause that doesn't fall
//! through to return, and `try` returns when its body and handler both do (or
//! its `finally` does).
//!
//! `while (true)` without a `break` counts as returning, since control never
//! leaves it normally.

use wtscript_syntax::{Expr, Stmt};

/// Whether every path through `stmts` ends in `return` or `throw`.
pub fn all_paths_return(stmts: &[Stmt]) -> bool {
    stmts.iter().any(returns)
}

fn returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return { .. } | Stmt::Throw { .. } => true,
        Stmt::Block { body, .. } => all_paths_return(body),
        Stmt::If {
            branches,
            otherwise: Some(otherwise),
            ..
        } => branches.iter().all(|b| all_paths_return(&b.body)) && all_paths_return(otherwise),
        Stmt::Switch { cases, .. } => {
            cases.iter().any(|c| c.test.is_none())
                && cases
                    .iter()
                    .enumerate()
                    .all(|(i, case)| falls_through(case.body.as_slice(), i + 1 < cases.len()) || all_paths_return(&case.body))
        }
        Stmt::Try {
            body,
            catch,
            finally,
            ..
        } => {
            finally.as_deref().is_some_and(all_paths_return)
                || (all_paths_return(body)
                    && catch.as_ref().is_none_or(|catch| all_paths_return(&catch.body)))
        }
        Stmt::While {
            cond: Expr::Bool { value: true, .. },
            body,
            ..
        } => !breaks(body),
        _ => false,
    }
}

/// An empty clause that isn't last shares the next clause's body.
fn falls_through(body: &[Stmt], has_next: bool) -> bool {
    body.is_empty() && has_next
}

/// Whether a `break` leaves the loop whose body is `stmts`.
fn breaks(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::Break { .. } => true,
        Stmt::Block { body, .. } => breaks(body),
        Stmt::If {
            branches,
            otherwise,
            ..
        } => branches.iter().any(|b| breaks(&b.body)) || otherwise.as_deref().is_some_and(breaks),
        Stmt::Try {
            body,
            catch,
            finally,
            ..
        } => {
            breaks(body)
                || catch.as_ref().is_some_and(|c| breaks(&c.body))
                || finally.as_deref().is_some_and(breaks)
        }
        // nested loops and switches own their breaks
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wtscript_syntax::build::{expr, stmt};

    fn ret() -> Stmt {
        stmt::ret(Some(expr::int(1)))
    }

    #[test]
    fn empty_body_does_not_return() {
        assert!(!all_paths_return(&[]));
    }

    #[test]
    fn direct_return_and_throw() {
        assert!(all_paths_return(&[stmt::expr(expr::int(1)), ret()]));
        assert!(all_paths_return(&[stmt::throw(expr::string("x"))]));
    }

    #[test]
    fn if_needs_else() {
        assert!(!all_paths_return(&[stmt::if_(expr::var("c"), vec![ret()])]));
        assert!(all_paths_return(&[stmt::if_else(
            vec![(expr::var("c"), vec![ret()])],
            Some(vec![ret()]),
        )]));
        assert!(!all_paths_return(&[stmt::if_else(
            vec![(expr::var("c"), vec![ret()])],
            Some(vec![]),
        )]));
    }

    #[test]
    fn switch_needs_default() {
        let without_default = stmt::switch(expr::var("x"), vec![(Some(expr::int(1)), vec![ret()])]);
        assert!(!all_paths_return(&[without_default]));

        let with_default = stmt::switch(
            expr::var("x"),
            vec![(Some(expr::int(1)), vec![]), (Some(expr::int(2)), vec![ret()]), (None, vec![ret()])],
        );
        assert!(all_paths_return(&[with_default]));
    }

    #[test]
    fn try_catch_both_return() {
        let both = stmt::try_(vec![ret()], Some((None, vec![ret()])), None);
        assert!(all_paths_return(&[both]));

        let only_body = stmt::try_(vec![ret()], Some((None, vec![])), None);
        assert!(!all_paths_return(&[only_body]));

        let finally = stmt::try_(vec![], None, Some(vec![ret()]));
        assert!(all_paths_return(&[finally]));
    }

    #[test]
    fn infinite_loop_without_break() {
        assert!(all_paths_return(&[stmt::while_(expr::boolean(true), vec![])]));
        assert!(!all_paths_return(&[stmt::while_(expr::boolean(true), vec![stmt::break_()])]));
        assert!(!all_paths_return(&[stmt::while_(expr::var("c"), vec![ret()])]));
    }
}
