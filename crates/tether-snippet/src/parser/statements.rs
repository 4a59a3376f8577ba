//! Statement parsing for body-replacement snippets.

use tether_common::token::TokenKind;

use crate::ast::{DeclKind, Declarator, Stmt, StmtKind};
use crate::error::SnippetError;

use super::{expressions, Parser};

type PResult<T> = Result<T, SnippetError>;

/// Parse statements until `end` (not consumed).
pub(crate) fn statement_list(p: &mut Parser, end: TokenKind) -> PResult<Vec<Stmt>> {
    let mut stmts = Vec::new();
    loop {
        while p.eat(TokenKind::Semicolon) {}
        if p.at(end) || p.at(TokenKind::Eof) {
            break;
        }
        stmts.push(statement(p)?);
    }
    Ok(stmts)
}

/// `{ stmt* }` as used by function bodies.
pub(crate) fn block_body(p: &mut Parser) -> PResult<Vec<Stmt>> {
    p.expect(TokenKind::LBrace)?;
    let stmts = statement_list(p, TokenKind::RBrace)?;
    p.expect(TokenKind::RBrace)?;
    Ok(stmts)
}

fn statement(p: &mut Parser) -> PResult<Stmt> {
    p.nested(statement_inner)
}

fn statement_inner(p: &mut Parser) -> PResult<Stmt> {
    let start = p.current_span().start;
    let kind = match p.current() {
        TokenKind::LBrace => StmtKind::Block(block_body(p)?),
        TokenKind::Var | TokenKind::Let | TokenKind::Const => {
            let kind = var_decl(p)?;
            terminator(p)?;
            kind
        }
        TokenKind::If => if_stmt(p)?,
        TokenKind::While => {
            p.bump();
            let test = paren_expr(p)?;
            let body = Box::new(statement(p)?);
            StmtKind::While { test, body }
        }
        TokenKind::For => for_stmt(p)?,
        TokenKind::Return => {
            p.bump();
            let value = if at_statement_end(p) {
                None
            } else {
                Some(expressions::expr(p)?)
            };
            terminator(p)?;
            StmtKind::Return(value)
        }
        TokenKind::Throw => {
            p.bump();
            if p.newline_before() {
                return Err(SnippetError::syntax(
                    "line break is not allowed after `throw`",
                    p.current_span(),
                ));
            }
            let value = expressions::expr(p)?;
            terminator(p)?;
            StmtKind::Throw(value)
        }
        TokenKind::Break => {
            p.bump();
            terminator(p)?;
            StmtKind::Break
        }
        TokenKind::Continue => {
            p.bump();
            terminator(p)?;
            StmtKind::Continue
        }
        _ => {
            let expr = expressions::expr(p)?;
            terminator(p)?;
            StmtKind::Expr(expr)
        }
    };
    Ok(Stmt::new(kind, p.span_from(start)))
}

/// Whether the statement may end here without an operand.
fn at_statement_end(p: &Parser) -> bool {
    matches!(
        p.current(),
        TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
    ) || p.newline_before()
}

/// Consume an explicit `;`, or accept an implied one before `}`, at end of
/// input, or across a line break.
fn terminator(p: &mut Parser) -> PResult<()> {
    if p.eat(TokenKind::Semicolon) || at_statement_end(p) {
        Ok(())
    } else {
        Err(p.unexpected("`;`"))
    }
}

fn var_decl(p: &mut Parser) -> PResult<StmtKind> {
    let kind = match p.current() {
        TokenKind::Let => DeclKind::Let,
        TokenKind::Const => DeclKind::Const,
        _ => DeclKind::Var,
    };
    p.bump();

    let mut decls = Vec::new();
    loop {
        let name = p.expect_ident()?;
        let init = if p.eat(TokenKind::Eq) {
            Some(expressions::assign_expr(p)?)
        } else {
            None
        };
        if kind == DeclKind::Const && init.is_none() {
            return Err(p.unexpected("`=`"));
        }
        decls.push(Declarator { name, init });
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    Ok(StmtKind::VarDecl { kind, decls })
}

fn paren_expr(p: &mut Parser) -> PResult<crate::ast::Expr> {
    p.expect(TokenKind::LParen)?;
    let expr = expressions::expr(p)?;
    p.expect(TokenKind::RParen)?;
    Ok(expr)
}

fn if_stmt(p: &mut Parser) -> PResult<StmtKind> {
    p.expect(TokenKind::If)?;
    let test = paren_expr(p)?;
    let then = Box::new(statement(p)?);
    let otherwise = if p.eat(TokenKind::Else) {
        Some(Box::new(statement(p)?))
    } else {
        None
    };
    Ok(StmtKind::If {
        test,
        then,
        otherwise,
    })
}

fn for_stmt(p: &mut Parser) -> PResult<StmtKind> {
    p.expect(TokenKind::For)?;
    p.expect(TokenKind::LParen)?;

    let init = match p.current() {
        TokenKind::Semicolon => None,
        TokenKind::Var | TokenKind::Let | TokenKind::Const => {
            let start = p.current_span().start;
            let kind = var_decl(p)?;
            Some(Box::new(Stmt::new(kind, p.span_from(start))))
        }
        _ => {
            let start = p.current_span().start;
            let expr = expressions::expr(p)?;
            Some(Box::new(Stmt::new(StmtKind::Expr(expr), p.span_from(start))))
        }
    };
    p.expect(TokenKind::Semicolon)?;

    let test = if p.at(TokenKind::Semicolon) {
        None
    } else {
        Some(expressions::expr(p)?)
    };
    p.expect(TokenKind::Semicolon)?;

    let update = if p.at(TokenKind::RParen) {
        None
    } else {
        Some(expressions::expr(p)?)
    };
    p.expect(TokenKind::RParen)?;

    let body = Box::new(statement(p)?);
    Ok(StmtKind::For {
        init,
        test,
        update,
        body,
    })
}

#[cfg(test)]
mod tests {
    use tether_common::decl::BindingMode;

    use super::super::parse_snippet;
    use crate::ast::{ExprKind, FragmentBody, StmtKind};

    fn body(src: &str) -> Vec<crate::ast::Stmt> {
        match parse_snippet(src, BindingMode::BodyReplacement).unwrap().body {
            FragmentBody::Body(stmts) => stmts,
            FragmentBody::Expr(_) => panic!("expected body"),
        }
    }

    #[test]
    fn newline_ends_statement() {
        let stmts = body("var x = $a\nx + 1");
        assert_eq!(stmts.len(), 2);
        assert!(matches!(stmts[0].kind, StmtKind::VarDecl { .. }));
        assert!(matches!(stmts[1].kind, StmtKind::Return(Some(_))));
    }

    #[test]
    fn same_line_statements_need_semicolon() {
        let err = parse_snippet("a b", BindingMode::BodyReplacement).unwrap_err();
        assert_eq!(err.to_string(), "expected `;`, found `b`");
    }

    #[test]
    fn bare_return_before_brace() {
        let stmts = body("if ($a) { return } else { $b() }");
        let StmtKind::If { then, otherwise, .. } = &stmts[0].kind else {
            panic!("expected if");
        };
        let StmtKind::Block(inner) = &then.kind else {
            panic!("expected block");
        };
        assert_eq!(inner[0].kind, StmtKind::Return(None));
        assert!(otherwise.is_some());
    }

    #[test]
    fn for_loop_with_all_clauses() {
        let stmts = body("for (let i = 0; i < $n; i++) { $f(i); }");
        let StmtKind::For { init, test, update, .. } = &stmts[0].kind else {
            panic!("expected for");
        };
        assert!(init.is_some());
        assert!(matches!(test.as_ref().map(|e| &e.kind), Some(ExprKind::Binary { .. })));
        assert!(matches!(update.as_ref().map(|e| &e.kind), Some(ExprKind::Update { .. })));
    }

    #[test]
    fn const_requires_initializer() {
        let err = parse_snippet("const x;", BindingMode::BodyReplacement).unwrap_err();
        assert_eq!(err.to_string(), "expected `=`, found `;`");
    }

    #[test]
    fn stray_semicolons_are_skipped() {
        assert_eq!(body(";; $a();;").len(), 1);
    }
}
