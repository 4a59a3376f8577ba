//! Pratt expression parser for snippets.
//!
//! Covers the target language's expression grammar: literals, identifiers,
//! placeholders, array/object literals, member/index access, calls, `new`,
//! unary/update/binary operators, conditionals, assignment, the comma
//! operator, `function` expressions and arrow functions.

use tether_common::span::Span;
use tether_common::token::TokenKind;

use crate::ast::{
    ArrowBody, AssignOp, BinaryOp, Expr, ExprKind, Hole, PropKey, Property, UnaryOp, UpdateOp,
};
use crate::error::SnippetError;

use super::{statements, Parser};

type PResult<T> = Result<T, SnippetError>;

// ── Binding Power Tables ───────────────────────────────────────────────

/// Returns `(left_bp, right_bp, op)` for infix operators.
///
/// Left < right means left-associative; `**` is the one right-associative
/// operator.
fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8, BinaryOp)> {
    let entry = match kind {
        TokenKind::QuestionQuestion => (1, 2, BinaryOp::Nullish),
        TokenKind::PipePipe => (3, 4, BinaryOp::Or),
        TokenKind::AmpAmp => (5, 6, BinaryOp::And),
        TokenKind::Pipe => (7, 8, BinaryOp::BitOr),
        TokenKind::Caret => (9, 10, BinaryOp::BitXor),
        TokenKind::Amp => (11, 12, BinaryOp::BitAnd),
        TokenKind::EqEq => (13, 14, BinaryOp::Eq),
        TokenKind::NotEq => (13, 14, BinaryOp::NotEq),
        TokenKind::EqEqEq => (13, 14, BinaryOp::StrictEq),
        TokenKind::NotEqEq => (13, 14, BinaryOp::StrictNotEq),
        TokenKind::Lt => (15, 16, BinaryOp::Lt),
        TokenKind::Gt => (15, 16, BinaryOp::Gt),
        TokenKind::LtEq => (15, 16, BinaryOp::LtEq),
        TokenKind::GtEq => (15, 16, BinaryOp::GtEq),
        TokenKind::In => (15, 16, BinaryOp::In),
        TokenKind::Instanceof => (15, 16, BinaryOp::Instanceof),
        TokenKind::Shl => (17, 18, BinaryOp::Shl),
        TokenKind::Shr => (17, 18, BinaryOp::Shr),
        TokenKind::UShr => (17, 18, BinaryOp::UShr),
        TokenKind::Plus => (19, 20, BinaryOp::Add),
        TokenKind::Minus => (19, 20, BinaryOp::Sub),
        TokenKind::Star => (21, 22, BinaryOp::Mul),
        TokenKind::Slash => (21, 22, BinaryOp::Div),
        TokenKind::Percent => (21, 22, BinaryOp::Rem),
        TokenKind::StarStar => (24, 23, BinaryOp::Pow),
        _ => return None,
    };
    Some(entry)
}

fn prefix_op(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Bang => Some(UnaryOp::Not),
        TokenKind::Tilde => Some(UnaryOp::BitNot),
        TokenKind::Typeof => Some(UnaryOp::Typeof),
        TokenKind::Void => Some(UnaryOp::Void),
        TokenKind::Delete => Some(UnaryOp::Delete),
        _ => None,
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Eq => Some(AssignOp::Assign),
        TokenKind::PlusEq => Some(AssignOp::Add),
        TokenKind::MinusEq => Some(AssignOp::Sub),
        TokenKind::StarEq => Some(AssignOp::Mul),
        TokenKind::SlashEq => Some(AssignOp::Div),
        TokenKind::PercentEq => Some(AssignOp::Rem),
        _ => None,
    }
}

/// Operand binding power of prefix operators.
const PREFIX_BP: u8 = 25;

/// Postfix `++`/`--`.
const POSTFIX_UPDATE_BP: u8 = 26;

/// Member access, indexing and calls bind tightest.
const POSTFIX_BP: u8 = 27;

// ── Expression Entry Points ────────────────────────────────────────────

/// Full expression, including the comma operator.
pub(crate) fn expr(p: &mut Parser) -> PResult<Expr> {
    let first = assign_expr(p)?;
    if !p.at(TokenKind::Comma) {
        return Ok(first);
    }
    let start = first.span.start;
    let mut items = vec![first];
    while p.eat(TokenKind::Comma) {
        items.push(assign_expr(p)?);
    }
    Ok(Expr::new(ExprKind::Sequence(items), p.span_from(start)))
}

/// Assignment-level expression: arrow functions, assignment, conditional.
pub(crate) fn assign_expr(p: &mut Parser) -> PResult<Expr> {
    if at_arrow(p) {
        return arrow(p);
    }

    let start = p.current_span().start;
    let lhs = conditional(p)?;

    if let Some(op) = assign_op(p.current()) {
        if !is_assign_target(&lhs) {
            return Err(SnippetError::syntax(
                "invalid assignment target",
                lhs.span,
            ));
        }
        p.bump();
        let value = assign_expr(p)?;
        return Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(lhs),
                value: Box::new(value),
            },
            p.span_from(start),
        ));
    }

    Ok(lhs)
}

fn is_assign_target(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Ident(_)
            | ExprKind::Hole(_)
            | ExprKind::Member { optional: false, .. }
            | ExprKind::Index { .. }
    )
}

fn conditional(p: &mut Parser) -> PResult<Expr> {
    let start = p.current_span().start;
    let test = expr_bp(p, 0)?;
    if !p.eat(TokenKind::Question) {
        return Ok(test);
    }
    let consequent = assign_expr(p)?;
    p.expect(TokenKind::Colon)?;
    let alternate = assign_expr(p)?;
    Ok(Expr::new(
        ExprKind::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        },
        p.span_from(start),
    ))
}

/// Core Pratt loop: an operand, then postfix and infix operators whose
/// binding power is at least `min_bp`.
fn expr_bp(p: &mut Parser, min_bp: u8) -> PResult<Expr> {
    p.nested(|p| expr_bp_inner(p, min_bp))
}

fn expr_bp_inner(p: &mut Parser, min_bp: u8) -> PResult<Expr> {
    let start = p.current_span().start;
    let mut lhs = prefix(p)?;

    loop {
        let current = p.current();

        // ── Postfix: call, member, optional member, index ──
        if POSTFIX_BP >= min_bp {
            match current {
                TokenKind::LParen => {
                    let args = arg_list(p)?;
                    lhs = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(lhs),
                            args,
                        },
                        p.span_from(start),
                    );
                    continue;
                }
                TokenKind::Dot | TokenKind::QuestionDot => {
                    p.bump();
                    lhs = member(p, lhs, current == TokenKind::QuestionDot, start)?;
                    continue;
                }
                TokenKind::LBracket => {
                    p.bump();
                    let index = expr(p)?;
                    p.expect(TokenKind::RBracket)?;
                    lhs = Expr::new(
                        ExprKind::Index {
                            object: Box::new(lhs),
                            index: Box::new(index),
                        },
                        p.span_from(start),
                    );
                    continue;
                }
                _ => {}
            }
        }

        // ── Postfix: `++` / `--` on the same line ──
        if matches!(current, TokenKind::PlusPlus | TokenKind::MinusMinus)
            && POSTFIX_UPDATE_BP >= min_bp
            && !p.newline_before()
        {
            p.bump();
            let op = if current == TokenKind::PlusPlus {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            lhs = Expr::new(
                ExprKind::Update {
                    op,
                    prefix: false,
                    operand: Box::new(lhs),
                },
                p.span_from(start),
            );
            continue;
        }

        // ── Infix operators ──
        if let Some((l_bp, r_bp, op)) = infix_binding_power(current) {
            if l_bp < min_bp {
                break;
            }
            p.bump();
            let rhs = expr_bp(p, r_bp)?;
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                p.span_from(start),
            );
            continue;
        }

        break;
    }

    Ok(lhs)
}

fn prefix(p: &mut Parser) -> PResult<Expr> {
    let start = p.current_span().start;
    let current = p.current();

    if let Some(op) = prefix_op(current) {
        p.bump();
        let operand = expr_bp(p, PREFIX_BP)?;
        return Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            p.span_from(start),
        ));
    }

    if matches!(current, TokenKind::PlusPlus | TokenKind::MinusMinus) {
        p.bump();
        let operand = expr_bp(p, PREFIX_BP)?;
        let op = if current == TokenKind::PlusPlus {
            UpdateOp::Inc
        } else {
            UpdateOp::Dec
        };
        return Ok(Expr::new(
            ExprKind::Update {
                op,
                prefix: true,
                operand: Box::new(operand),
            },
            p.span_from(start),
        ));
    }

    primary(p)
}

fn member(p: &mut Parser, object: Expr, optional: bool, start: u32) -> PResult<Expr> {
    if !p.at_property_name() {
        return Err(p.unexpected("property name"));
    }
    let property = p.bump().to_string();
    Ok(Expr::new(
        ExprKind::Member {
            object: Box::new(object),
            property,
            optional,
        },
        p.span_from(start),
    ))
}

fn arg_list(p: &mut Parser) -> PResult<Vec<Expr>> {
    p.expect(TokenKind::LParen)?;
    let mut args = Vec::new();
    while !p.at(TokenKind::RParen) {
        args.push(assign_expr(p)?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen)?;
    Ok(args)
}

// ── Atoms ──────────────────────────────────────────────────────────────

fn primary(p: &mut Parser) -> PResult<Expr> {
    let start = p.current_span().start;
    let span = p.current_span();
    let kind = match p.current() {
        TokenKind::Number => ExprKind::Number(p.bump().to_string()),
        TokenKind::String => ExprKind::Str(p.bump().to_string()),
        TokenKind::True => {
            p.bump();
            ExprKind::Bool(true)
        }
        TokenKind::False => {
            p.bump();
            ExprKind::Bool(false)
        }
        TokenKind::Null => {
            p.bump();
            ExprKind::Null
        }
        TokenKind::This => {
            p.bump();
            ExprKind::This
        }
        TokenKind::Ident => ExprKind::Ident(p.bump().to_string()),
        TokenKind::Placeholder => placeholder(p.bump(), span)?,
        TokenKind::LParen => {
            p.bump();
            let inner = expr(p)?;
            p.expect(TokenKind::RParen)?;
            // Grouping is not kept in the tree; the printer re-derives parens.
            return Ok(Expr::new(inner.kind, p.span_from(start)));
        }
        TokenKind::LBracket => array(p)?,
        TokenKind::LBrace => object(p)?,
        TokenKind::Function => function(p)?,
        TokenKind::New => return new_expr(p),
        _ => return Err(p.unexpected("expression")),
    };
    Ok(Expr::new(kind, p.span_from(start)))
}

/// Interpret placeholder text: `$global`, `$this`, `$<digits>`, `$<name>`.
fn placeholder(text: &str, span: Span) -> PResult<ExprKind> {
    let name = &text[1..];
    let kind = match name {
        "global" => ExprKind::Global,
        "this" => ExprKind::Hole(Hole::SelfImplicit),
        _ if name.bytes().all(|b| b.is_ascii_digit()) => {
            let index = name.parse::<u32>().map_err(|_| {
                SnippetError::syntax(format!("placeholder index `{text}` is out of range"), span)
            })?;
            ExprKind::Hole(Hole::ByIndex(index))
        }
        _ => ExprKind::Hole(Hole::ByName(name.to_string())),
    };
    Ok(kind)
}

fn array(p: &mut Parser) -> PResult<ExprKind> {
    p.expect(TokenKind::LBracket)?;
    let mut items = Vec::new();
    while !p.at(TokenKind::RBracket) {
        items.push(assign_expr(p)?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RBracket)?;
    Ok(ExprKind::Array(items))
}

fn object(p: &mut Parser) -> PResult<ExprKind> {
    p.expect(TokenKind::LBrace)?;
    let mut props = Vec::new();
    while !p.at(TokenKind::RBrace) {
        props.push(property(p)?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RBrace)?;
    Ok(ExprKind::Object(props))
}

fn property(p: &mut Parser) -> PResult<Property> {
    let key_span = p.current_span();
    let key = match p.current() {
        TokenKind::String => PropKey::Str(p.bump().to_string()),
        TokenKind::Number => PropKey::Number(p.bump().to_string()),
        TokenKind::LBracket => {
            p.bump();
            let key = assign_expr(p)?;
            p.expect(TokenKind::RBracket)?;
            PropKey::Computed(Box::new(key))
        }
        _ if p.at_property_name() => PropKey::Ident(p.bump().to_string()),
        _ => return Err(p.unexpected("property name")),
    };

    if p.eat(TokenKind::Colon) {
        let value = assign_expr(p)?;
        return Ok(Property { key, value });
    }

    // Shorthand `{ name }` only for plain identifiers.
    match key {
        PropKey::Ident(name) if !matches!(p.current(), TokenKind::Colon) => {
            if tether_common::token::keyword_from_str(&name).is_some() {
                return Err(SnippetError::syntax(
                    format!("`{name}` cannot be used as a shorthand property"),
                    key_span,
                ));
            }
            let value = Expr::new(ExprKind::Ident(name.clone()), key_span);
            Ok(Property {
                key: PropKey::Ident(name),
                value,
            })
        }
        _ => Err(p.unexpected("`:`")),
    }
}

fn function(p: &mut Parser) -> PResult<ExprKind> {
    p.expect(TokenKind::Function)?;
    if p.at(TokenKind::Ident) {
        return Err(SnippetError::syntax(
            "named function expressions are not supported in snippets",
            p.current_span(),
        ));
    }
    let params = param_list(p)?;
    let body = statements::block_body(p)?;
    Ok(ExprKind::Function { params, body })
}

fn param_list(p: &mut Parser) -> PResult<Vec<String>> {
    p.expect(TokenKind::LParen)?;
    let mut params = Vec::new();
    while !p.at(TokenKind::RParen) {
        params.push(p.expect_ident()?);
        if !p.eat(TokenKind::Comma) {
            break;
        }
    }
    p.expect(TokenKind::RParen)?;
    Ok(params)
}

/// `new Callee(args)`; the callee is a member chain without calls, and the
/// argument list is optional.
fn new_expr(p: &mut Parser) -> PResult<Expr> {
    let start = p.current_span().start;
    p.expect(TokenKind::New)?;

    let callee_start = p.current_span().start;
    let mut callee = if p.at(TokenKind::New) {
        p.nested(new_expr)?
    } else {
        primary(p)?
    };
    loop {
        match p.current() {
            TokenKind::Dot => {
                p.bump();
                callee = member(p, callee, false, callee_start)?;
            }
            TokenKind::LBracket => {
                p.bump();
                let index = expr(p)?;
                p.expect(TokenKind::RBracket)?;
                callee = Expr::new(
                    ExprKind::Index {
                        object: Box::new(callee),
                        index: Box::new(index),
                    },
                    p.span_from(callee_start),
                );
            }
            _ => break,
        }
    }

    let args = if p.at(TokenKind::LParen) {
        arg_list(p)?
    } else {
        Vec::new()
    };
    Ok(Expr::new(
        ExprKind::New {
            callee: Box::new(callee),
            args,
        },
        p.span_from(start),
    ))
}

// ── Arrow functions ────────────────────────────────────────────────────

/// `x => ...` or `( ... ) => ...` starts at the current token.
fn at_arrow(p: &Parser) -> bool {
    match p.current() {
        TokenKind::Ident => p.nth(1) == TokenKind::FatArrow,
        TokenKind::LParen => p
            .skip_group(TokenKind::LParen, TokenKind::RParen)
            .is_some_and(|after| p.kind_at(after) == TokenKind::FatArrow),
        _ => false,
    }
}

fn arrow(p: &mut Parser) -> PResult<Expr> {
    let start = p.current_span().start;
    let params = if p.at(TokenKind::Ident) {
        vec![p.expect_ident()?]
    } else {
        param_list(p)?
    };
    p.expect(TokenKind::FatArrow)?;
    let body = if p.at(TokenKind::LBrace) {
        ArrowBody::Block(statements::block_body(p)?)
    } else {
        ArrowBody::Expr(Box::new(assign_expr(p)?))
    };
    Ok(Expr::new(ExprKind::Arrow { params, body }, p.span_from(start)))
}

#[cfg(test)]
mod tests {
    use super::super::parse_expression;
    use super::*;

    fn parse(src: &str) -> Expr {
        parse_expression(src).unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let e = parse("$a + $b * 2");
        let ExprKind::Binary { op, rhs, .. } = e.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(rhs.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn exponent_is_right_associative() {
        let e = parse("a ** b ** c");
        let ExprKind::Binary { lhs, rhs, .. } = e.kind else {
            panic!("expected binary");
        };
        assert!(matches!(lhs.kind, ExprKind::Ident(_)));
        assert!(matches!(rhs.kind, ExprKind::Binary { op: BinaryOp::Pow, .. }));
    }

    #[test]
    fn placeholders_become_holes() {
        assert_eq!(parse("$0").kind, ExprKind::Hole(Hole::ByIndex(0)));
        assert_eq!(parse("$name").kind, ExprKind::Hole(Hole::ByName("name".into())));
        assert_eq!(parse("$this").kind, ExprKind::Hole(Hole::SelfImplicit));
        assert_eq!(parse("$global").kind, ExprKind::Global);
    }

    #[test]
    fn new_without_arguments() {
        let e = parse("new $T");
        let ExprKind::New { args, .. } = e.kind else {
            panic!("expected new");
        };
        assert!(args.is_empty());
    }

    #[test]
    fn new_binds_member_chain_then_call() {
        let e = parse("new ns.Widget($0).render()");
        let ExprKind::Call { callee, .. } = e.kind else {
            panic!("expected call");
        };
        let ExprKind::Member { object, property, .. } = callee.kind else {
            panic!("expected member");
        };
        assert_eq!(property, "render");
        assert!(matches!(object.kind, ExprKind::New { .. }));
    }

    #[test]
    fn arrow_with_parenthesized_params() {
        let e = parse("(a, b) => a + b");
        let ExprKind::Arrow { params, body } = e.kind else {
            panic!("expected arrow");
        };
        assert_eq!(params, vec!["a".to_string(), "b".to_string()]);
        assert!(matches!(body, ArrowBody::Expr(_)));
    }

    #[test]
    fn grouping_keeps_outer_span() {
        let e = parse("($a + 1)");
        assert_eq!(e.span, Span::new(0, 8));
    }

    #[test]
    fn keyword_property_names_are_allowed() {
        let e = parse("$p.default.new");
        let ExprKind::Member { property, .. } = e.kind else {
            panic!("expected member");
        };
        assert_eq!(property, "new");
    }

    #[test]
    fn object_shorthand_and_computed_keys() {
        let e = parse("{ a, 'b': 1, [$k]: $v }");
        let ExprKind::Object(props) = e.kind else {
            panic!("expected object");
        };
        assert_eq!(props.len(), 3);
        assert_eq!(props[0].value.kind, ExprKind::Ident("a".into()));
        assert!(matches!(props[2].key, PropKey::Computed(_)));
    }

    #[test]
    fn invalid_assignment_target() {
        let err = parse_expression("$a + 1 = 2").unwrap_err();
        assert_eq!(err.to_string(), "invalid assignment target");
        assert_eq!(err.span, Span::new(0, 6));
    }

    #[test]
    fn missing_operand_reports_position() {
        let err = parse_expression("$a + ").unwrap_err();
        assert_eq!(err.to_string(), "expected expression, found end of snippet");
        assert_eq!(err.span, Span::point(5));
    }
}
