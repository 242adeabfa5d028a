use squiggle_ast::{ast::*, span::Span};
use squiggle_lexer::{lex_skip_comments, Lexed, Tok};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{message}")]
    Syntax { message: String, span: Span },
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Syntax { span, .. } | ParseError::UnexpectedEof { span, .. } => *span,
        }
    }
}

/// Deepest expression nesting the parser accepts. Left-associative chains count one
/// level per operator, which keeps the tree shallow enough for the recursive passes after it.
pub const MAX_NESTING_DEPTH: usize = 100;

/// Parse a whole source file.
pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let mut p = Parser::new(src);
    let (statements, result) = p.parse_body(false)?;
    if let Some(t) = p.peek() {
        return Err(p.unexpected(t, "end of input"));
    }
    Ok(Program { statements, result: result.map(Box::new), span: Span::new(0, src.len()) })
}

/// Parse a single expression (no top-level bindings).
pub fn parse_expr(src: &str) -> Result<Expr, ParseError> {
    let mut p = Parser::new(src);
    let e = p.parse_expression()?;
    if let Some(t) = p.peek() {
        return Err(p.unexpected(t, "end of input"));
    }
    Ok(e)
}

struct Parser<'a> {
    toks: Vec<Lexed<'a>>,
    i: usize,
    src_len: usize,
    depth: usize,
}

// Left binding powers; every level is left-associative except `to`
fn infix_op(t: &Tok) -> Option<(InfixOp, u8)> {
    Some(match t {
        Tok::PipePipe => (InfixOp::Or, 1),
        Tok::AmpAmp => (InfixOp::And, 2),
        Tok::EqEq => (InfixOp::Equal, 3),
        Tok::BangEq => (InfixOp::Unequal, 3),
        Tok::Less => (InfixOp::Smaller, 4),
        Tok::LessEq => (InfixOp::SmallerEq, 4),
        Tok::Greater => (InfixOp::Larger, 4),
        Tok::GreaterEq => (InfixOp::LargerEq, 4),
        Tok::To => (InfixOp::To, 5),
        Tok::Plus => (InfixOp::Add, 6),
        Tok::Minus => (InfixOp::Subtract, 6),
        Tok::Star => (InfixOp::Multiply, 7),
        Tok::Slash => (InfixOp::Divide, 7),
        Tok::Caret => (InfixOp::Pow, 8),
        _ => return None,
    })
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { toks: lex_skip_comments(src), i: 0, src_len: src.len(), depth: 0 }
    }

    fn peek(&self) -> Option<&Lexed<'a>> {
        self.toks.get(self.i)
    }

    fn peek_at(&self, n: usize) -> Option<&Lexed<'a>> {
        self.toks.get(self.i + n)
    }

    fn peek_is(&self, tok: &Tok) -> bool {
        self.peek().map(|t| &t.tok == tok).unwrap_or(false)
    }

    fn bump(&mut self) -> Option<Lexed<'a>> {
        let t = self.toks.get(self.i).cloned();
        if t.is_some() {
            self.i += 1;
        }
        t
    }

    fn eof_span(&self) -> Span {
        Span::new(self.src_len, 0)
    }

    fn prev_end(&self) -> usize {
        self.i
            .checked_sub(1)
            .and_then(|k| self.toks.get(k))
            .map(|t| t.span.end())
            .unwrap_or(0)
    }

    fn since(&self, start: usize) -> Span {
        let end = self.prev_end().max(start);
        Span::new(start, end - start)
    }

    fn unexpected(&self, t: &Lexed<'_>, expected: &str) -> ParseError {
        ParseError::Syntax {
            message: format!("Expected {}, found {}", expected, t.tok.describe()),
            span: t.span,
        }
    }

    fn eof(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedEof { expected: expected.to_string(), span: self.eof_span() }
    }

    // Errors leave `depth` unbalanced; parsing stops at the first error anyway.
    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            let span = self.peek().map(|t| t.span).unwrap_or_else(|| self.eof_span());
            return Err(ParseError::Syntax { message: "Expression is nested too deeply".into(), span });
        }
        Ok(())
    }

    fn expect(&mut self, tok: Tok, expected: &str) -> Result<Lexed<'a>, ParseError> {
        match self.peek() {
            Some(t) if t.tok == tok => {}
            Some(t) => return Err(self.unexpected(t, expected)),
            None => return Err(self.eof(expected)),
        }
        self.bump().ok_or_else(|| self.eof(expected))
    }

    fn expect_ident(&mut self, expected: &str) -> Result<Lexed<'a>, ParseError> {
        self.expect(Tok::Ident, expected)
    }

    // Statements followed by an optional final expression, up to EOF or a closing brace.
    fn parse_body(&mut self, in_braces: bool) -> Result<(Vec<Statement>, Option<Expr>), ParseError> {
        let mut statements = Vec::new();
        loop {
            while self.peek_is(&Tok::Semicolon) {
                self.bump();
            }
            match self.peek() {
                None => break,
                Some(t) if in_braces && t.tok == Tok::RBrace => break,
                Some(_) => {}
            }
            if self.at_statement_start() {
                let st = self.parse_statement()?;
                statements.push(st);
                match self.peek() {
                    None => {}
                    Some(t)
                        if t.newline_before
                            || t.tok == Tok::Semicolon
                            || (in_braces && t.tok == Tok::RBrace) => {}
                    Some(t) => return Err(self.unexpected(t, "';' or a new line after statement")),
                }
                continue;
            }
            let e = self.parse_expression()?;
            while self.peek_is(&Tok::Semicolon) {
                self.bump();
            }
            return Ok((statements, Some(e)));
        }
        Ok((statements, None))
    }

    // `name =` or `name(params) =`
    fn at_statement_start(&self) -> bool {
        let Some(first) = self.peek() else { return false };
        if first.tok != Tok::Ident {
            return false;
        }
        match self.peek_at(1) {
            Some(t) if t.tok == Tok::Eq => true,
            Some(t) if t.tok == Tok::LParen && !t.newline_before => {
                let mut depth = 0usize;
                let mut k = self.i + 1;
                while let Some(t) = self.toks.get(k) {
                    match t.tok {
                        Tok::LParen | Tok::LBracket | Tok::LBrace => depth += 1,
                        Tok::RParen | Tok::RBracket | Tok::RBrace => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                return matches!(self.toks.get(k + 1), Some(n) if n.tok == Tok::Eq);
                            }
                        }
                        _ => {}
                    }
                    k += 1;
                }
                false
            }
            _ => false,
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let name = self.expect_ident("a variable name")?;
        let start = name.span.offset;
        if self.peek_is(&Tok::LParen) {
            self.bump();
            let params = self.parse_params(Tok::RParen)?;
            self.expect(Tok::RParen, "')'")?;
            self.expect(Tok::Eq, "'='")?;
            let body = self.parse_expression()?;
            return Ok(Statement::new(
                StatementKind::Defun {
                    name: name.text.to_string(),
                    name_span: name.span,
                    params,
                    body,
                },
                self.since(start),
            ));
        }
        self.expect(Tok::Eq, "'='")?;
        let value = self.parse_expression()?;
        Ok(Statement::new(
            StatementKind::Let { name: name.text.to_string(), name_span: name.span, value },
            self.since(start),
        ))
    }

    // x, y: [1, 5], z   (closing token is left in place)
    fn parse_params(&mut self, close: Tok) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();
        if self.peek_is(&close) {
            return Ok(params);
        }
        loop {
            let id = self.expect_ident("a parameter name")?;
            let annotation = if self.peek_is(&Tok::Colon) {
                self.bump();
                Some(self.parse_expression()?)
            } else {
                None
            };
            params.push(Param {
                name: id.text.to_string(),
                annotation,
                span: self.since(id.span.offset),
            });
            if self.peek_is(&Tok::Comma) {
                self.bump();
                continue;
            }
            return Ok(params);
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.descend()?;
        let e = self.parse_conditional()?;
        self.depth -= 1;
        Ok(e)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        if self.peek_is(&Tok::If) {
            let kw = self.bump().ok_or_else(|| self.eof("'if'"))?;
            let condition = self.parse_expression()?;
            self.expect(Tok::Then, "'then'")?;
            let then_branch = self.parse_expression()?;
            self.expect(Tok::Else, "'else'")?;
            let else_branch = self.parse_expression()?;
            return Ok(Expr::new(
                ExprKind::Ternary {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                },
                self.since(kw.span.offset),
            ));
        }
        let condition = self.parse_binary(0)?;
        if !self.peek_is(&Tok::Question) {
            return Ok(condition);
        }
        self.bump();
        let then_branch = self.parse_expression()?;
        self.expect(Tok::Colon, "':' in ternary")?;
        let else_branch = self.parse_expression()?;
        let start = condition.span.offset;
        Ok(Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            self.since(start),
        ))
    }

    fn parse_binary(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_pipe()?;
        let mut nested = 0;
        loop {
            let Some((op, bp)) = self.peek().and_then(|t| infix_op(&t.tok)) else { break };
            if bp < min_bp {
                break;
            }
            self.bump();
            self.descend()?;
            nested += 1;
            let rhs = self.parse_binary(bp + 1)?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(ExprKind::Infix { op, left: Box::new(lhs), right: Box::new(rhs) }, span);
            if op == InfixOp::To {
                if let Some(t) = self.peek().filter(|t| t.tok == Tok::To) {
                    return Err(ParseError::Syntax {
                        message: "Operator 'to' cannot be chained".into(),
                        span: t.span,
                    });
                }
            }
        }
        self.depth -= nested;
        Ok(lhs)
    }

    // a -> f(b) -> g
    fn parse_pipe(&mut self) -> Result<Expr, ParseError> {
        let mut value = self.parse_unary()?;
        let mut nested = 0;
        while self.peek_is(&Tok::Arrow) {
            self.bump();
            self.descend()?;
            nested += 1;
            let target = self.parse_postfix()?;
            let span = value.span.to(target.span);
            let (callee, args) = match target.kind {
                ExprKind::Call { callee, args } => (callee, args),
                other => (Box::new(Expr::new(other, target.span)), Vec::new()),
            };
            value = Expr::new(ExprKind::Pipe { value: Box::new(value), callee, args }, span);
        }
        self.depth -= nested;
        Ok(value)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek().map(|t| t.tok.clone()) {
            Some(Tok::Minus) => UnaryOp::Minus,
            Some(Tok::Bang) => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let t = self.bump().ok_or_else(|| self.eof("an expression"))?;
        self.descend()?;
        let arg = self.parse_unary()?;
        self.depth -= 1;
        let span = t.span.to(arg.span);
        Ok(Expr::new(ExprKind::Unary { op, arg: Box::new(arg) }, span))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut e = self.parse_atom()?;
        let mut nested = 0;
        loop {
            let Some(t) = self.peek() else { break };
            // a line break ends the expression before '(' or '['
            let continues = match t.tok {
                Tok::LParen | Tok::LBracket => !t.newline_before,
                Tok::Dot => true,
                _ => false,
            };
            if !continues {
                break;
            }
            self.descend()?;
            nested += 1;
            let Some(t) = self.peek() else { break };
            match t.tok {
                Tok::LParen if !t.newline_before => {
                    self.bump();
                    let args = self.parse_list(Tok::RParen, "')'")?;
                    let span = self.since(e.span.offset);
                    e = Expr::new(ExprKind::Call { callee: Box::new(e), args }, span);
                }
                Tok::LBracket if !t.newline_before => {
                    self.bump();
                    let key = self.parse_expression()?;
                    self.expect(Tok::RBracket, "']'")?;
                    let span = self.since(e.span.offset);
                    e = Expr::new(ExprKind::BracketLookup { target: Box::new(e), key: Box::new(key) }, span);
                }
                Tok::Dot => {
                    self.bump();
                    let field = self.expect_ident("a field name after '.'")?;
                    // `x.Foo.bar` lexes its tail as one qualified identifier
                    for (k, part) in field.text.split('.').enumerate() {
                        if k > 0 {
                            self.descend()?;
                            nested += 1;
                        }
                        let span = self.since(e.span.offset);
                        e = Expr::new(
                            ExprKind::DotLookup { target: Box::new(e), field: part.to_string() },
                            span,
                        );
                    }
                }
                _ => break,
            }
        }
        self.depth -= nested;
        Ok(e)
    }

    // Comma-separated expressions with optional trailing comma; consumes the closer.
    fn parse_list(&mut self, close: Tok, expected: &str) -> Result<Vec<Expr>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.peek_is(&close) {
                self.bump();
                return Ok(items);
            }
            items.push(self.parse_expression()?);
            match self.peek() {
                Some(t) if t.tok == Tok::Comma => {
                    self.bump();
                }
                Some(t) if t.tok == close => {}
                Some(t) => return Err(self.unexpected(t, &format!("',' or {}", expected))),
                None => return Err(self.eof(expected)),
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let t = self.bump().ok_or_else(|| self.eof("an expression"))?;
        Ok(match &t.tok {
            Tok::Number(n) => Expr::new(ExprKind::Number(*n), t.span),
            Tok::Str(s) => Expr::new(ExprKind::Str(s.clone()), t.span),
            Tok::True => Expr::new(ExprKind::Bool(true), t.span),
            Tok::False => Expr::new(ExprKind::Bool(false), t.span),
            Tok::Ident => Expr::new(ExprKind::Ident(t.text.to_string()), t.span),
            Tok::LParen => {
                if self.peek_is(&Tok::RParen) {
                    self.bump();
                    return Ok(Expr::new(ExprKind::Void, self.since(t.span.offset)));
                }
                let inner = self.parse_expression()?;
                self.expect(Tok::RParen, "')'")?;
                Expr::new(inner.kind, self.since(t.span.offset))
            }
            Tok::LBracket => {
                let items = self.parse_list(Tok::RBracket, "']'")?;
                Expr::new(ExprKind::Array(items), self.since(t.span.offset))
            }
            Tok::LBrace => self.parse_brace(t.span.offset)?,
            _ => return Err(self.unexpected(&t, "an expression")),
        })
    }

    // After '{': lambda, dict, or block
    fn parse_brace(&mut self, start: usize) -> Result<Expr, ParseError> {
        let next = self.peek().map(|t| t.tok.clone());
        match next {
            Some(Tok::Pipe) => {
                self.bump();
                let params = self.parse_params(Tok::Pipe)?;
                self.expect(Tok::Pipe, "'|' after lambda parameters")?;
                self.parse_lambda_body(start, params)
            }
            Some(Tok::PipePipe) => {
                self.bump();
                self.parse_lambda_body(start, Vec::new())
            }
            Some(Tok::RBrace) => {
                self.bump();
                Ok(Expr::new(ExprKind::Dict(Vec::new()), self.since(start)))
            }
            Some(Tok::Ident) | Some(Tok::Str(_))
                if matches!(self.peek_at(1), Some(t) if t.tok == Tok::Colon) =>
            {
                self.parse_dict(start)
            }
            _ => {
                let (statements, result) = self.parse_body(true)?;
                let close = self.expect(Tok::RBrace, "'}'")?;
                let result = result.ok_or_else(|| ParseError::Syntax {
                    message: "A block must end with an expression".into(),
                    span: close.span,
                })?;
                Ok(Expr::new(
                    ExprKind::Block { statements, result: Box::new(result) },
                    self.since(start),
                ))
            }
        }
    }

    fn parse_lambda_body(&mut self, start: usize, params: Vec<Param>) -> Result<Expr, ParseError> {
        let body_start = self.peek().map(|t| t.span.offset).unwrap_or(self.src_len);
        let (statements, result) = self.parse_body(true)?;
        let close = self.expect(Tok::RBrace, "'}'")?;
        let result = result.ok_or_else(|| ParseError::Syntax {
            message: "A function body must end with an expression".into(),
            span: close.span,
        })?;
        let body = if statements.is_empty() {
            result
        } else {
            let span = Span::new(body_start, result.span.end().saturating_sub(body_start));
            Expr::new(ExprKind::Block { statements, result: Box::new(result) }, span)
        };
        Ok(Expr::new(ExprKind::Lambda { params, body: Box::new(body) }, self.since(start)))
    }

    fn parse_dict(&mut self, start: usize) -> Result<Expr, ParseError> {
        let mut entries = Vec::new();
        loop {
            if self.peek_is(&Tok::RBrace) {
                self.bump();
                break;
            }
            let k = self.bump().ok_or_else(|| self.eof("a dictionary key"))?;
            let key = match &k.tok {
                Tok::Ident => k.text.to_string(),
                Tok::Str(s) => s.clone(),
                _ => return Err(self.unexpected(&k, "a dictionary key")),
            };
            self.expect(Tok::Colon, "':' after dictionary key")?;
            let value = self.parse_expression()?;
            entries.push(DictEntry { key, key_span: k.span, value });
            match self.peek() {
                Some(t) if t.tok == Tok::Comma => {
                    self.bump();
                }
                Some(t) if t.tok == Tok::RBrace => {}
                Some(t) => return Err(self.unexpected(t, "',' or '}'")),
                None => return Err(self.eof("'}'")),
            }
        }
        Ok(Expr::new(ExprKind::Dict(entries), self.since(start)))
    }
}
