pub mod span {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
    pub struct Span {
        pub offset: usize,
        pub len: usize,
    }
    impl Span {
        pub fn new(offset: usize, len: usize) -> Self {
            Self { offset, len }
        }

        pub fn end(&self) -> usize {
            self.offset + self.len
        }

        /// Smallest span covering both `self` and `other`.
        pub fn to(&self, other: Span) -> Span {
            let start = self.offset.min(other.offset);
            let end = self.end().max(other.end());
            Span::new(start, end - start)
        }

        /// 1-based (line, column) of the span start within `src`.
        pub fn line_col(&self, src: &str) -> (usize, usize) {
            let upto = &src[..self.offset.min(src.len())];
            let line = upto.matches('\n').count() + 1;
            let col = upto.rsplit('\n').next().map(|s| s.chars().count()).unwrap_or(0) + 1;
            (line, col)
        }
    }
}

pub mod ast {
    use crate::span::Span;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum InfixOp {
        Add,
        Subtract,
        Multiply,
        Divide,
        Pow,
        Equal,
        Unequal,
        Smaller,
        SmallerEq,
        Larger,
        LargerEq,
        And,
        Or,
        To,
    }

    impl InfixOp {
        /// Standard library function an operator desugars to.
        pub fn builtin_name(self) -> &'static str {
            match self {
                InfixOp::Add => "add",
                InfixOp::Subtract => "subtract",
                InfixOp::Multiply => "multiply",
                InfixOp::Divide => "divide",
                InfixOp::Pow => "pow",
                InfixOp::Equal => "equal",
                InfixOp::Unequal => "unequal",
                InfixOp::Smaller => "smaller",
                InfixOp::SmallerEq => "smallerEq",
                InfixOp::Larger => "larger",
                InfixOp::LargerEq => "largerEq",
                InfixOp::And => "and",
                InfixOp::Or => "or",
                InfixOp::To => "to",
            }
        }

        pub fn symbol(self) -> &'static str {
            match self {
                InfixOp::Add => "+",
                InfixOp::Subtract => "-",
                InfixOp::Multiply => "*",
                InfixOp::Divide => "/",
                InfixOp::Pow => "^",
                InfixOp::Equal => "==",
                InfixOp::Unequal => "!=",
                InfixOp::Smaller => "<",
                InfixOp::SmallerEq => "<=",
                InfixOp::Larger => ">",
                InfixOp::LargerEq => ">=",
                InfixOp::And => "&&",
                InfixOp::Or => "||",
                InfixOp::To => "to",
            }
        }
    }

    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    pub enum UnaryOp {
        Minus,
        Not,
    }

    impl UnaryOp {
        pub fn builtin_name(self) -> &'static str {
            match self {
                UnaryOp::Minus => "unaryMinus",
                UnaryOp::Not => "not",
            }
        }
    }

    /// Lambda parameter, optionally annotated with a domain expression (`x: [3, 5]`).
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Param {
        pub name: String,
        pub annotation: Option<Expr>,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct DictEntry {
        pub key: String,
        pub key_span: Span,
        pub value: Expr,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub enum ExprKind {
        Void,
        Number(f64),
        Str(String),
        Bool(bool),
        Ident(String),
        Array(Vec<Expr>),
        Dict(Vec<DictEntry>),
        // { a = 1; a + 1 }
        Block {
            statements: Vec<Statement>,
            result: Box<Expr>,
        },
        Lambda {
            params: Vec<Param>,
            body: Box<Expr>,
        },
        Call {
            callee: Box<Expr>,
            args: Vec<Expr>,
        },
        Infix {
            op: InfixOp,
            left: Box<Expr>,
            right: Box<Expr>,
        },
        Unary {
            op: UnaryOp,
            arg: Box<Expr>,
        },
        // value -> f(args)
        Pipe {
            value: Box<Expr>,
            callee: Box<Expr>,
            args: Vec<Expr>,
        },
        DotLookup {
            target: Box<Expr>,
            field: String,
        },
        BracketLookup {
            target: Box<Expr>,
            key: Box<Expr>,
        },
        // `c ? a : b` and `if c then a else b`
        Ternary {
            condition: Box<Expr>,
            then_branch: Box<Expr>,
            else_branch: Box<Expr>,
        },
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Expr {
        pub kind: ExprKind,
        pub span: Span,
    }
    impl Expr {
        pub fn new(kind: ExprKind, span: Span) -> Self {
            Self { kind, span }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub enum StatementKind {
        Let {
            name: String,
            name_span: Span,
            value: Expr,
        },
        // f(x, y) = body
        Defun {
            name: String,
            name_span: Span,
            params: Vec<Param>,
            body: Expr,
        },
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Statement {
        pub kind: StatementKind,
        pub span: Span,
    }
    impl Statement {
        pub fn new(kind: StatementKind, span: Span) -> Self {
            Self { kind, span }
        }

        pub fn name(&self) -> &str {
            match &self.kind {
                StatementKind::Let { name, .. } | StatementKind::Defun { name, .. } => name,
            }
        }
    }

    /// A whole source file: top-level bindings plus an optional trailing expression.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    pub struct Program {
        pub statements: Vec<Statement>,
        pub result: Option<Box<Expr>>,
        pub span: Span,
    }
}

pub mod pretty {
    use crate::ast::*;

    fn print_params(params: &[Param]) -> String {
        params
            .iter()
            .map(|p| match &p.annotation {
                Some(a) => format!("{}: {}", p.name, print_expr(a)),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn print_list(xs: &[Expr]) -> String {
        xs.iter().map(print_expr).collect::<Vec<_>>().join(" ")
    }

    pub fn print_statement(s: &Statement) -> String {
        match &s.kind {
            StatementKind::Let { name, value, .. } => format!("(Let {} {})", name, print_expr(value)),
            StatementKind::Defun { name, params, body, .. } => {
                format!("(Defun {} ({}) {})", name, print_params(params), print_expr(body))
            }
        }
    }

    pub fn print_expr(e: &Expr) -> String {
        match &e.kind {
            ExprKind::Void => "()".to_string(),
            ExprKind::Number(n) => format!("{}", n),
            ExprKind::Str(s) => format!("\"{}\"", s.escape_default()),
            ExprKind::Bool(b) => format!("{}", b),
            ExprKind::Ident(n) => n.clone(),
            ExprKind::Array(xs) if xs.is_empty() => "(Array)".into(),
            ExprKind::Array(xs) => format!("(Array {})", print_list(xs)),
            ExprKind::Dict(entries) => {
                let inner = entries
                    .iter()
                    .map(|kv| format!(" ({} {})", kv.key, print_expr(&kv.value)))
                    .collect::<String>();
                format!("(Dict{})", inner)
            }
            ExprKind::Block { statements, result } => {
                let stmts = statements
                    .iter()
                    .map(|s| format!("{} ", print_statement(s)))
                    .collect::<String>();
                format!("(Block {}{})", stmts, print_expr(result))
            }
            ExprKind::Lambda { params, body } => {
                format!("(Lambda ({}) {})", print_params(params), print_expr(body))
            }
            ExprKind::Call { callee, args } if args.is_empty() => {
                format!("(Call {})", print_expr(callee))
            }
            ExprKind::Call { callee, args } => {
                format!("(Call {} {})", print_expr(callee), print_list(args))
            }
            ExprKind::Infix { op, left, right } => {
                format!("({} {} {})", op.symbol(), print_expr(left), print_expr(right))
            }
            ExprKind::Unary { op, arg } => match op {
                UnaryOp::Minus => format!("(-u {})", print_expr(arg)),
                UnaryOp::Not => format!("(! {})", print_expr(arg)),
            },
            ExprKind::Pipe { value, callee, args } => {
                let rest = args.iter().map(|a| format!(" {}", print_expr(a))).collect::<String>();
                format!("(-> {} {}{})", print_expr(value), print_expr(callee), rest)
            }
            ExprKind::DotLookup { target, field } => format!("(. {} {})", print_expr(target), field),
            ExprKind::BracketLookup { target, key } => {
                format!("([] {} {})", print_expr(target), print_expr(key))
            }
            ExprKind::Ternary { condition, then_branch, else_branch } => format!(
                "(? {} {} {})",
                print_expr(condition),
                print_expr(then_branch),
                print_expr(else_branch)
            ),
        }
    }

    pub fn print_program(p: &Program) -> String {
        let mut parts: Vec<String> = p.statements.iter().map(print_statement).collect();
        if let Some(r) = &p.result {
            parts.push(print_expr(r));
        }
        if parts.is_empty() {
            "(Program)".into()
        } else {
            format!("(Program {})", parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ast::*;
    use super::pretty::print_expr;
    use super::span::Span;

    #[test]
    fn span_join_covers_both() {
        let a = Span::new(2, 3);
        let b = Span::new(10, 1);
        assert_eq!(a.to(b), Span::new(2, 9));
        assert_eq!(b.to(a), Span::new(2, 9));
    }

    #[test]
    fn line_col_counts_from_one() {
        let src = "a = 1\nb = oops";
        assert_eq!(Span::new(10, 4).line_col(src), (2, 5));
        assert_eq!(Span::new(0, 1).line_col(src), (1, 1));
    }

    #[test]
    fn prints_infix_as_sexpr() {
        let sp = Span::default();
        let e = Expr::new(
            ExprKind::Infix {
                op: InfixOp::Add,
                left: Box::new(Expr::new(ExprKind::Number(1.0), sp)),
                right: Box::new(Expr::new(ExprKind::Ident("x".into()), sp)),
            },
            sp,
        );
        assert_eq!(print_expr(&e), "(+ 1 x)");
    }
}
