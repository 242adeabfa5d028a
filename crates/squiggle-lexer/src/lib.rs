use logos::{Lexer, Logos};
use squiggle_ast::span::Span;

#[derive(Debug, Logos, PartialEq, Clone)]
pub enum Tok {
    // Whitespace is skipped; newlines are recovered from the gaps between tokens
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    _Whitespace,

    #[regex(r"//[^\n]*")]
    CommentLine,
    #[token("/*", parse_block_comment)]
    CommentBlock,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,
    #[token("||")]
    PipePipe,
    #[token("|")]
    Pipe,
    #[token("&&")]
    AmpAmp,
    #[token("->")]
    Arrow,
    // '==' must be matched before '='
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("=")]
    Eq,
    #[token("!")]
    Bang,
    #[token("<=")]
    LessEq,
    #[token("<")]
    Less,
    #[token(">=")]
    GreaterEq,
    #[token(">")]
    Greater,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("to")]
    To,

    // 1, 2.5, .5, 1e3, with an optional magnitude suffix: 10k, 3M, 5%
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?[%nmkMBGTP]?", parse_number)]
    Number(f64),

    #[regex(r#""([^"\\]|\\u\{[0-9a-fA-F]+\}|\\.)*""#, parse_string)]
    #[regex(r#"'([^'\\]|\\u\{[0-9a-fA-F]+\}|\\.)*'"#, parse_string)]
    Str(String),

    // Plain names, and module-qualified names such as `Dict.map` as a single token
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    #[regex(r"[A-Z][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)+")]
    Ident,

    // Anything else; the parser reports it with its span
    #[regex(r".", priority = 0)]
    Unknown,
}

impl Tok {
    /// Short human-readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            Tok::Number(n) => format!("number {}", n),
            Tok::Str(s) => format!("string {:?}", s),
            Tok::Ident => "identifier".into(),
            Tok::Unknown => "unknown character".into(),
            other => format!("{:?}", other),
        }
    }
}

fn magnitude(suffix: char) -> Option<f64> {
    Some(match suffix {
        '%' => 1e-2,
        'n' => 1e-9,
        'm' => 1e-3,
        'k' => 1e3,
        'M' => 1e6,
        'B' | 'G' => 1e9,
        'T' => 1e12,
        'P' => 1e15,
        _ => return None,
    })
}

fn parse_number(lex: &mut Lexer<Tok>) -> Option<f64> {
    let raw = lex.slice();
    let last = raw.chars().last()?;
    if let Some(scale) = magnitude(last) {
        let digits = &raw[..raw.len() - last.len_utf8()];
        return digits.parse::<f64>().ok().map(|n| n * scale);
    }
    raw.parse::<f64>().ok()
}

fn parse_string(lex: &mut Lexer<Tok>) -> Option<String> {
    let s = lex.slice();
    let inner = &s[1..s.len() - 1];
    let mut out = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                '\'' => out.push('\''),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                'u' => {
                    // expect {HEX+}
                    if chars.next()? != '{' {
                        return None;
                    }
                    let mut hex = String::new();
                    while let Some(&ch) = chars.peek() {
                        chars.next();
                        if ch == '}' {
                            break;
                        }
                        hex.push(ch);
                    }
                    let v = u32::from_str_radix(hex.trim(), 16).ok()?;
                    out.push(char::from_u32(v)?);
                }
                other => out.push(other),
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

fn parse_block_comment(lex: &mut Lexer<Tok>) -> Option<()> {
    // We have just matched "/*"; block comments do not nest
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => lex.bump(end + 2),
        // Unterminated: consume the rest
        None => lex.bump(rest.len()),
    }
    Some(())
}

#[derive(Debug, Clone)]
pub struct Lexed<'a> {
    pub tok: Tok,
    pub span: Span,
    pub text: &'a str,
    /// True when a line break separates this token from the previous one.
    pub newline_before: bool,
}

pub fn lex(input: &str) -> Vec<Lexed<'_>> {
    let mut out = Vec::new();
    let mut l = Tok::lexer(input);
    let mut prev_end = 0usize;
    while let Some(res) = l.next() {
        let range = l.span();
        // Callbacks returning None (malformed escapes, unparseable numbers) surface as Unknown
        let tok = res.unwrap_or(Tok::Unknown);
        out.push(Lexed {
            tok,
            span: Span::new(range.start, range.len()),
            text: &input[range.clone()],
            newline_before: input[prev_end..range.start].contains('\n'),
        });
        prev_end = range.end;
    }
    out
}

// Convenience: lex while skipping comments (used by the parser)
pub fn lex_skip_comments(input: &str) -> Vec<Lexed<'_>> {
    let mut out: Vec<Lexed<'_>> = Vec::new();
    let mut pending_newline = false;
    for lx in lex(input) {
        match lx.tok {
            Tok::CommentLine | Tok::CommentBlock => {
                pending_newline |= lx.newline_before || lx.text.contains('\n');
                // a line comment always ends at a newline (or EOF)
                if matches!(lx.tok, Tok::CommentLine) {
                    pending_newline = true;
                }
            }
            _ => {
                let newline_before = lx.newline_before || pending_newline;
                pending_newline = false;
                out.push(Lexed { newline_before, ..lx });
            }
        }
    }
    out
}
