use squiggle_lexer::{lex, lex_skip_comments, Tok};

fn format_tokens(src: &str) -> String {
    let toks = lex_skip_comments(src);
    let mut out = String::new();
    for t in toks {
        let k = match &t.tok {
            Tok::LBrace => "LBrace".to_string(),
            Tok::RBrace => "RBrace".to_string(),
            Tok::LParen => "LParen".to_string(),
            Tok::RParen => "RParen".to_string(),
            Tok::LBracket => "LBracket".to_string(),
            Tok::RBracket => "RBracket".to_string(),
            Tok::Comma => "Comma".to_string(),
            Tok::Semicolon => "Semicolon".to_string(),
            Tok::Colon => "Colon".to_string(),
            Tok::Pipe => "Pipe".to_string(),
            Tok::PipePipe => "PipePipe".to_string(),
            Tok::Arrow => "Arrow".to_string(),
            Tok::Eq => "Eq".to_string(),
            Tok::EqEq => "EqEq".to_string(),
            Tok::Plus => "Plus".to_string(),
            Tok::Star => "Star".to_string(),
            Tok::To => "To".to_string(),
            Tok::Number(n) => format!("Number({})", n),
            Tok::Str(s) => format!("Str({})", s),
            Tok::Ident => format!("Ident({})", t.text),
            other => format!("{:?}", other),
        };
        if t.newline_before {
            out.push_str("\\n ");
        }
        out.push_str(&k);
        out.push('\n');
    }
    out
}

#[test]
fn golden_statement_and_call() {
    let src = "x = normal(5, 2)\ny = x -> Dist.mean";
    let expected = "\
Ident(x)
Eq
Ident(normal)
LParen
Number(5)
Comma
Number(2)
RParen
\\n Ident(y)
Eq
Ident(x)
Arrow
Ident(Dist.mean)
";
    assert_eq!(format_tokens(src), expected);
}

#[test]
fn golden_lambda_and_dict() {
    let src = "{|x| {a: x, 'b': 3}}";
    let expected = "\
LBrace
Pipe
Ident(x)
Pipe
LBrace
Ident(a)
Colon
Ident(x)
Comma
Str(b)
Colon
Number(3)
RBrace
RBrace
";
    assert_eq!(format_tokens(src), expected);
}

#[test]
fn number_suffixes_scale_values() {
    let toks = lex("3k 2.5M 5% 1e3 .5");
    let nums: Vec<f64> = toks
        .iter()
        .filter_map(|t| match t.tok {
            Tok::Number(n) => Some(n),
            _ => None,
        })
        .collect();
    assert_eq!(nums, vec![3000.0, 2_500_000.0, 0.05, 1000.0, 0.5]);
}

#[test]
fn keywords_do_not_swallow_longer_identifiers() {
    let toks = lex("to toString if iffy");
    let kinds: Vec<&Tok> = toks.iter().map(|t| &t.tok).collect();
    assert_eq!(kinds, vec![&Tok::To, &Tok::Ident, &Tok::If, &Tok::Ident]);
}

#[test]
fn comments_are_dropped_but_keep_line_breaks() {
    let src = "a // first\n/* block */ b /* inline */ c";
    let toks = lex_skip_comments(src);
    let flags: Vec<(&str, bool)> = toks.iter().map(|t| (t.text, t.newline_before)).collect();
    assert_eq!(flags, vec![("a", false), ("b", true), ("c", false)]);
}

#[test]
fn escapes_in_strings() {
    let toks = lex(r#""a\n\"b\"" 'it\'s'"#);
    assert_eq!(toks[0].tok, Tok::Str("a\n\"b\"".into()));
    assert_eq!(toks[1].tok, Tok::Str("it's".into()));
}

#[test]
fn unknown_characters_are_reported_as_tokens() {
    let toks = lex("1 @ 2");
    assert_eq!(toks[1].tok, Tok::Unknown);
    assert_eq!(toks[1].span.offset, 2);
}
