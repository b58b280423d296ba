use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    let mut lx = Lexer::new(src);
    let mut out = Vec::new();
    loop {
        let t = lx.next_token(false).unwrap();
        if t.kind == TokenKind::Eof {
            break;
        }
        out.push(t.kind);
    }
    out
}

#[test]
fn lexes_longest_punctuator_first() {
    assert_eq!(
        kinds("a >>>= b ?? c?.d"),
        vec![
            TokenKind::Ident("a".to_owned()),
            TokenKind::Punct(">>>="),
            TokenKind::Ident("b".to_owned()),
            TokenKind::Punct("??"),
            TokenKind::Ident("c".to_owned()),
            TokenKind::Punct("?."),
            TokenKind::Ident("d".to_owned()),
        ]
    );
}

#[test]
fn optional_chain_before_digit_is_conditional() {
    assert_eq!(
        kinds("a?.5:1"),
        vec![
            TokenKind::Ident("a".to_owned()),
            TokenKind::Punct("?"),
            TokenKind::Number(0.5),
            TokenKind::Punct(":"),
            TokenKind::Number(1.0),
        ]
    );
}

#[test]
fn numbers_cover_radix_separators_and_exponents() {
    assert_eq!(
        kinds("0xff 1_000 .5 2e3 10n"),
        vec![
            TokenKind::Number(255.0),
            TokenKind::Number(1000.0),
            TokenKind::Number(0.5),
            TokenKind::Number(2000.0),
            TokenKind::Number(10.0),
        ]
    );
}

#[test]
fn strings_decode_escapes() {
    assert_eq!(
        kinds(r#"'a\'b' "A\x42""#),
        vec![
            TokenKind::Str("a'b".to_owned()),
            TokenKind::Str("AB".to_owned()),
        ]
    );
}

#[test]
fn unterminated_string_reports_start() {
    let mut lx = Lexer::new("x = 'abc\n';");
    lx.next_token(false).unwrap();
    lx.next_token(false).unwrap();
    let err = lx.next_token(true).unwrap_err();
    assert_eq!(err.span.start, 4);
    assert!(err.message.contains("unterminated string"));
}

#[test]
fn regex_only_where_operand_expected() {
    let mut lx = Lexer::new("/ab[/]c/gi");
    let t = lx.next_token(true).unwrap();
    assert_eq!(t.kind, TokenKind::Regex);
    assert_eq!(t.span, Span::new(0, 10));

    let mut lx = Lexer::new("/ 2");
    assert_eq!(lx.next_token(false).unwrap().kind, TokenKind::Punct("/"));
}

#[test]
fn comments_are_trivia_and_track_newlines() {
    let mut lx = Lexer::new("a /* x\n */ b // tail\nc");
    let a = lx.next_token(false).unwrap();
    let b = lx.next_token(false).unwrap();
    let c = lx.next_token(false).unwrap();
    assert!(!a.newline_before);
    assert!(b.newline_before);
    assert!(c.newline_before);
}

#[test]
fn unterminated_block_comment_is_an_error() {
    let mut lx = Lexer::new("a /* never closed");
    lx.next_token(false).unwrap();
    assert!(lx.next_token(false).is_err());
}

#[test]
fn template_chunks_split_on_substitution() {
    let mut lx = Lexer::new("`a${b}c`");
    let head = lx.next_token(true).unwrap();
    assert_eq!(
        head.kind,
        TokenKind::Template {
            cooked: "a".to_owned(),
            tail: false
        }
    );
    assert_eq!(lx.next_token(true).unwrap().kind, TokenKind::Ident("b".to_owned()));
    let close = lx.next_token(false).unwrap();
    assert_eq!(close.kind, TokenKind::Punct("}"));
    let tail = lx.template_chunk(close.span.start, false).unwrap();
    assert_eq!(
        tail.kind,
        TokenKind::Template {
            cooked: "c".to_owned(),
            tail: true
        }
    );
}

#[test]
fn jsx_tag_tokens_allow_dashes_and_raw_strings() {
    let mut lx = Lexer::new(r#"data-id="a\b">"#);
    assert_eq!(
        lx.jsx_tag_token().unwrap().kind,
        TokenKind::Ident("data-id".to_owned())
    );
    assert_eq!(lx.jsx_tag_token().unwrap().kind, TokenKind::Punct("="));
    assert_eq!(
        lx.jsx_tag_token().unwrap().kind,
        TokenKind::Str(r"a\b".to_owned())
    );
    assert_eq!(lx.jsx_tag_token().unwrap().kind, TokenKind::Punct(">"));
}

#[test]
fn jsx_text_stops_at_brace_or_tag() {
    let mut lx = Lexer::new("Hello, it's {name}");
    let (text, span) = lx.jsx_text().unwrap();
    assert_eq!(text, "Hello, it's ");
    assert_eq!(span, Span::new(0, 12));
    assert!(lx.jsx_text().is_none());
}

#[test]
fn span_helpers() {
    let a = Span::new(2, 5);
    let b = Span::new(4, 9);
    assert_eq!(a.to(b), Span::new(2, 9));
    assert!(Span::new(0, 10).contains(a));
    assert_eq!(a.len(), 3);
    assert!(Span::new(3, 3).is_empty());
}
