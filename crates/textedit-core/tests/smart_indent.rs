use pretty_assertions::assert_eq;
use textedit_core::smart_indent::{smart_indent, smart_outdent_level};
use textedit_core::{
    BracePair, DelimiterEscapeRule, EditingContext, IndentStyle, IndentToken, Pair, TextRange,
};

fn tokens() -> Vec<IndentToken> {
    vec![
        IndentToken::new("{", "}", false).unwrap(),
        IndentToken::new(":", "", false).unwrap(),
        IndentToken::new("then", "end", false).unwrap(),
    ]
}

fn indent_after_newline(text: &str, location: usize) -> Option<EditingContext> {
    smart_indent(
        text,
        IndentStyle::Space,
        2,
        &tokens(),
        &[TextRange::caret(location)],
    )
}

fn assert_indent(text: &str, location: usize, indent: &str, selection: usize) {
    let context = indent_after_newline(text, location).unwrap();

    assert_eq!(context.strings, vec![indent.to_string()], "{text:?}");
    assert_eq!(context.ranges, vec![TextRange::caret(location)], "{text:?}");
    assert_eq!(
        context.selected_ranges,
        Some(vec![TextRange::caret(selection)]),
        "{text:?}"
    );
}

#[test]
fn test_smart_indent_keeps_base_indent() {
    assert_eq!(indent_after_newline("foo\n", 4), None);
    assert_indent("    foo\n", 8, "    ", 12);
}

#[test]
fn test_smart_indent_after_begin_token() {
    assert_indent("    if foo:\n", 12, "      ", 18);
    assert_indent("{\n }", 2, "  ", 4);
    assert_eq!(indent_after_newline("if foo: \n", 9), None);
}

#[test]
fn test_smart_indent_between_pair() {
    assert_indent("    {\n}", 6, "      \n    ", 12);
    assert_indent("then\nend", 5, "  \n", 7);
}

#[test]
fn test_smart_indent_braces_with_four_spaces() {
    let text = "func f() {\n}";
    let context =
        smart_indent(text, IndentStyle::Space, 4, &tokens(), &[TextRange::caret(11)]).unwrap();

    assert_eq!(context.strings, vec!["    \n"]);
    assert_eq!(context.selected_ranges, Some(vec![TextRange::caret(15)]));
    assert_eq!(context.apply(text), "func f() {\n    \n}");
}

#[test]
fn test_smart_indent_with_tab() {
    let text = "\tx {\n";
    let context =
        smart_indent(text, IndentStyle::Tab, 4, &tokens(), &[TextRange::caret(5)]).unwrap();

    assert_eq!(context.apply(text), "\tx {\n\t\t");
    assert_eq!(context.selected_ranges, Some(vec![TextRange::caret(7)]));
}

#[test]
fn test_smart_indent_word_tokens_need_boundary() {
    assert_eq!(indent_after_newline("athen\n", 6), None);
    assert_eq!(indent_after_newline("thenx\n", 6), None);

    let case_insensitive = [IndentToken::new("then", "end", true).unwrap()];
    let context = smart_indent(
        "THEN\n",
        IndentStyle::Space,
        2,
        &case_insensitive,
        &[TextRange::caret(5)],
    )
    .unwrap();
    assert_eq!(context.strings, vec!["  "]);
}

#[test]
fn test_smart_indent_multiple_selections() {
    let text = "  a\n{\n";
    let context = smart_indent(
        text,
        IndentStyle::Space,
        2,
        &tokens(),
        &[TextRange::caret(4), TextRange::caret(6)],
    )
    .unwrap();

    assert_eq!(context.apply(text), "  a\n  {\n  ");
    assert_eq!(
        context.selected_ranges,
        Some(vec![TextRange::caret(6), TextRange::caret(10)])
    );
}

#[test]
fn test_smart_indent_without_line_break_keeps_selection() {
    let _ = env_logger::builder().is_test(true).try_init();

    let text = "  a\nb";
    let context = smart_indent(
        text,
        IndentStyle::Space,
        2,
        &tokens(),
        &[TextRange::caret(4), TextRange::caret(5)],
    )
    .unwrap();

    assert_eq!(context.apply(text), "  a\n  b");
    assert_eq!(
        context.selected_ranges,
        Some(vec![TextRange::caret(6), TextRange::caret(7)])
    );
}

#[test]
fn test_indent_token_classification() {
    assert_eq!(
        IndentToken::new("{", "}", false),
        Some(IndentToken::SymbolPair(BracePair::new('{', '}')))
    );
    assert_eq!(
        IndentToken::new(" then ", " end ", true),
        Some(IndentToken::TokenPair {
            pair: Pair::new("then".to_string(), "end".to_string()),
            ignore_case: true,
        })
    );
    assert_eq!(
        IndentToken::new(":", " ", false),
        Some(IndentToken::BeginToken {
            token: ":".to_string(),
            ignore_case: false,
        })
    );
    assert_eq!(IndentToken::new("", "}", false), None);
    assert_eq!(IndentToken::new("  ", "x", false), None);

    // `<` and `>` are math symbols, not punctuation
    let angle = IndentToken::new("<", ">", false).unwrap();
    assert_eq!(angle.characters(), None);
    assert_eq!(angle.begin(), "<");
    assert_eq!(angle.end().as_deref(), Some(">"));
}

#[test]
fn test_indent_token_accessors() {
    let brace = IndentToken::new("[", "]", true).unwrap();
    assert_eq!(brace.characters(), Some(BracePair::new('[', ']')));
    assert!(!brace.ignore_case());

    let colon = IndentToken::new(":", "", true).unwrap();
    assert_eq!(colon.end(), None);
    assert!(colon.ignore_case());
}

#[test]
fn test_smart_outdent_level() {
    let tokens = tokens();
    let outdent = |text: &str, string: &str, location: usize| {
        smart_outdent_level(
            text,
            string,
            4,
            &tokens,
            TextRange::caret(location),
            DelimiterEscapeRule::Backslash,
        )
    };

    assert_eq!(outdent("{\n    ", "}", 6), 1);
    assert_eq!(outdent("{\n    {\n        ", "}", 16), 1);
    assert_eq!(outdent("{\n  x", "}", 5), 0);
    assert_eq!(outdent("{\n    ", ")", 6), 0);
    assert_eq!(outdent("{\n", "}", 2), 0);
    assert_eq!(outdent("    ", "}", 4), 0);
}

#[test]
fn test_smart_outdent_respects_escape_rule() {
    let text = "\\{\n    ";
    let tokens = tokens();

    let level = |escape| {
        smart_outdent_level(text, "}", 4, &tokens, TextRange::caret(7), escape)
    };

    assert_eq!(level(DelimiterEscapeRule::Backslash), 0);
    assert_eq!(level(DelimiterEscapeRule::None), 1);
}
