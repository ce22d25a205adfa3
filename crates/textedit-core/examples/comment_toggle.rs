use textedit_core::{
    CommentDelimiters, CommentOutLocation, CommentTypes, TextRange, commenting,
};

fn main() {
    let text = "fn main() {\n    println!(\"hi\");\n}\n";
    let delimiters = CommentDelimiters::inline_and_block("//", "/*", "*/");
    let caret = [TextRange::caret(16)];

    // Comment out the current line after its indentation.
    let context = commenting::comment_out(
        text,
        CommentTypes::INLINE,
        &delimiters,
        " ",
        CommentOutLocation::AfterIndent,
        4,
        &caret,
    )
    .unwrap();
    let commented = context.apply(text);
    assert_eq!(commented, "fn main() {\n    // println!(\"hi\");\n}\n");

    let selection = context.selected_ranges.unwrap();
    assert!(commenting::can_uncomment(
        &commented,
        false,
        &delimiters,
        " ",
        &selection
    ));

    // And toggle it back.
    let context = commenting::uncomment(&commented, &delimiters, " ", &selection).unwrap();
    assert_eq!(context.apply(&commented), text);
}
