use textedit_core::line_processing::{duplicate_line, move_line_up, sort_lines_ascending};
use textedit_core::{LineEnding, TextRange};

fn main() {
    let text = "cherry\napple\nbanana";

    let context = sort_lines_ascending(text, TextRange::new(0, 19)).unwrap();
    let text = context.apply(text);
    assert_eq!(text, "apple\nbanana\ncherry");

    // Move the last line up; it borrows the line break of the line above.
    let context = move_line_up(&text, &[TextRange::caret(13)]).unwrap();
    let text = context.apply(&text);
    assert_eq!(text, "apple\ncherry\nbanana");
    let selection = context.selected_ranges.unwrap();
    assert_eq!(selection, vec![TextRange::caret(6)]);

    let context = duplicate_line(&text, &selection, LineEnding::Lf).unwrap();
    let text = context.apply(&text);
    assert_eq!(text, "apple\ncherry\ncherry\nbanana");
    assert_eq!(context.selected_ranges, Some(vec![TextRange::caret(13)]));

    println!("{text}");
}
