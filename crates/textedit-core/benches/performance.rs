use criterion::{Criterion, black_box, criterion_group, criterion_main};
use encoding_rs::SHIFT_JIS;
use textedit_core::line_processing::{delete_duplicate_line, sort_lines_ascending};
use textedit_core::{
    BRACES, CancellationToken, CommentDelimiters, CommentOutLocation, CommentTypes, IndentStyle,
    PairScanOptions, TextRange, brace_pair, commenting, incompatible, indentation,
};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "    fn f{:03}() {{ quick(brown, [fox]); }} // 🦊 line {i}\n",
            i % 500
        ));
    }
    // Remove the final '\n' to avoid creating an extra trailing empty line.
    out.pop();
    out
}

fn bench_indent_whole_text(c: &mut Criterion) {
    let text = large_text(100_000);
    let range = TextRange::new(0, text.encode_utf16().count());

    c.bench_function("indent/100k_lines", |b| {
        b.iter(|| {
            let context = indentation::indent(black_box(&text), IndentStyle::Space, 4, &[range]);
            black_box(context.ranges.len());
        })
    });
}

fn bench_comment_out(c: &mut Criterion) {
    let text = large_text(20_000);
    let range = TextRange::new(0, text.encode_utf16().count());
    let delimiters = CommentDelimiters::inline("//");

    c.bench_function("comment_out/20k_lines_after_indent", |b| {
        b.iter(|| {
            let context = commenting::comment_out(
                black_box(&text),
                CommentTypes::INLINE,
                &delimiters,
                " ",
                CommentOutLocation::AfterIndent,
                4,
                &[range],
            );
            black_box(context);
        })
    });
}

fn bench_line_processing(c: &mut Criterion) {
    let text = large_text(50_000);
    let range = TextRange::new(0, text.encode_utf16().count());

    c.bench_function("delete_duplicate_line/50k_lines", |b| {
        b.iter(|| black_box(delete_duplicate_line(black_box(&text), &[range])))
    });
    c.bench_function("sort_lines/50k_lines", |b| {
        b.iter(|| black_box(sort_lines_ascending(black_box(&text), range)))
    });
}

fn bench_brace_matching(c: &mut Criterion) {
    let text = format!("({})", large_text(10_000));
    let end = text.encode_utf16().count() - 1;

    c.bench_function("brace_pair/10k_lines_outer", |b| {
        b.iter(|| {
            black_box(brace_pair::index_of_brace_pair(
                black_box(&text),
                end,
                &BRACES,
                None,
                PairScanOptions::default(),
            ))
        })
    });
}

fn bench_incompatible_scan(c: &mut Criterion) {
    let text = large_text(10_000);
    let token = CancellationToken::new();

    c.bench_function("incompatible/10k_lines_shift_jis", |b| {
        b.iter(|| {
            let found = incompatible::incompatible_characters(black_box(&text), SHIFT_JIS, &token);
            black_box(found.map(|found| found.len()))
        })
    });
}

criterion_group!(
    benches,
    bench_indent_whole_text,
    bench_comment_out,
    bench_line_processing,
    bench_brace_matching,
    bench_incompatible_scan
);
criterion_main!(benches);
