//! Performance benchmarks for `readabilityrs`.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use readabilityrs::Readability;

const SAMPLE_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sample Article | Example Site</title>
    <meta name="author" content="Jane Doe">
    <meta property="og:description" content="A sample article for benchmarking.">
</head>
<body>
    <nav><a href="/">Home</a><a href="/about">About</a></nav>
    <article>
        <h1>Sample Article Title</h1>
        <p class="byline">By Jane Doe</p>
        <p>This is the first paragraph of the article. It contains some meaningful
        content that should be extracted by the scoring algorithm, long enough to
        clear the minimum character count used for a byline-free paragraph.</p>
        <p>Here is a second paragraph with more content. The extraction should
        preserve the text while removing navigation and other boilerplate markup
        such as the surrounding aside and footer elements below.</p>
        <p>A third paragraph ensures there is enough content for meaningful
        benchmarking of the extraction performance across repeated runs.</p>
    </article>
    <aside>
        <h3>Related Articles</h3>
        <ul><li>Related article 1</li><li>Related article 2</li></ul>
    </aside>
    <footer><p>Copyright 2024</p></footer>
</body>
</html>
"#;

fn bench_parse_default(c: &mut Criterion) {
    c.bench_function("parse_default", |b| {
        b.iter(|| {
            let readability =
                Readability::new("https://example.com/article", black_box(SAMPLE_HTML)).unwrap();
            readability.parse()
        });
    });
}

fn bench_parse_scaled(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaled");

    for paragraphs in [10usize, 50, 200] {
        let body: String = (0..paragraphs)
            .map(|i| format!("<p>Paragraph number {i} with a bit of filler prose to score.</p>"))
            .collect();
        let html = format!(
            "<html><head><title>Scaled</title></head><body><article>{body}</article></body></html>"
        );
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("parse", paragraphs),
            &html,
            |b, html| {
                b.iter(|| {
                    let readability = Readability::new("https://example.com/", black_box(html)).unwrap();
                    readability.parse()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse_default, bench_parse_scaled);
criterion_main!(benches);
