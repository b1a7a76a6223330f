use criterion::{criterion_group, criterion_main, Criterion};
use rummage::Tokenizer;

fn bench_tokenize(c: &mut Criterion) {
    let paragraph = "Relevance-ranked search over an in-memory corpus: \
        tokenization, vocabulary construction, TF-IDF weighting and cosine \
        similarity scoring, with candidate generation from an inverted index. ";
    let text = paragraph.repeat(200);
    let tokenizer = Tokenizer::new(true, 3);
    c.bench_function("tokenize_paragraphs", |b| b.iter(|| tokenizer.tokenize(&text)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
