//! Chunking throughput benchmarks

use keyferry_chunks::{chunk, reassemble};

fn main() {
    divan::main();
}

fn sample_text(len: usize) -> String {
    // base64-ish alphabet, deterministic
    const ALPHABET: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    (0..len)
        .map(|i| ALPHABET[(i * 31 + 7) % ALPHABET.len()] as char)
        .collect()
}

#[divan::bench(args = [16 * 1024, 256 * 1024, 4 * 1024 * 1024])]
fn chunk_window_4096(bencher: divan::Bencher, len: usize) {
    let text = sample_text(len);
    bencher.bench(|| chunk(divan::black_box(&text), 4096).unwrap());
}

#[divan::bench(args = [16 * 1024, 256 * 1024, 4 * 1024 * 1024])]
fn reassemble_window_4096(bencher: divan::Bencher, len: usize) {
    let text = sample_text(len);
    let chunks = chunk(&text, 4096).unwrap();
    bencher.bench(|| reassemble(divan::black_box(&chunks)));
}
