use std::num::NonZeroU32;

use fcrypt_crypto::{apply_keystream, run_benchmark, seal, Nonce, RecipientKey, StreamKey};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey, StaticSecret};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn make_recipient() -> RecipientKey {
    RecipientKey::from(PublicKey::from(&StaticSecret::random_from_rng(OsRng)))
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_apply_keystream(bencher: divan::Bencher, size: usize) {
    let key = StreamKey::from_bytes([0x42u8; 32]);
    let nonce = Nonce::generate();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            apply_keystream(
                divan::black_box(&key),
                divan::black_box(&nonce),
                divan::black_box(&data),
            )
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_seal(bencher: divan::Bencher, size: usize) {
    let recipient = make_recipient();
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| seal(divan::black_box(&data), divan::black_box(&recipient)).unwrap());
}

#[divan::bench(args = [1024, 65536])]
fn bench_seal_harness(bencher: divan::Bencher, size: usize) {
    let recipient = make_recipient();
    let data = make_data(size);
    let iterations = NonZeroU32::new(10).unwrap();
    bencher.bench(|| run_benchmark(divan::black_box(&data), &recipient, iterations).unwrap());
}

fn main() {
    divan::main();
}
