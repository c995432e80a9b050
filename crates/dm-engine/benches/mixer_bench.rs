use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dm_core::{DeckId, EqBand};
use dm_engine::{build_graph, Deck, GraphEndpoints, MixBus};
use dm_synth::{LoopBank, LoopKind};

const SAMPLE_RATE: u32 = 48_000;

fn bench_render(c: &mut Criterion) {
    let bank = LoopBank::new(SAMPLE_RATE);
    let (endpoints, mut mixer) = build_graph(SAMPLE_RATE);
    let GraphEndpoints {
        decks: [a, b],
        bus,
        clock,
        gc,
        ..
    } = endpoints;
    let clock = Arc::new(clock);

    let mut deck_a = Deck::new(DeckId::A, clock.clone(), a, gc.handle());
    let mut deck_b = Deck::new(DeckId::B, clock, b, gc.handle());
    let mut bus = MixBus::new(bus);

    deck_a.load_buffer(bank.get(LoopKind::Pulse).clone());
    deck_b.load_buffer(bank.get(LoopKind::Pad).clone());
    deck_a.set_eq(EqBand::Low, 6.0);
    deck_b.set_pitch(300.0);
    bus.set_crossfade(0.3);
    deck_a.play();
    deck_b.play();

    let mut out = vec![0.0f32; 1024];
    c.bench_function("mixer_render_1024", |b| {
        b.iter(|| {
            mixer.render(black_box(&mut out));
        })
    });

    c.bench_function("mixer_render_frame", |b| {
        b.iter(|| black_box(mixer.render_frame()))
    });
}

fn bench_synth(c: &mut Criterion) {
    c.bench_function("loop_bank_48k", |b| {
        b.iter(|| LoopBank::new(black_box(SAMPLE_RATE)))
    });
}

criterion_group!(benches, bench_render, bench_synth);
criterion_main!(benches);
