use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ct_engine::{Engine, EngineConfig, NoteEvent};

const FRAMES: usize = 44_100;

fn full_pool(config: EngineConfig) -> Engine {
    let mut engine = Engine::new(config).unwrap();
    let lanes = config.layout.lanes();
    let voices = config.layout.voices_per_lane();
    for lane in 0..lanes {
        engine.handle(NoteEvent::ProgramChange { channel: lane as u8, program: (lane % 6) as u8 });
        for v in 0..voices {
            let note = 48 + (lane * voices + v) as u8 % 48;
            engine.handle(NoteEvent::NoteOn { channel: lane as u8, note, velocity: 100 });
        }
    }
    engine
}

fn bench_render(c: &mut Criterion) {
    c.bench_function("render 1s, 8 voices", |b| {
        let mut engine = full_pool(EngineConfig::default());
        b.iter(|| {
            for _ in 0..FRAMES {
                black_box(engine.render_frame());
            }
        })
    });

    c.bench_function("render 1s, 16x4 voices", |b| {
        let mut engine = full_pool(EngineConfig::multi_channel(16, 4));
        b.iter(|| {
            for _ in 0..FRAMES {
                black_box(engine.render_frame());
            }
        })
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
