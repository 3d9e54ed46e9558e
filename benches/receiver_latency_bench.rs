use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::{
    hint::black_box,
    io::sink,
    sync::{Arc, atomic::AtomicBool},
    time::Duration,
};

use rc_link::component_a::packet::TelemetryPacket;
use rc_link::component_b::{drivers::SimulatedDriver, receiver::Receiving};
use rc_link::config::DriveVariant;
use rc_link::link::{DatagramSink, channel};
use rc_link::utils::metrics::{EventRecorder, LinkStats};

fn receiver_latency_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("receiver_latency");
    group.measurement_time(Duration::from_secs(2));
    group.sample_size(50);

    let packet = TelemetryPacket::new(3000, 2480, 1, [0, 0, 0, 0, 1]).serialize();

    group.bench_function("handle_datagram", |b| {
        let mut receiver = Receiving::for_variant(
            DriveVariant::DigitalHBridge,
            SimulatedDriver::new(sink()),
            Arc::new(LinkStats::new()),
            Arc::new(EventRecorder::new()),
        );
        b.iter(|| black_box(receiver.handle_datagram(black_box(&packet)).ok()));
    });

    group.bench_function("recv_and_apply", |b| {
        b.iter_batched(
            || {
                // SETUP: one packet queued, sender dropped so run() returns after it
                let (tx, rx) = channel::link(1);
                tx.send(&packet).unwrap();
                drop(tx);
                let receiver = Receiving::for_variant(
                    DriveVariant::DigitalHBridge,
                    SimulatedDriver::new(sink()),
                    Arc::new(LinkStats::new()),
                    Arc::new(EventRecorder::new()),
                );
                (rx, receiver)
            },
            |(rx, mut receiver)| {
                receiver.run(&rx, &AtomicBool::new(true));
                black_box(receiver.last_command().copied())
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, receiver_latency_bench);
criterion_main!(benches);
