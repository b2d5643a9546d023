// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for routed event dispatch and graphics work hand-off.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use presentation_dispatch::{GraphicsResourceOwner, WorkQueue};
use presentation_events::{EventManager, RoutedEvent, RoutingStrategy, Scene};
use presentation_tree::{Capabilities, ElementId};

/// A chain of `depth` elements with a counting handler on every node.
fn chain(depth: usize) -> (Scene, EventManager<Scene>, RoutedEvent<u64>, ElementId) {
    let mut scene = Scene::bootstrap().unwrap();
    let ty = scene.tree.core().ui_element;
    let mut events: EventManager<Scene> = EventManager::new();
    let event = events
        .register_routed_event::<u64>("Ping", RoutingStrategy::Bubble, ty)
        .unwrap();
    events
        .register_class_handler(ty, event, |_, _, hits| *hits += 1)
        .unwrap();

    let mut leaf = scene.tree.create(ty, Capabilities::default());
    events.add_handler(leaf, event, |_, _, hits| *hits += 1).unwrap();
    for _ in 1..depth {
        let child = scene.tree.create(ty, Capabilities::default());
        scene.tree.append_child(&scene.registry, leaf, child).unwrap();
        events.add_handler(child, event, |_, _, hits| *hits += 1).unwrap();
        leaf = child;
    }
    (scene, events, event, leaf)
}

fn bench_routing(c: &mut Criterion) {
    let mut group = c.benchmark_group("events/bubble");
    for depth in [4, 16, 64] {
        group.bench_function(BenchmarkId::from_parameter(depth), |b| {
            let (mut scene, mut events, event, leaf) = chain(depth);
            b.iter(|| {
                let mut hits = 0_u64;
                let data = events.raise(&mut scene, leaf, event, &mut hits).unwrap();
                black_box((data.is_handled(), hits))
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("dispatch/work_queue");
    group.bench_function("queue_and_process_64", |b| {
        let queue = WorkQueue::new();
        let handle = queue.handle();
        b.iter(|| {
            for _ in 0..64 {
                handle.queue_work_item(Box::new(|| {})).unwrap();
            }
            black_box(queue.process())
        });
    });
    group.bench_function("wait_on_owner_thread", |b| {
        let queue = WorkQueue::new();
        let handle = queue.handle();
        b.iter(|| black_box(handle.run_and_wait(|| 1_u32).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_routing);
criterion_main!(benches);
