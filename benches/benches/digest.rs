// Copyright 2025 the Presentation Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for the property digest over the element tree.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use presentation_dirty::Channel;
use presentation_property::{Property, PropertyMetadataBuilder, PropertyRegistry};
use presentation_tree::{Capabilities, CoreProperties, ElementId, Tree};

struct Scene {
    registry: PropertyRegistry,
    tree: Tree,
    font_size: Property<f64>,
    width: Property<f64>,
    root: ElementId,
    leaves: Vec<ElementId>,
}

/// A tree of `depth` levels where each node has `fanout` children.
fn build(depth: u32, fanout: u32) -> Scene {
    let mut registry = PropertyRegistry::new();
    let core = CoreProperties::register(&mut registry).unwrap();
    let ty = core.ui_element;
    let font_size = registry
        .register(
            ty,
            "FontSize",
            PropertyMetadataBuilder::new(12.0_f64)
                .inherits(true)
                .affects(Channel::MEASURE.into_set())
                .build(),
        )
        .unwrap();
    let width = registry
        .register(
            ty,
            "Width",
            PropertyMetadataBuilder::new(0.0_f64)
                .affects(Channel::MEASURE.into_set())
                .build(),
        )
        .unwrap();

    let mut tree = Tree::new(core);
    let root = tree.create(ty, Capabilities::default());
    let mut level = vec![root];
    for _ in 1..depth {
        let mut next = Vec::new();
        for &parent in &level {
            for _ in 0..fanout {
                let child = tree.create(ty, Capabilities::default());
                tree.append_child(&registry, parent, child).unwrap();
                next.push(child);
            }
        }
        level = next;
    }
    tree.digest(&registry);
    Scene {
        registry,
        tree,
        font_size,
        width,
        root,
        leaves: level,
    }
}

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest/inherited_root_change");
    for (depth, fanout) in [(8, 2), (4, 8), (64, 1)] {
        let label = format!("{depth}x{fanout}");
        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            let mut scene = build(depth, fanout);
            let mut size = 12.0;
            b.iter(|| {
                size += 1.0;
                scene
                    .tree
                    .set_value(&scene.registry, scene.root, scene.font_size, size)
                    .unwrap();
                let report = scene.tree.digest(&scene.registry);
                black_box(scene.tree.take_invalidated(Channel::MEASURE));
                black_box(report.len())
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("digest/local_writes");
    group.bench_function("leaves_last_write_wins", |b| {
        b.iter_batched(
            || build(6, 3),
            |mut scene| {
                for &leaf in &scene.leaves {
                    for value in [1.0, 2.0, 3.0] {
                        scene
                            .tree
                            .set_value(&scene.registry, leaf, scene.width, value)
                            .unwrap();
                    }
                }
                black_box(scene.tree.digest(&scene.registry).len())
            },
            BatchSize::LargeInput,
        );
    });
    group.bench_function("idle", |b| {
        let mut scene = build(6, 3);
        b.iter(|| black_box(scene.tree.digest(&scene.registry).is_empty()));
    });
    group.finish();

    let mut group = c.benchmark_group("tree/reparent");
    group.bench_function("move_subtree_between_roots", |b| {
        let mut scene = build(5, 3);
        let ty = scene.tree.core().ui_element;
        let other = scene.tree.create(ty, Capabilities::default());
        scene
            .tree
            .set_value(&scene.registry, other, scene.font_size, 20.0)
            .unwrap();
        let subtree = scene.tree.children(scene.root)[0];
        let mut parents = [scene.root, other];
        b.iter(|| {
            scene
                .tree
                .remove_child(&scene.registry, parents[0], subtree)
                .unwrap();
            scene
                .tree
                .append_child(&scene.registry, parents[1], subtree)
                .unwrap();
            parents.swap(0, 1);
            black_box(scene.tree.digest(&scene.registry).len())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_digest);
criterion_main!(benches);
