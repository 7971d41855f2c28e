use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

use fmm_traversal::tree::flags;
use fmm_traversal::{Tree, TraversalBuilder};

/// Builds a fully-refined 2D quadtree of the given depth: every box at
/// levels `0..levels-1` has exactly four children, and only boxes at the
/// deepest level carry sources/targets. Box ids are assigned breadth-first,
/// matching the ascending-by-level layout the builder expects.
fn build_uniform_tree(levels: usize) -> Tree<u32, f64, 2> {
    let mut level_start = vec![0usize];
    let mut count = 1usize;
    for _ in 0..levels {
        level_start.push(level_start.last().unwrap() + count);
        count *= 4;
    }
    let nboxes = *level_start.last().unwrap();

    let mut centers = vec![vec![0.0f64; nboxes]; 2];
    let mut box_levels = vec![0u8; nboxes];
    let mut box_parent_ids = vec![0u32; nboxes];
    let mut child_ids = vec![vec![0u32; nboxes]; 4];
    let mut box_flags = vec![0u8; nboxes];

    let offsets: [[f64; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

    for level in 0..levels {
        let start = level_start[level];
        let end = level_start[level + 1];
        let extent = 1.0 / f64::from(1u32 << level);
        for b in start..end {
            box_levels[b] = level as u8;
            if level + 1 < levels {
                box_flags[b] = flags::HAS_CHILDREN;
                let child_start = level_start[level + 1] + (b - start) * 4;
                for morton in 0..4 {
                    let child = child_start + morton;
                    child_ids[morton][b] = child as u32;
                    box_parent_ids[child] = b as u32;
                    centers[0][child] = centers[0][b] + offsets[morton][0] * extent / 4.0;
                    centers[1][child] = centers[1][b] + offsets[morton][1] * extent / 4.0;
                }
            } else {
                box_flags[b] = flags::HAS_SOURCES | flags::HAS_TARGETS;
            }
        }
    }

    let level_starts: Vec<u32> = level_start.iter().map(|&x| x as u32).collect();

    Tree::new(nboxes, levels, nboxes, 1.0, centers, box_levels, box_parent_ids, child_ids, box_flags, level_starts, true)
}

fn traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");
    group.significance_level(0.05).measurement_time(std::time::Duration::new(10, 0));

    for &levels in &[3usize, 5, 7] {
        let tree = build_uniform_tree(levels);
        let builder = TraversalBuilder::default();

        let bench_name = format!("uniform-quadtree-{}-levels-{}-boxes", levels, tree.nboxes());
        group.bench_function(&bench_name, |b| b.iter_with_large_drop(|| builder.build_par(&tree).unwrap()));
    }

    group.finish();
}

criterion_group!(benches, traversal);
criterion_main!(benches);
