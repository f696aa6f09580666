//! Benchmark scan integration into the occupancy grid.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::f32::consts::PI;

use kosha_slam::{
    FrameId, GridConfig, MapConfig, OccupancyGridMap, Pose2D, RangeBearing, RangeScan,
};

/// Synthetic scan of a square room seen from its center.
fn room_scan(half_extent: f32, num_rays: usize) -> RangeScan {
    let mut hits = Vec::with_capacity(num_rays);
    for i in 0..num_rays {
        let bearing = i as f32 * (2.0 * PI / num_rays as f32) - PI;
        let (sin_b, cos_b) = bearing.sin_cos();
        // Distance to the axis-aligned walls of the room
        let range_x = if cos_b.abs() > 1e-6 {
            half_extent / cos_b.abs()
        } else {
            f32::MAX
        };
        let range_y = if sin_b.abs() > 1e-6 {
            half_extent / sin_b.abs()
        } else {
            f32::MAX
        };
        hits.push(RangeBearing::new(range_x.min(range_y), bearing));
    }
    RangeScan::new(FrameId(0), hits)
}

fn bench_scan_update(c: &mut Criterion) {
    let config = MapConfig {
        grid: GridConfig::for_area(50.0, 50.0, 0.1),
        ..Default::default()
    };
    let mut map = OccupancyGridMap::new(config).unwrap();

    let scan = room_scan(10.0, 360);
    let pose = Pose2D::new(0.0, 0.0, 0.0);

    c.bench_function("scan_update_360_rays", |b| {
        b.iter(|| {
            let result = map.update(black_box(&scan), black_box(pose)).unwrap();
            black_box(result)
        })
    });
}

fn bench_probability_query(c: &mut Criterion) {
    let config = MapConfig {
        grid: GridConfig::for_area(50.0, 50.0, 0.1),
        ..Default::default()
    };
    let mut map = OccupancyGridMap::new(config).unwrap();
    map.update(&room_scan(10.0, 360), Pose2D::identity())
        .unwrap();

    c.bench_function("probability_full_sweep", |b| {
        b.iter(|| {
            let mut acc = 0.0f32;
            let (width, height) = map.dimensions();
            for y in 0..height as i32 {
                for x in 0..width as i32 {
                    acc += map.probability(kosha_slam::GridCoord::new(x, y));
                }
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_scan_update, bench_probability_query);
criterion_main!(benches);
