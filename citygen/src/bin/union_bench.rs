#[cfg(feature = "bench_union")]
use citygen::algorithms::roads::buffer_union;
#[cfg(feature = "bench_union")]
use citygen::{NoProgress, Point, Segment, TaskPool};
#[cfg(feature = "bench_union")]
use std::time::Instant;

#[cfg(not(feature = "bench_union"))]
fn main() {
    panic!("union_bench requires --features bench_union");
}

#[cfg(feature = "bench_union")]
fn grid_segments(w: usize, h: usize, step: f64) -> Vec<Segment> {
    let at = |i: usize, j: usize| Point::new(i as f64 * step, j as f64 * step);
    let mut segs = Vec::with_capacity((w + 1) * h + (h + 1) * w);
    for j in 0..=h {
        for i in 0..w {
            segs.push(Segment::new(at(i, j), at(i + 1, j)));
        }
    }
    for i in 0..=w {
        for j in 0..h {
            segs.push(Segment::new(at(i, j), at(i, j + 1)));
        }
    }
    segs
}

#[cfg(feature = "bench_union")]
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut w = 12usize;
    let mut h = 12usize;
    let mut roundness = 8u32;
    let mut repeats = 3usize;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--w=") {
            if let Ok(v) = val.parse() {
                w = v;
            }
        } else if let Some(val) = a.strip_prefix("--h=") {
            if let Ok(v) = val.parse() {
                h = v;
            }
        } else if let Some(val) = a.strip_prefix("--roundness=") {
            if let Ok(v) = val.parse() {
                roundness = v;
            }
        } else if let Some(val) = a.strip_prefix("--repeats=") {
            if let Ok(v) = val.parse() {
                repeats = v;
            }
        }
    }

    let segs = grid_segments(w, h, 400.0);
    let mut workers = vec![1usize];
    let hw = TaskPool::with_available_parallelism().max_workers();
    if hw > 1 {
        workers.push(hw);
    }

    for n in workers {
        let pool = TaskPool::new(n);
        let mut times = Vec::with_capacity(repeats);
        let mut borders = 0usize;
        for _ in 0..repeats.max(1) {
            let t0 = Instant::now();
            match buffer_union(&segs, 120.0, roundness, &pool, &mut NoProgress) {
                Ok((_, b)) => borders = b.len(),
                Err(e) => {
                    eprintln!("union failed: {e}");
                    return;
                }
            }
            times.push(t0.elapsed().as_secs_f64() * 1000.0);
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        println!(
            "grid={}x{} segments={} workers={} borders={} avg_ms={:.3}",
            w,
            h,
            segs.len(),
            n,
            borders,
            avg
        );
    }
}
