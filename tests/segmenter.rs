use ground_track::config::DEFAULT_WRAP_THRESHOLD;
use ground_track::{segment, Sample, Track};

/// Small deterministic generator so the property checks are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn track(&mut self, len: usize, max_step: f64) -> Track {
        let mut lon = self.next_f64() * 360.0 - 180.0;
        (0..len)
            .map(|_| {
                let step = (self.next_f64() * 2.0 - 1.0) * max_step;
                lon = (lon + step + 180.0).rem_euclid(360.0) - 180.0;
                Sample::new(lon, self.next_f64() * 180.0 - 90.0)
            })
            .collect()
    }
}

#[test]
fn concatenation_reproduces_track() {
    let mut rng = Lcg(7);
    for len in 0..200 {
        let track = rng.track(len, 120.0);
        let joined: Vec<Sample> = segment(&track, DEFAULT_WRAP_THRESHOLD)
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(joined, track.samples());
    }
}

#[test]
fn small_steps_never_split() {
    let mut rng = Lcg(11);
    for len in 1..100 {
        let samples: Vec<Sample> = (0..len)
            .map(|i| Sample::new(-170.0 + i as f64 * 3.0, rng.next_f64() * 10.0))
            .collect();
        let track = Track(samples);
        assert_eq!(segment(&track, DEFAULT_WRAP_THRESHOLD).len(), 1);
    }
}

#[test]
fn every_jump_is_a_segment_boundary() {
    let mut rng = Lcg(23);
    for _ in 0..100 {
        let track = rng.track(300, 170.0);
        let segments = segment(&track, DEFAULT_WRAP_THRESHOLD);

        for pair in segments.windows(2) {
            let last = pair[0].last().unwrap();
            let first = pair[1].first().unwrap();
            assert!((first.lon - last.lon).abs() > DEFAULT_WRAP_THRESHOLD);
        }
        for seg in &segments {
            assert!(!seg.is_empty());
            assert!(seg
                .windows(2)
                .all(|w| (w[1].lon - w[0].lon).abs() <= DEFAULT_WRAP_THRESHOLD));
        }

        let jumps = track
            .samples()
            .windows(2)
            .filter(|w| (w[1].lon - w[0].lon).abs() > DEFAULT_WRAP_THRESHOLD)
            .count();
        assert_eq!(segments.len(), jumps + 1);
    }
}

#[test]
fn antimeridian_crossing_from_parallel_arrays() {
    let track =
        Track::from_parallel(&[170.0, 175.0, -178.0, -170.0], &[0.0, 1.0, 2.0, 3.0]).unwrap();
    let segments = segment(&track, 180.0);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0], vec![Sample::new(170.0, 0.0), Sample::new(175.0, 1.0)]);
    assert_eq!(segments[1], vec![Sample::new(-178.0, 2.0), Sample::new(-170.0, 3.0)]);
}
