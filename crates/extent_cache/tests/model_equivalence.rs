//! Checks the production `ExtentMap` (a `BTreeMap` with a lower-bound
//! search) against a deliberately naive reference model (an unsorted `Vec`
//! scanned linearly) that implements the same overlap/split/remove rules a
//! different way. Divergence between the two on a random operation sequence
//! means one of them has an off-by-one in the overlap or range-scan logic.

use extent_cache::ExtentMap;
use proptest::prelude::*;

const ADDR_SPACE: u64 = 64;

#[derive(Clone, Debug)]
struct ModelExtent {
    start: u64,
    bytes: Vec<u8>,
    version: u64,
}

impl ModelExtent {
    fn end(&self) -> u64 {
        self.start + self.bytes.len() as u64
    }
}

/// Reference implementation: same rules as `ExtentMap`, simplest possible
/// code (full linear scan, no lower-bound search, no range queries).
#[derive(Default)]
struct ModelMap {
    extents: Vec<ModelExtent>,
    current_version: u64,
}

impl ModelMap {
    fn write(&mut self, offset: u64, bytes: Vec<u8>) -> u64 {
        assert!(!bytes.is_empty());
        let w_begin = offset;
        let w_end = offset + bytes.len() as u64;

        let mut kept = Vec::new();
        for e in self.extents.drain(..) {
            if e.end() <= w_begin || e.start >= w_end {
                kept.push(e);
                continue;
            }
            if e.start < w_begin {
                kept.push(ModelExtent {
                    start: e.start,
                    bytes: e.bytes[..(w_begin - e.start) as usize].to_vec(),
                    version: e.version,
                });
            }
            if e.end() > w_end {
                let skip = (w_end - e.start) as usize;
                kept.push(ModelExtent {
                    start: w_end,
                    bytes: e.bytes[skip..].to_vec(),
                    version: e.version,
                });
            }
        }

        self.current_version += 1;
        let version = self.current_version;
        kept.push(ModelExtent {
            start: w_begin,
            bytes,
            version,
        });
        kept.sort_by_key(|e| e.start);
        self.extents = kept;
        version
    }

    /// Only called with `(offset, length)` matching an earlier `write`'s own
    /// range, so this never hits the fatal out-of-order path, which is
    /// covered separately by a dedicated `#[should_panic]` unit test.
    fn remove(&mut self, offset: u64, length: u64, version: u64) {
        let r_end = offset + length;
        self.extents
            .retain(|e| !(e.start >= offset && e.start < r_end && e.version == version));
    }

    fn read(&self, offset: u64, length: u64, out: &mut [u8]) {
        let r_end = offset + length;
        for e in &self.extents {
            let overlap_start = e.start.max(offset);
            let overlap_end = e.end().min(r_end);
            if overlap_start >= overlap_end {
                continue;
            }
            let copy_len = (overlap_end - overlap_start) as usize;
            let src_start = (overlap_start - e.start) as usize;
            let dst_start = (overlap_start - offset) as usize;
            out[dst_start..dst_start + copy_len]
                .copy_from_slice(&e.bytes[src_start..src_start + copy_len]);
        }
    }

    fn clear(&mut self) {
        self.extents.clear();
    }

    fn sorted_snapshot(&self) -> Vec<(u64, u64, Vec<u8>)> {
        let mut snapshot: Vec<_> = self
            .extents
            .iter()
            .map(|e| (e.start, e.version, e.bytes.clone()))
            .collect();
        snapshot.sort_by_key(|&(start, ..)| start);
        snapshot
    }
}

fn real_snapshot(map: &ExtentMap) -> Vec<(u64, u64, Vec<u8>)> {
    map.iter()
        .map(|(o, e)| (o, e.version, e.bytes.raw().to_vec()))
        .collect()
}

#[derive(Clone, Debug)]
enum Op {
    Write { offset: u64, len: u64, fill: u8 },
    RemoveIssued { idx: usize },
    Read { offset: u64, length: u64 },
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..(ADDR_SPACE - 16), 1u64..16, any::<u8>())
            .prop_map(|(offset, len, fill)| Op::Write { offset, len, fill }),
        2 => (0usize..64).prop_map(|idx| Op::RemoveIssued { idx }),
        2 => (0..(ADDR_SPACE - 16), 1u64..16).prop_map(|(offset, length)| Op::Read {
            offset,
            length
        }),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn matches_reference_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut real = ExtentMap::new();
        let mut model = ModelMap::default();
        let mut issued: Vec<(u64, u64, u64)> = Vec::new();

        for op in ops {
            match op {
                Op::Write { offset, len, fill } => {
                    let bytes = vec![fill; len as usize];
                    let v_real = real.write(offset, bytes.as_slice().into()).unwrap();
                    let v_model = model.write(offset, bytes);
                    prop_assert_eq!(v_real, v_model);
                    issued.push((offset, len, v_real));
                }
                Op::RemoveIssued { idx } => {
                    if issued.is_empty() {
                        continue;
                    }
                    let (offset, length, version) = issued[idx % issued.len()];
                    real.remove(offset, length, version).unwrap();
                    model.remove(offset, length, version);
                }
                Op::Read { offset, length } => {
                    let mut out_real = vec![0xAAu8; length as usize];
                    let mut out_model = vec![0xAAu8; length as usize];
                    real.read(offset, length, &mut out_real).unwrap();
                    model.read(offset, length, &mut out_model);
                    prop_assert_eq!(out_real, out_model);
                }
                Op::Clear => {
                    real.clear();
                    model.clear();
                }
            }

            // P1/P2/P3 after every operation.
            let snapshot = real_snapshot(&real);
            for pair in snapshot.windows(2) {
                let (o1, _, b1) = &pair[0];
                let (o2, ..) = &pair[1];
                prop_assert!(o1 + b1.len() as u64 <= *o2, "I1 violated: {snapshot:?}");
            }
            for (_, _, bytes) in &snapshot {
                prop_assert!(!bytes.is_empty(), "I2 violated: {snapshot:?}");
            }
            for (_, version, _) in &snapshot {
                prop_assert!(*version <= real.current_version(), "I3 violated");
            }

            prop_assert_eq!(real.current_version(), model.current_version);
            prop_assert_eq!(real_snapshot(&real), model.sorted_snapshot());
        }
    }
}
