use proptest::prelude::*;
use multialign_extract::{
    resolve_and_extract, ExtractError, GapPolicy, OffsetResolver, ScanConfig,
    SubsequenceExtractor,
};

mod common;
use common::{small_block_stream, ungapped};

fn aligned_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(
        prop_oneof![
            Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T'), Just(b'-'), Just(b'-')
        ],
        1..96,
    )
}

fn resolve(data: &[u8], target: u64) -> Result<u64, ExtractError> {
    let mut stream = small_block_stream(data);
    OffsetResolver::new(ScanConfig::default()).resolve(&mut stream, target)
}

proptest! {
    #[test]
    fn resolved_offset_points_at_target_base(data in aligned_bytes()) {
        let total = ungapped(&data).len() as u64;
        for target in 0..total {
            let raw = resolve(&data, target).expect("target in range") as usize;
            prop_assert_ne!(data[raw], b'-', "resolved offset must not be a gap");
            let before = data[..raw].iter().filter(|&&b| b != b'-').count() as u64;
            prop_assert_eq!(before, target);
        }
    }

    #[test]
    fn resolution_is_strictly_monotonic(data in aligned_bytes()) {
        let total = ungapped(&data).len() as u64;
        let mut previous = None;
        for target in 0..total {
            let raw = resolve(&data, target).expect("target in range");
            if let Some(prev) = previous {
                prop_assert!(raw > prev, "offsets must increase");
            }
            previous = Some(raw);
        }
    }

    #[test]
    fn out_of_range_is_never_clamped(data in aligned_bytes(), extra in 0u64..8) {
        let total = ungapped(&data).len() as u64;
        match resolve(&data, total + extra) {
            Err(ExtractError::OutOfRange { available, .. }) => prop_assert_eq!(available, total),
            other => prop_assert!(false, "expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn round_trip_reproduces_ungapped_substring(
        data in aligned_bytes(),
        start_frac in 0.0f64..1.0,
        len_frac in 0.0f64..1.0,
    ) {
        let plain = ungapped(&data);
        prop_assume!(!plain.is_empty());
        let start = ((plain.len() as f64) * start_frac) as usize;
        let start = start.min(plain.len() - 1);
        let max_len = plain.len() - start;
        let length = (((max_len as f64) * len_frac) as usize).max(1);

        let config = ScanConfig::default();
        let mut stream = small_block_stream(&data);
        let raw = OffsetResolver::new(config).resolve(&mut stream, start as u64).unwrap();
        stream.seek(raw).unwrap();
        let mut out = Vec::new();
        let extraction = SubsequenceExtractor::new(config)
            .extract(&mut stream, length as u64, GapPolicy::Strip, &mut out)
            .unwrap();

        prop_assert!(!extraction.is_short());
        prop_assert!(!out.contains(&b'-'));
        prop_assert_eq!(&out[..], &plain[start..start + length]);

        // The fused scan must agree with the two-pass result.
        let mut fused_out = Vec::new();
        let mut fused_stream = small_block_stream(&data);
        let located = resolve_and_extract(
            &config, &mut fused_stream, start as u64, length as u64, &mut fused_out,
        ).unwrap();
        prop_assert_eq!(located.raw_offset, raw);
        prop_assert_eq!(fused_out, out);
    }

    #[test]
    fn raw_window_is_verbatim(data in aligned_bytes(), start in 0usize..96, length in 1u64..32) {
        prop_assume!(start < data.len());
        let mut stream = small_block_stream(&data);
        stream.seek(start as u64).unwrap();
        let mut out = Vec::new();
        let extraction = SubsequenceExtractor::new(ScanConfig::default())
            .extract(&mut stream, length, GapPolicy::Keep, &mut out)
            .unwrap();

        let end = (start + length as usize).min(data.len());
        prop_assert_eq!(&out[..], &data[start..end]);
        prop_assert_eq!(extraction.is_short(), start + length as usize > data.len());
    }
}
