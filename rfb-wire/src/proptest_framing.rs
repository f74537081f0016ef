//! Property tests for message framing.
//!
//! These verify that the incremental parsers are robust against
//! fragmentation at arbitrary byte boundaries: a parser must report
//! "incomplete" for every strict prefix of a message and decode the same
//! value from the full buffer no matter where the network happened to split
//! it.

#[cfg(test)]
mod tests {
    use crate::server::{scan_update, ServerInit, UpdateScan};
    use proptest::prelude::*;

    fn arbitrary_server_init() -> impl Strategy<Value = ServerInit> {
        (
            1u16..=7680,
            1u16..=4320,
            prop::sample::select(vec![8u8, 16, 24, 32]),
            prop::collection::vec(any::<u8>(), 0..100),
        )
            .prop_map(|(width, height, bits_per_pixel, name)| ServerInit {
                width,
                height,
                bits_per_pixel,
                name,
            })
    }

    fn encode_server_init(init: &ServerInit) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&init.width.to_be_bytes());
        buf.extend_from_slice(&init.height.to_be_bytes());
        buf.push(init.bits_per_pixel);
        buf.extend_from_slice(&[0u8; 15]);
        buf.extend_from_slice(&(init.name.len() as u32).to_be_bytes());
        buf.extend_from_slice(&init.name);
        buf
    }

    fn arbitrary_raw_rects() -> impl Strategy<Value = Vec<(u16, u16, u16, u16)>> {
        prop::collection::vec((0u16..64, 0u16..64, 0u16..8, 0u16..8), 0..5)
    }

    fn encode_update(rects: &[(u16, u16, u16, u16)], bpp: usize) -> Vec<u8> {
        let mut buf = vec![0u8, 0];
        buf.extend_from_slice(&(rects.len() as u16).to_be_bytes());
        for &(x, y, w, h) in rects {
            buf.extend_from_slice(&x.to_be_bytes());
            buf.extend_from_slice(&y.to_be_bytes());
            buf.extend_from_slice(&w.to_be_bytes());
            buf.extend_from_slice(&h.to_be_bytes());
            buf.extend_from_slice(&0i32.to_be_bytes());
            buf.extend(std::iter::repeat(0x5Au8).take(usize::from(w) * usize::from(h) * bpp));
        }
        buf
    }

    proptest! {
        /// No strict prefix of a ServerInit parses; the full buffer round-trips.
        #[test]
        fn server_init_prefixes_are_incomplete(
            init in arbitrary_server_init(),
            boundary in 0usize..200,
        ) {
            let bytes = encode_server_init(&init);
            let boundary = boundary.min(bytes.len().saturating_sub(1));
            prop_assert!(ServerInit::try_parse(&bytes[..boundary]).is_none());

            let (parsed, consumed) = ServerInit::try_parse(&bytes).unwrap();
            prop_assert_eq!(consumed, bytes.len());
            prop_assert_eq!(parsed, init);
        }

        /// Scanning an update at any split boundary reports Incomplete
        /// without side effects; the full buffer yields every rectangle.
        #[test]
        fn update_scan_is_boundary_invariant(
            rects in arbitrary_raw_rects(),
            bpp in prop::sample::select(vec![1usize, 2, 4]),
            boundary in 0usize..400,
        ) {
            let bytes = encode_update(&rects, bpp);
            let boundary = boundary.min(bytes.len().saturating_sub(1));
            prop_assert_eq!(scan_update(&bytes[..boundary], bpp), UpdateScan::Incomplete);

            match scan_update(&bytes, bpp) {
                UpdateScan::Complete(batch) => {
                    prop_assert_eq!(batch.total_len, bytes.len());
                    prop_assert_eq!(batch.rects.len(), rects.len());
                    for (scanned, &(x, y, w, h)) in batch.rects.iter().zip(&rects) {
                        prop_assert_eq!(
                            (scanned.rect.x, scanned.rect.y, scanned.rect.width, scanned.rect.height),
                            (x, y, w, h)
                        );
                        prop_assert_eq!(scanned.payload_len, usize::from(w) * usize::from(h) * bpp);
                    }
                }
                other => prop_assert!(false, "expected complete batch, got {:?}", other),
            }
        }
    }
}
