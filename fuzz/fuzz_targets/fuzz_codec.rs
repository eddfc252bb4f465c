#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use runecodec::{
    ByteOrder, CodeUnit, CodecOptions, Context, StreamDecoder, StreamError, SurrogatePolicy,
    TruncationMode, from_runes, from_utf16, is_valid_utf8, to_runes, to_utf16,
};

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

/// Byte strings the decoder treats specially.
static EDGE_TABLE: &[&[u8]] = &[
    b"\xFE\xFF",
    b"\xFF\xFE",
    b"\xC0\xAF",
    b"\xED\xA0\x80",
    b"\xED\xBF\xBF",
    b"\xEF\xBF\xBE",
    b"\xF4\x90\x80\x80",
    b"\xF8\x88\x80\x80\x80",
    b"\xFC\x84\x80\x80\x80\x80",
    b"\x80",
    b"\xBF",
    b"\xE2\x82",
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x0F);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        while prefix < size.max(HEADER + 1) && prefix < max_size {
            let limit = max_size - prefix;
            prefix += append_edge(&mut data[prefix..], limit);
            prefix += append_text(&mut data[prefix..], size, limit);
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Append one entry of [`EDGE_TABLE`] if it fits in `limit`.
fn append_edge(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        let edge = EDGE_TABLE[rng.random_range(0..EDGE_TABLE.len())];
        if edge.len() > limit {
            return 0;
        }
        buf[..edge.len()].copy_from_slice(edge);
        edge.len()
    })
}

/// Append a run of well-formed text built from arbitrary scalars.
fn append_text(buf: &mut [u8], size: usize, limit: usize) -> usize {
    let text = loop {
        let s = with_rng(|rng| rng.random_range(1..size.max(2) * 2).min(limit.max(1)));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        match ArbitraryText::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            Ok(text) => break text,
            Err(_) => continue,
        };
    };

    let encoded = text.0.as_bytes();
    let len = encoded.len().min(limit);
    buf[..len].copy_from_slice(&encoded[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryText(String);

impl<'a> Arbitrary<'a> for ArbitraryText {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let chars: Vec<char> = u.arbitrary()?;
        Ok(ArbitraryText(chars.into_iter().collect()))
    }
}

fn options(flags: u8) -> CodecOptions {
    CodecOptions {
        truncation: if flags & 1 != 0 {
            TruncationMode::Carry
        } else {
            TruncationMode::Restart
        },
        unpaired_surrogates: if flags & 2 != 0 {
            SurrogatePolicy::PassThrough
        } else {
            SurrogatePolicy::Reject
        },
        native_order: if flags & 4 != 0 {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        },
    }
}

fn stream<U: CodeUnit>(options: CodecOptions, chunks: &[&[u8]]) -> Vec<Result<U, StreamError>> {
    let mut decoder = StreamDecoder::<U>::new(options);
    let mut items = Vec::new();
    for chunk in chunks {
        decoder.feed(chunk);
        items.extend(decoder.by_ref());
    }
    items.extend(decoder.finish());
    items
}

/// Drive a bare context chunk by chunk and check it never stalls or breaks
/// its own invariants.
fn walk<U: CodeUnit>(options: CodecOptions, chunks: &[&[u8]]) {
    let mut ctx = Context::with_options(options);
    for chunk in chunks {
        let mut pos = 0;
        // Every step either takes a byte, emits a unit or gives up on the
        // chunk, so this bound is never reached.
        for _ in 0..=2 * chunk.len() + 2 {
            let step = ctx.decode::<U>(&chunk[pos..]);
            ctx.assert_invariants();
            pos += step.consumed;
            assert!(pos <= chunk.len());
            match step.result {
                Ok(Some(_)) => {}
                Ok(None) if step.consumed > 0 => {}
                Ok(None) | Err(_) if pos == chunk.len() => break,
                Err(e) if e.is_truncated() => break,
                _ => {}
            }
        }
    }
}

fn codec(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let split_seed = u32::from_le_bytes(data[1..5].try_into().unwrap()) as u64;
    let data = &data[5..];

    if data.is_empty() {
        return;
    }

    let options = options(flags);
    let chunks = split_into_chunks(data, split_seed);

    if flags & 8 != 0 {
        assert_eq!(stream::<u16>(options, &chunks), stream::<u16>(options, &[data]));
        walk::<u16>(options, &chunks);
    } else {
        assert_eq!(stream::<u32>(options, &chunks), stream::<u32>(options, &[data]));
        walk::<u32>(options, &chunks);
    }

    if is_valid_utf8(data) {
        let runes = to_runes(data).unwrap();
        assert_eq!(from_runes(&runes).unwrap(), data);
        let units = to_utf16(data).unwrap();
        assert_eq!(from_utf16(&units, SurrogatePolicy::Reject).unwrap(), data);
    }
}

fuzz_target!(|data: &[u8]| codec(data));

/// Split `data` into chunks whose sizes are derived from `split_seed`.
///
/// * Each chunk is at least one byte.
/// * Chunks may end in the middle of a sequence.
fn split_into_chunks(data: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut seed = split_seed;

    while start < data.len() {
        let remaining = data.len() - start;
        let size = (seed as usize % remaining) + 1;
        chunks.push(&data[start..start + size]);
        start += size;
        seed = seed.rotate_left(7) ^ 0x9E37_79B9;
    }

    chunks
}
