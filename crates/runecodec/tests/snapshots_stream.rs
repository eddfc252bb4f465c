#![expect(missing_docs)]

use core::fmt::Write;

use runecodec::{CodecOptions, StreamDecoder, StreamError};

fn render_item(item: Result<u32, StreamError>, out: &mut String) {
    match item {
        Ok(rune) => writeln!(out, "U+{rune:04X}"),
        Err(err) => writeln!(out, "error: {err}"),
    }
    .unwrap();
}

fn render(chunks: &[&[u8]]) -> String {
    let mut decoder = StreamDecoder::<u32>::new(CodecOptions::default());
    let mut out = String::new();

    for (i, chunk) in chunks.iter().enumerate() {
        decoder.feed(chunk);
        writeln!(out, "-- chunk {i}").unwrap();
        for item in decoder.by_ref() {
            render_item(item, &mut out);
        }
    }
    writeln!(out, "-- finish").unwrap();
    for item in decoder.finish() {
        render_item(item, &mut out);
    }
    out
}

#[test]
fn snapshot_stream_text() {
    let chunks: [&[u8]; 3] = [b"\xCE\xBA\xE1", b"\xBD\xB9\xCF\x83\xCE", b"\xBC\xCE\xB5"];

    insta::assert_snapshot!(render(&chunks), @r"
    -- chunk 0
    U+03BA
    -- chunk 1
    U+1F79
    U+03C3
    -- chunk 2
    U+03BC
    U+03B5
    -- finish
    ");
}

#[test]
fn snapshot_stream_errors() {
    let chunks: [&[u8]; 4] = [b"ok\x80", b"\xC0", b"\xAF\xED\xA0\x80!", b"\xF0\x9F\x98"];

    insta::assert_snapshot!(render(&chunks), @r"
    -- chunk 0
    U+006F
    U+006B
    error: Invalid start byte at byte 2
    -- chunk 1
    -- chunk 2
    error: Overlong byte sequence at byte 3
    error: Invalid byte sequence at byte 5
    U+0021
    -- chunk 3
    -- finish
    error: Truncated sequence at byte 9
    ");
}

#[test]
fn snapshot_stream_supplementary() {
    let mut decoder = StreamDecoder::<u16>::new(CodecOptions::default());
    decoder.feed(b"\xF0\x9F");
    decoder.feed(b"\x98\x80\xF0\x90\x8D\x88");
    let units: Vec<String> = decoder
        .finish()
        .map(|unit| format!("{:04X}", unit.unwrap()))
        .collect();

    insta::assert_snapshot!(units.join(" "), @"D83D DE00 D800 DF48");
}
