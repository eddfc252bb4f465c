//! Snapshots of the exact step sequence the decoder produces for inputs that
//! mix good and bad sequences. Any change in what is reported, or in how many
//! bytes each step takes, shows up here.

use alloc::vec::Vec;

use insta::assert_yaml_snapshot;
use serde::Serialize;

use super::walk;
use crate::{ByteOrder, CodecError, CodecOptions, Context, ErrorCode};

#[derive(Serialize)]
struct Step {
    consumed: usize,
    result: Result<Option<u32>, CodecError>,
}

fn steps(ctx: &mut Context, input: &[u8]) -> Vec<Step> {
    walk::<u32>(ctx, input)
        .into_iter()
        .map(|s| Step {
            consumed: s.consumed,
            result: s.result,
        })
        .collect()
}

#[test]
fn snapshot_mixed_input() {
    let input = b"a\xCE\xBA\xC0\xAF\xED\xA0\x80\xF4\x90\x80\x80\xE2\x82";

    assert_yaml_snapshot!(steps(&mut Context::new(), input), @r"
    - consumed: 1
      result:
        Ok: 97
    - consumed: 2
      result:
        Ok: 954
    - consumed: 2
      result:
        Err: Overlong
    - consumed: 3
      result:
        Err: InvalidSequence
    - consumed: 4
      result:
        Err: ValueOutOfRange
    - consumed: 2
      result:
        Err: Truncated
    ");
}

#[test]
fn snapshot_byte_order_marks() {
    let mut ctx = Context::with_options(CodecOptions {
        native_order: ByteOrder::Little,
        ..CodecOptions::default()
    });
    let input = b"\xFE\xFF\xBA\xCE\xFE\x41\x41\x42";

    assert_yaml_snapshot!(steps(&mut ctx, input), @r"
    - consumed: 2
      result:
        Ok: ~
    - consumed: 2
      result:
        Ok: 954
    - consumed: 2
      result:
        Err: InvalidStart
    - consumed: 2
      result:
        Err: InvalidSequence
    ");
}

#[derive(Serialize)]
struct Message {
    code: i32,
    message: &'static str,
}

#[test]
fn snapshot_messages() {
    let messages: Vec<Message> = ErrorCode::ALL
        .iter()
        .map(|code| Message {
            code: code.as_i32(),
            message: code.message(),
        })
        .collect();

    assert_yaml_snapshot!(messages, @r"
    - code: 0
      message: Success
    - code: 1
      message: Invalid start byte
    - code: 2
      message: Truncated sequence
    - code: 3
      message: Invalid encoded UTF value
    - code: 4
      message: Overlong byte sequence
    - code: 5
      message: Invalid byte sequence
    - code: 6
      message: Decoded rune exceeds UTF value limit
    ");
}
