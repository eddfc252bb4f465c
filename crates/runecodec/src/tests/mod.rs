use alloc::vec::Vec;

use crate::{CodeUnit, Context, Decoded};

mod snapshot_steps;

/// Drive `ctx` over all of `input` and collect every step.
///
/// Stops when the input is used up and nothing is pending, or when a step
/// makes no progress.
pub(crate) fn walk<U: CodeUnit>(ctx: &mut Context, input: &[u8]) -> Vec<Decoded<U>> {
    let mut steps = Vec::new();
    let mut pos = 0;
    loop {
        if pos == input.len() && ctx.is_idle() {
            break;
        }
        let step = ctx.decode::<U>(&input[pos..]);
        if step.consumed == 0 && step.result == Ok(None) {
            break;
        }
        ctx.assert_invariants();
        steps.push(step);
        if step.consumed == 0 && step.value().is_none() {
            break;
        }
        pos += step.consumed;
    }
    steps
}

/// Only the errors of a walk.
pub(crate) fn errors<U: CodeUnit>(steps: &[Decoded<U>]) -> Vec<crate::CodecError> {
    steps.iter().filter_map(Decoded::error).collect()
}
