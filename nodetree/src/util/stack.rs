/// Minimum stack left before a recursive step switches to a fresh segment.
const RED_ZONE: usize = 128 * 1024;
/// Size of each heap-allocated stack segment.
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Runs `f`, first moving to a new stack segment if the current one is nearly exhausted.
///
/// Wrap every step of a per-level recursion (serializers, formatters) with this so
/// arbitrarily deep trees cannot overflow the thread stack.
pub(crate) fn grow<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, f)
}
