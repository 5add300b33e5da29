#![forbid(unsafe_code)]

/// Receives human-readable step descriptions while a pack or unpack runs.
///
/// The sink has no effect on codec correctness; callers wanting a responsive
/// front-end run the operation on a worker and forward these messages over
/// their own channel.
pub trait ProgressSink {
    fn report(&mut self, message: &str);
}

impl<F: FnMut(&str)> ProgressSink for F {
    fn report(&mut self, message: &str) {
        self(message)
    }
}
