//! Error reporting trait

/// Sink for recoverable errors
///
/// Every error the engine recovers from is reported here exactly once, so
/// nothing is dropped silently. `reason` is a short static description.
pub trait ErrorReporter {
    /// A completed message failed to decode
    fn malformed_packet(&mut self, reason: &'static str);

    /// The peer link went away or could not be established
    fn connection_dropped(&mut self, reason: &'static str);

    /// A write would have overflowed the assembly buffer
    fn buffer_overflow(&mut self, reason: &'static str);

    /// Encryption or pairing failed
    fn security_failure(&mut self, reason: &'static str);

    /// A write arrived before the link was secured
    fn write_rejected(&mut self, reason: &'static str);

    /// A time sync could not be applied to the clock
    fn clock_failure(&mut self, reason: &'static str);
}
