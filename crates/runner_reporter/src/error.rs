/// Errors which may come out of this crate.
///
/// Rendering itself cannot fail.  These cover producers handing us a malformed exception chain, and sinks which fail
/// to write.
#[derive(Debug, thiserror::Error, derive_more::IsVariant)]
pub enum Error {
    #[error("Failure information must describe at least one exception")]
    EmptyFailureChain,

    #[error("Failure information sequences differ in length: {types} exception types, {messages} messages, {stack_traces} stack traces")]
    MismatchedFailureChain {
        types: usize,
        messages: usize,
        stack_traces: usize,
    },

    #[error("Unable to write to the log sink: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
