//! Renderings of values inside assertion failure messages.

mod diagnostics;
mod location;

pub use diagnostics::DiagnosticListRepresentation;
pub use location::LocationRepresentation;

/// Renders a value for a failure message.
pub trait Representation<T: ?Sized> {
    fn to_string_of(&self, value: &T) -> String;
}
