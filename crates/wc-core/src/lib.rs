pub mod arrange;
pub mod emitter;
pub mod id;
pub mod lint;
pub mod model;
pub mod parser;
pub mod store;

pub use arrange::arrange;
pub use emitter::emit_fragment;
pub use id::EntityId;
pub use lint::{LintDiagnostic, LintSeverity, lint_fragment};
pub use model::*;
pub use parser::{
    Measure, ParseConfig, ParsedFragment, RawElement, parse_fragment, parse_fragment_with,
};
pub use store::GeometryStore;
