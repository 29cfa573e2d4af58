//! XML output: serialization, reference normalization, statistics and
//! schema validation.

mod references;
mod stats;
mod utils;
mod validate;
mod writer;

pub use references::{normalize_references, partition_references, reference_warnings, LawRef};
pub use stats::Statistics;
pub use utils::{
    element_children, find_child, find_children, get_tag_name, get_text, has_direct_text, has_tag,
    line_number,
};
pub use validate::{validate_xml, SchemaDiagnostic};
pub use writer::{generate_xml, save_xml};
