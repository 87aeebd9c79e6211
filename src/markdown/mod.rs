pub mod classify;
pub mod lines;
pub mod sections;

pub use classify::{
    classify, parse_code_blocks, parse_key_values, parse_list, parse_metrics, CodeBlock, KeyValue,
    StructuredValue,
};
pub use sections::{
    build_outline, extract_section, extract_subsection, find_section, find_subsection, Outline,
    Section, Span,
};
