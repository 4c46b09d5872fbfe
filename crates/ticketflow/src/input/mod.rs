//! Input parsing and raw-source discovery.

mod parser;
mod resolver;
mod source;
mod ticket_log;

pub(crate) use parser::content_hash;
pub use parser::{Parser, ParserConfig};
pub use resolver::{
    CanonicalName, NamingStrategy, PrefixedName, ResolvedSource, SourceResolver, TABLE_EXTENSIONS,
};
pub use source::{DataTable, SourceMetadata};
pub use ticket_log::{read_ticket_log, MalformedLine, TicketLog};
