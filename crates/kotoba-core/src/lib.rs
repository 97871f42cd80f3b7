pub mod dictionary;
pub mod error;
pub mod format;
pub mod kana;
pub mod language;
pub mod preprocess;
pub mod query;
pub mod record;
pub mod script;
pub mod types;

pub use dictionary::{Dictionary, DictionaryFormat};
pub use error::{QueryError, RecordError, SearchError};
pub use language::{DeconjugationResult, Deconjugator};
pub use query::{
    CompiledPattern, Query, QueryFlags, Range, RangeKind, Relevance, Token, TokenType,
    compile_query,
};
pub use record::{Definition, EdictEntry, ExampleEntry, KanjiEntry, Record, UnknownEntry};
