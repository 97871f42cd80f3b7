pub mod deconjugator;

pub use deconjugator::JapaneseDeconjugator;
