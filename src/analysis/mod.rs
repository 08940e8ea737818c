pub mod normalizer;
pub mod stemmer;
pub mod stopwords;
