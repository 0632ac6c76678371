pub mod bok;
pub mod fred;
pub mod kosis;
