pub mod date_range;
pub mod filter;
pub mod normalize;
pub mod record;
pub mod tenure;
