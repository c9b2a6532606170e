pub mod adjust;
pub mod discovery;
pub mod highlight;
