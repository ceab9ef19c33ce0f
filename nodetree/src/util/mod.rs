pub(crate) mod stack;
pub mod testing;
