pub mod mutation;
pub mod query;

#[cfg(test)]
pub(crate) mod testing;
