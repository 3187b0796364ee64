pub(crate) mod avg;
pub(crate) mod table;
