pub(crate) mod detect;
pub(crate) mod segment;
