pub(crate) mod assembler;
pub(crate) mod overlay;
pub(crate) mod probe;
pub(crate) mod tool;
