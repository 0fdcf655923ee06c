pub(crate) mod clean;
pub(crate) mod index;
pub(crate) mod model;
pub(crate) mod remote;
