pub(crate) mod correlate;
