pub(crate) mod resolve;
pub(crate) mod segment_plan;
pub(crate) mod stack;
