pub(crate) mod bucket;
pub(crate) mod nodes;
pub(crate) mod recorder;
pub(crate) mod traffic;
