pub(crate) mod edit;
pub(crate) mod io;
pub(crate) mod model;
pub(crate) mod timeline;
