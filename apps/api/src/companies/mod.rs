// Company resource. Reads are public; writes require authentication but are
// not owner-scoped: the schema has no owner column (see DESIGN.md).

pub mod handlers;
