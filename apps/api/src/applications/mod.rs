// Application resource: apply, fetch, per-user listing, and soft withdrawal.
// Duplicate detection is an atomic insert against the partial unique index on
// active applications, no check-then-act.

pub mod handlers;
