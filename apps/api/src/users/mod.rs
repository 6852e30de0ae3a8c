// User resource: registration, login, dashboard, paginated listing, and
// self-only update/delete. Registration and update accept multipart forms so
// optional attachments (profile picture, resume) ride along with the fields.

pub mod handlers;
