mod interaction;
pub(super) mod project;
mod view;
