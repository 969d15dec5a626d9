// Profile view: static CV data and the persona instruction derived from it.

pub mod handlers;
pub mod prompts;
