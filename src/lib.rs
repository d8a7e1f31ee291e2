//! domcascade: a document tree with a CSS-like style cascade and DOM-like event bubbling.
//!
//! Layers:
//! - [`domain`]: document arena, styles, selectors, cascade and event dispatch
//! - [`application`]: file loading and scripted handlers
//! - [`render`]: diagnostic and terminal output
//! - [`cli`]: command line front end

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod render;
pub mod util;
