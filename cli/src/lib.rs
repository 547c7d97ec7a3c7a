//! Operator CLI for the VivaCripto portal: inspect posts through the content
//! API, search, print the sitemap, and trigger page revalidation.

/// Command-line definitions.
pub mod cli;
pub mod commands;
