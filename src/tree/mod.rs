//! Directory trees over storage backends
//!
//! Walk a backend into typed nodes ([`builder`], [`walker`]), filter what the
//! walk sees ([`filter`]), read content ([`content`]), write trees back
//! ([`hydrate`]), and inspect built trees ([`traverse`], [`render`]).

pub mod builder;
pub mod content;
pub mod filter;
pub mod hydrate;
pub mod node;
pub mod path;
pub mod render;
pub mod traverse;
pub mod walker;
