pub mod config;
pub mod controller;
pub mod copy;
pub mod document;
pub mod enhancer;
pub mod form;
pub mod markup;
pub mod message;
pub mod transport;
