mod common;
mod inference;
mod routing;
mod validation;
