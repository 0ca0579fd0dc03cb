mod common;
mod officers;
mod routing;
